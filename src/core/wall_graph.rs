//! Die zentrale Wand-Graph-Engine mit Node-Store, Wand-Store und Spatial-Index.
//!
//! Alle Beziehungen (Node ↔ Wand ↔ Node) laufen ausschließlich über IDs.
//! Externe Komponenten lesen über die Query-Methoden und mutieren nur über
//! die Mutations-API; jede Mutation validiert vollständig, bevor sie einen
//! der beiden Stores anfasst.

mod connect;
mod invariants;
mod metadata;
mod move_nodes;
mod snapshot;

pub use connect::{ConnectError, ConnectOutcome, WallSplit};
pub use invariants::InvariantViolation;
pub use metadata::classify_connections;
pub use snapshot::{GraphSnapshot, NodeSnapshot, SnapshotError, WallSnapshot};

use super::events::{ChangeNotifier, GraphChange, GraphChangeKind, ListenerId};
use super::geometry;
use super::wall::valid_dimensions;
use super::{ConnectionConstraints, NodeConnection, SpatialIndex, SpatialMatch, Wall, WallNode};
use super::WallProperties;
use crate::shared::GraphOptions;
use glam::Vec2;
use std::collections::HashMap;

/// Fehler beim Ändern einer bestehenden Wand
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WallUpdateError {
    /// Wand-ID unbekannt
    #[error("Wand {0} existiert nicht")]
    UnknownWall(u64),
    /// Stärke oder Höhe nicht positiv
    #[error("ungueltige Wandmasse: Staerke {thickness}, Hoehe {height}")]
    InvalidDimensions { thickness: f32, height: f32 },
}

/// Wand-Graph eines Grundrisses
#[derive(Debug)]
pub struct WallGraph {
    /// Alle Nodes, indexiert nach ihrer ID
    nodes: HashMap<u64, WallNode>,
    /// Alle Wände, indexiert nach ihrer ID
    walls: HashMap<u64, Wall>,
    /// Nächste freie Node-ID
    next_node_id: u64,
    /// Nächste freie Wand-ID
    next_wall_id: u64,
    /// Toleranzen und Defaults
    options: GraphOptions,
    /// Persistenter Spatial-Index für Snap-Abfragen
    spatial_index: SpatialIndex,
    /// Listener-Registry dieser Instanz
    notifier: ChangeNotifier,
}

impl WallGraph {
    /// Erstellt einen leeren Graphen mit Standard-Optionen
    pub fn new() -> Self {
        Self::with_options(GraphOptions::default())
    }

    /// Erstellt einen leeren Graphen mit expliziten Optionen
    pub fn with_options(options: GraphOptions) -> Self {
        Self {
            nodes: HashMap::new(),
            walls: HashMap::new(),
            next_node_id: 1,
            next_wall_id: 1,
            options,
            spatial_index: SpatialIndex::empty(),
            notifier: ChangeNotifier::new(),
        }
    }

    /// Aktive Optionen (read-only)
    pub fn options(&self) -> &GraphOptions {
        &self.options
    }

    // ── Events ──────────────────────────────────────────────────────

    /// Registriert einen Listener für strukturelle Änderungen.
    pub fn subscribe(&mut self, listener: impl FnMut(&GraphChange) + 'static) -> ListenerId {
        self.notifier.subscribe(listener)
    }

    /// Entfernt einen Listener.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.notifier.unsubscribe(id)
    }

    fn emit(&mut self, kind: GraphChangeKind, node_ids: Vec<u64>, wall_ids: Vec<u64>) {
        self.notifier.emit(GraphChange::new(kind, node_ids, wall_ids));
    }

    // ── Node-Mutationen ─────────────────────────────────────────────

    /// Legt einen Node an oder liefert einen bestehenden innerhalb der Snap-Schwelle.
    ///
    /// # Panics
    ///
    /// Bei nicht-endlicher Position (NaN oder unendlich). Der Snap-Index kann
    /// solche Koordinaten nicht einordnen.
    pub fn create_node(&mut self, position: Vec2) -> u64 {
        assert!(
            position.is_finite(),
            "Node-Position muss endlich sein: ({}, {})",
            position.x,
            position.y
        );

        if let Some(existing) = self.find_snap_node(position, |_| false) {
            log::debug!(
                "Node {} bei ({:.2}, {:.2}) wiederverwendet",
                existing,
                position.x,
                position.y
            );
            return existing;
        }

        let id = self.insert_node(position);
        self.debug_check_invariants();
        id
    }

    /// Entfernt einen Node inklusive aller angeschlossenen Wände.
    pub fn remove_node(&mut self, node_id: u64) -> bool {
        let Some(node) = self.nodes.get(&node_id) else {
            log::warn!("Node {} existiert nicht, nichts entfernt", node_id);
            return false;
        };

        let wall_ids: Vec<u64> = node.wall_ids().collect();
        for &wall_id in &wall_ids {
            self.remove_wall(wall_id);
        }

        self.nodes.remove(&node_id);
        self.rebuild_spatial_index();
        self.emit(GraphChangeKind::NodeRemoved, vec![node_id], wall_ids.clone());
        log::info!(
            "Node {} mit {} Wand/Wänden entfernt",
            node_id,
            wall_ids.len()
        );
        self.debug_check_invariants();
        true
    }

    /// Leert den gesamten Graphen. IDs werden nicht wiederverwendet.
    pub fn clear(&mut self) {
        let mut node_ids: Vec<u64> = self.nodes.keys().copied().collect();
        let mut wall_ids: Vec<u64> = self.walls.keys().copied().collect();
        node_ids.sort_unstable();
        wall_ids.sort_unstable();

        self.nodes.clear();
        self.walls.clear();
        self.rebuild_spatial_index();
        self.emit(GraphChangeKind::GraphCleared, node_ids, wall_ids);
        log::info!("Wand-Graph geleert");
        self.debug_check_invariants();
    }

    // ── Wand-Mutationen ─────────────────────────────────────────────

    /// Entfernt eine Wand und das gespiegelte Verbindungspaar ihrer Endpunkte.
    pub fn remove_wall(&mut self, wall_id: u64) -> bool {
        let Some(wall) = self.remove_wall_record(wall_id) else {
            log::warn!("Wand {} existiert nicht, nichts entfernt", wall_id);
            return false;
        };

        self.refresh_metadata(&wall.node_ids());
        log::info!(
            "Wand {} ({}↔{}) entfernt",
            wall_id,
            wall.start_node_id,
            wall.end_node_id
        );
        self.debug_check_invariants();
        true
    }

    /// Ändert Stärke und Höhe einer Wand.
    pub fn update_wall(
        &mut self,
        wall_id: u64,
        thickness: f32,
        height: f32,
    ) -> Result<(), WallUpdateError> {
        if !valid_dimensions(thickness, height) {
            log::warn!(
                "Wand {}: ungültige Maße (Stärke {}, Höhe {})",
                wall_id,
                thickness,
                height
            );
            return Err(WallUpdateError::InvalidDimensions { thickness, height });
        }
        let Some(wall) = self.walls.get_mut(&wall_id) else {
            log::warn!("Wand {} existiert nicht", wall_id);
            return Err(WallUpdateError::UnknownWall(wall_id));
        };

        wall.thickness = thickness;
        wall.height = height;
        let node_ids = wall.node_ids().to_vec();
        self.emit(GraphChangeKind::WallModified, node_ids, vec![wall_id]);
        self.debug_check_invariants();
        Ok(())
    }

    /// Setzt eine Zusatz-Eigenschaft einer Wand.
    pub fn set_wall_property(&mut self, wall_id: u64, key: &str, value: &str) -> bool {
        let Some(wall) = self.walls.get_mut(&wall_id) else {
            log::warn!("Wand {} existiert nicht", wall_id);
            return false;
        };

        wall.properties.insert(key.to_string(), value.to_string());
        let node_ids = wall.node_ids().to_vec();
        self.emit(GraphChangeKind::WallModified, node_ids, vec![wall_id]);
        self.debug_check_invariants();
        true
    }

    /// Setzt (oder entfernt) die Einschränkungen einer Verbindung auf beiden Seiten.
    pub fn set_connection_constraints(
        &mut self,
        node_a: u64,
        node_b: u64,
        constraints: Option<ConnectionConstraints>,
    ) -> bool {
        let Some(wall_id) = self.find_wall_between(node_a, node_b) else {
            log::warn!("Keine Verbindung {}↔{} vorhanden", node_a, node_b);
            return false;
        };

        for (from, to) in [(node_a, node_b), (node_b, node_a)] {
            if let Some(conn) = self
                .nodes
                .get_mut(&from)
                .and_then(|n| n.connections.get_mut(&to))
            {
                conn.constraints = constraints;
            }
        }
        self.emit(GraphChangeKind::WallModified, vec![node_a, node_b], vec![wall_id]);
        self.debug_check_invariants();
        true
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// Node nach ID
    pub fn node(&self, node_id: u64) -> Option<&WallNode> {
        self.nodes.get(&node_id)
    }

    /// Wand nach ID
    pub fn wall(&self, wall_id: u64) -> Option<&Wall> {
        self.walls.get(&wall_id)
    }

    /// Iterator über alle Nodes (read-only, ohne feste Reihenfolge).
    pub fn nodes_iter(&self) -> impl Iterator<Item = &WallNode> {
        self.nodes.values()
    }

    /// Iterator über alle Wände (read-only, ohne feste Reihenfolge).
    pub fn walls_iter(&self) -> impl Iterator<Item = &Wall> {
        self.walls.values()
    }

    /// IDs der direkt verbundenen Nachbar-Nodes (leer bei unbekannter ID)
    pub fn connected_nodes(&self, node_id: u64) -> Vec<u64> {
        self.nodes
            .get(&node_id)
            .map(|n| n.connections.keys().copied().collect())
            .unwrap_or_default()
    }

    /// IDs aller Wände an einem Node (leer bei unbekannter ID)
    pub fn node_walls(&self, node_id: u64) -> Vec<u64> {
        self.nodes
            .get(&node_id)
            .map(|n| n.wall_ids().collect())
            .unwrap_or_default()
    }

    /// Endpunkt-IDs einer Wand als `[start, end]`
    pub fn wall_node_ids(&self, wall_id: u64) -> Option<[u64; 2]> {
        self.walls.get(&wall_id).map(Wall::node_ids)
    }

    /// Start-Node-ID einer Wand
    pub fn wall_start_node_id(&self, wall_id: u64) -> Option<u64> {
        self.walls.get(&wall_id).map(|w| w.start_node_id)
    }

    /// End-Node-ID einer Wand
    pub fn wall_end_node_id(&self, wall_id: u64) -> Option<u64> {
        self.walls.get(&wall_id).map(|w| w.end_node_id)
    }

    /// Findet die Wand zwischen zwei Nodes (O(1))
    pub fn find_wall_between(&self, node_a: u64, node_b: u64) -> Option<u64> {
        self.nodes
            .get(&node_a)?
            .connections
            .get(&node_b)
            .map(|c| c.wall_id)
    }

    /// Prüft ob zwei Nodes direkt verbunden sind
    pub fn are_connected(&self, node_a: u64, node_b: u64) -> bool {
        self.find_wall_between(node_a, node_b).is_some()
    }

    /// Länge einer Wand (Abstand ihrer Endpunkte)
    pub fn wall_length(&self, wall_id: u64) -> Option<f32> {
        let wall = self.walls.get(&wall_id)?;
        let start = self.nodes.get(&wall.start_node_id)?.position;
        let end = self.nodes.get(&wall.end_node_id)?.position;
        Some(geometry::distance(start, end))
    }

    /// Gibt die Anzahl der Nodes zurück
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Gibt die Anzahl der Wände zurück
    pub fn wall_count(&self) -> usize {
        self.walls.len()
    }

    /// `true` im leeren Ausgangszustand (keine Nodes, keine Wände)
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.walls.is_empty()
    }

    /// Findet den nächstgelegenen Node zur Weltposition.
    pub fn nearest_node(&self, query: Vec2) -> Option<SpatialMatch> {
        self.spatial_index.nearest(query)
    }

    /// Findet alle Nodes innerhalb eines Radius, aufsteigend nach Distanz.
    pub fn nodes_within_radius(&self, query: Vec2, radius: f32) -> Vec<SpatialMatch> {
        self.spatial_index.within_radius(query, radius)
    }

    // ── Interne Primitive ───────────────────────────────────────────

    /// Nächster Node echt innerhalb der Snap-Schwelle, der nicht von `exclude` ausgeschlossen ist.
    fn find_snap_node(&self, position: Vec2, exclude: impl Fn(u64) -> bool) -> Option<u64> {
        self.spatial_index
            .snap_candidate(position, self.options.snap_threshold, exclude)
            .map(|m| m.node_id)
    }

    /// Legt einen Node ohne Snap-Prüfung an und meldet NODE_ADDED.
    fn insert_node(&mut self, position: Vec2) -> u64 {
        let id = self.next_node_id;
        self.next_node_id += 1;
        self.nodes.insert(id, WallNode::new(id, position));
        self.rebuild_spatial_index();
        self.emit(GraphChangeKind::NodeAdded, vec![id], Vec::new());
        log::info!(
            "Node {} an Position ({:.2}, {:.2}) angelegt",
            id,
            position.x,
            position.y
        );
        id
    }

    /// Legt eine Wand samt gespiegeltem Verbindungspaar an und meldet WALL_ADDED.
    ///
    /// Metadaten werden hier nicht aktualisiert; Aufrufer sammeln die betroffenen
    /// Nodes und rufen danach `refresh_metadata`.
    fn insert_wall(
        &mut self,
        start_id: u64,
        end_id: u64,
        thickness: f32,
        height: f32,
        properties: WallProperties,
    ) -> u64 {
        let start_pos = self.nodes[&start_id].position;
        let end_pos = self.nodes[&end_id].position;
        let angle = geometry::angle_between(start_pos, end_pos);

        let wall_id = self.next_wall_id;
        self.next_wall_id += 1;

        if let Some(start) = self.nodes.get_mut(&start_id) {
            start.connections.insert(
                end_id,
                NodeConnection {
                    neighbor_node_id: end_id,
                    wall_id,
                    angle,
                    constraints: None,
                },
            );
        }
        if let Some(end) = self.nodes.get_mut(&end_id) {
            end.connections.insert(
                start_id,
                NodeConnection {
                    neighbor_node_id: start_id,
                    wall_id,
                    angle: geometry::opposite_angle(angle),
                    constraints: None,
                },
            );
        }

        let mut wall = Wall::new(wall_id, start_id, end_id, thickness, height);
        wall.properties = properties;
        self.walls.insert(wall_id, wall);
        self.emit(GraphChangeKind::WallAdded, vec![start_id, end_id], vec![wall_id]);
        wall_id
    }

    /// Entfernt Wand-Record und Verbindungspaar, meldet WALL_REMOVED (ohne Metadaten-Update).
    fn remove_wall_record(&mut self, wall_id: u64) -> Option<Wall> {
        let wall = self.walls.remove(&wall_id)?;
        if let Some(start) = self.nodes.get_mut(&wall.start_node_id) {
            start.connections.shift_remove(&wall.end_node_id);
        }
        if let Some(end) = self.nodes.get_mut(&wall.end_node_id) {
            end.connections.shift_remove(&wall.start_node_id);
        }
        self.emit(
            GraphChangeKind::WallRemoved,
            wall.node_ids().to_vec(),
            vec![wall_id],
        );
        Some(wall)
    }

    /// Baut den persistenten Spatial-Index aus den aktuellen Nodes neu auf.
    fn rebuild_spatial_index(&mut self) {
        self.spatial_index =
            SpatialIndex::build(self.nodes.values().map(|node| (node.id, node.position)));
    }

    /// Prüft in Debug-Builds alle Graph-Invarianten.
    fn debug_check_invariants(&self) {
        #[cfg(debug_assertions)]
        if let Err(violation) = self.check_invariants() {
            panic!("Wand-Graph inkonsistent: {violation}");
        }
    }
}

impl Default for WallGraph {
    fn default() -> Self {
        Self::new()
    }
}
