//! Serialisierbare Snapshots des Wand-Graphen für Exporter und Loader.
//!
//! Der Snapshot ist die einzige Form, in der der Graph nach außen gereicht wird;
//! Datei-Formate (JSON, YAML) liegen bei den aufrufenden Komponenten.

use super::WallGraph;
use crate::core::geometry;
use crate::core::wall::valid_dimensions;
use crate::core::{NodeConnection, NodeMetadata, Wall, WallNode, WallProperties};
use crate::shared::GraphOptions;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Node-Eintrag eines Snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: u64,
    pub position: Vec2,
    #[serde(default)]
    pub connections: Vec<NodeConnection>,
    #[serde(default)]
    pub metadata: NodeMetadata,
}

/// Wand-Eintrag eines Snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallSnapshot {
    pub id: u64,
    pub start_node_id: u64,
    pub end_node_id: u64,
    pub thickness: f32,
    pub height: f32,
    #[serde(default)]
    pub properties: WallProperties,
}

/// Vollständiger, nach IDs sortierter Zustand des Graphen
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<NodeSnapshot>,
    pub walls: Vec<WallSnapshot>,
}

/// Fehler beim Wiederherstellen eines Snapshots
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SnapshotError {
    #[error("Node-ID {0} mehrfach vergeben")]
    DuplicateNodeId(u64),
    #[error("Node {0} hat keine endliche Position")]
    InvalidPosition(u64),
    #[error("Wand-ID {0} mehrfach vergeben")]
    DuplicateWallId(u64),
    #[error("Wand {wall_id} verweist auf fehlenden Node {node_id}")]
    MissingEndpoint { wall_id: u64, node_id: u64 },
    #[error("Wand {0} hat identische Endpunkte")]
    SelfLoop(u64),
    #[error("Wand {wall_id} dupliziert die Verbindung {start}↔{end}")]
    DuplicateConnection { wall_id: u64, start: u64, end: u64 },
    #[error("Wand {wall_id}: ungueltige Masse (Staerke {thickness}, Hoehe {height})")]
    InvalidDimensions {
        wall_id: u64,
        thickness: f32,
        height: f32,
    },
}

impl WallGraph {
    /// Erstellt einen Snapshot aller Nodes und Wände (nach ID sortiert,
    /// Verbindungen nach Nachbar-ID).
    pub fn snapshot(&self) -> GraphSnapshot {
        let mut nodes: Vec<NodeSnapshot> = self
            .nodes
            .values()
            .map(|node| {
                let mut connections: Vec<NodeConnection> =
                    node.connections.values().cloned().collect();
                connections.sort_unstable_by_key(|c| c.neighbor_node_id);
                NodeSnapshot {
                    id: node.id,
                    position: node.position,
                    connections,
                    metadata: node.metadata,
                }
            })
            .collect();
        nodes.sort_unstable_by_key(|n| n.id);

        let mut walls: Vec<WallSnapshot> = self
            .walls
            .values()
            .map(|wall| WallSnapshot {
                id: wall.id,
                start_node_id: wall.start_node_id,
                end_node_id: wall.end_node_id,
                thickness: wall.thickness,
                height: wall.height,
                properties: wall.properties.clone(),
            })
            .collect();
        walls.sort_unstable_by_key(|w| w.id);

        GraphSnapshot { nodes, walls }
    }

    /// Baut einen Graphen aus einem Snapshot wieder auf.
    ///
    /// Verbindungen werden aus den Wänden abgeleitet (Winkel aus den Positionen),
    /// Einschränkungen aus den Node-Einträgen übernommen. Metadaten und
    /// Spatial-Index werden neu berechnet. Die Vergabe neuer IDs setzt hinter
    /// der höchsten wiederhergestellten ID fort.
    pub fn from_snapshot(
        snapshot: &GraphSnapshot,
        options: GraphOptions,
    ) -> Result<Self, SnapshotError> {
        let mut graph = Self::with_options(options);

        for entry in &snapshot.nodes {
            if !entry.position.is_finite() {
                return Err(SnapshotError::InvalidPosition(entry.id));
            }
            if graph.nodes.contains_key(&entry.id) {
                return Err(SnapshotError::DuplicateNodeId(entry.id));
            }
            graph
                .nodes
                .insert(entry.id, WallNode::new(entry.id, entry.position));
        }

        let constraints: HashMap<(u64, u64), _> = snapshot
            .nodes
            .iter()
            .flat_map(|n| {
                n.connections
                    .iter()
                    .filter_map(move |c| c.constraints.map(|k| ((n.id, c.neighbor_node_id), k)))
            })
            .collect();

        let mut seen_pairs: HashSet<(u64, u64)> = HashSet::new();
        for entry in &snapshot.walls {
            if graph.walls.contains_key(&entry.id) {
                return Err(SnapshotError::DuplicateWallId(entry.id));
            }
            for node_id in [entry.start_node_id, entry.end_node_id] {
                if !graph.nodes.contains_key(&node_id) {
                    return Err(SnapshotError::MissingEndpoint {
                        wall_id: entry.id,
                        node_id,
                    });
                }
            }
            if entry.start_node_id == entry.end_node_id {
                return Err(SnapshotError::SelfLoop(entry.id));
            }
            let pair = (
                entry.start_node_id.min(entry.end_node_id),
                entry.start_node_id.max(entry.end_node_id),
            );
            if !seen_pairs.insert(pair) {
                return Err(SnapshotError::DuplicateConnection {
                    wall_id: entry.id,
                    start: entry.start_node_id,
                    end: entry.end_node_id,
                });
            }
            if !valid_dimensions(entry.thickness, entry.height) {
                return Err(SnapshotError::InvalidDimensions {
                    wall_id: entry.id,
                    thickness: entry.thickness,
                    height: entry.height,
                });
            }

            let (start_id, end_id) = (entry.start_node_id, entry.end_node_id);
            let angle = geometry::angle_between(
                graph.nodes[&start_id].position,
                graph.nodes[&end_id].position,
            );
            let wall_constraints = constraints
                .get(&(start_id, end_id))
                .or_else(|| constraints.get(&(end_id, start_id)))
                .copied();

            for (from, to, dir_angle) in [
                (start_id, end_id, angle),
                (end_id, start_id, geometry::opposite_angle(angle)),
            ] {
                if let Some(node) = graph.nodes.get_mut(&from) {
                    node.connections.insert(
                        to,
                        NodeConnection {
                            neighbor_node_id: to,
                            wall_id: entry.id,
                            angle: dir_angle,
                            constraints: wall_constraints,
                        },
                    );
                }
            }

            let mut wall = Wall::new(entry.id, start_id, end_id, entry.thickness, entry.height);
            wall.properties = entry.properties.clone();
            graph.walls.insert(entry.id, wall);
        }

        graph.next_node_id = graph.nodes.keys().max().copied().unwrap_or(0) + 1;
        graph.next_wall_id = graph.walls.keys().max().copied().unwrap_or(0) + 1;

        let node_ids: Vec<u64> = graph.nodes.keys().copied().collect();
        graph.refresh_metadata(&node_ids);
        graph.rebuild_spatial_index();

        log::info!(
            "Wand-Graph wiederhergestellt: {} Nodes, {} Wände",
            graph.node_count(),
            graph.wall_count()
        );
        graph.debug_check_invariants();
        Ok(graph)
    }
}
