//! Verbinden zweier Nodes mit automatischem Aufsplitten an Kreuzungen.

use super::WallGraph;
use crate::core::geometry;
use crate::core::wall::valid_dimensions;
use crate::core::WallProperties;
use glam::Vec2;

/// Zusätzliche Auflösungen pro vorhandener Wand, bevor das Routing abbricht.
const ROUTING_BUDGET_PER_WALL: usize = 4;
/// Grundbudget des Routings (auch für leere Graphen).
const ROUTING_BUDGET_BASE: usize = 64;

/// Fehler beim Verbinden zweier Nodes. Der Graph bleibt in jedem Fall unverändert.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConnectError {
    /// Start- oder End-Node existiert nicht
    #[error("Node {0} existiert nicht")]
    UnknownNode(u64),
    /// Beide Nodes sind bereits direkt verbunden
    #[error("Nodes {0} und {1} sind bereits verbunden")]
    AlreadyConnected(u64, u64),
    /// Beide Nodes liegen innerhalb der Snap-Schwelle (oder sind identisch)
    #[error("Nodes {0} und {1} fallen zusammen")]
    CoincidentNodes(u64, u64),
    /// Stärke oder Höhe nicht positiv
    #[error("ungueltige Wandmasse: Staerke {thickness}, Hoehe {height}")]
    InvalidDimensions { thickness: f32, height: f32 },
}

/// Eine bestehende Wand, die an einem Kreuzungs-Node neu geführt wurde.
///
/// Liegt der Node auf der Wand, entstehen zwei Teilwände
/// `[original_start → node, node → original_end]`. War der Node bereits mit
/// einem Endpunkt verbunden, bleibt nur die Wand zum anderen Endpunkt übrig;
/// bei Verbindung zu beiden Endpunkten entfällt die Wand ganz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallSplit {
    /// ID der ersetzten Wand
    pub original_wall_id: u64,
    /// Node, über den die Wand jetzt läuft
    pub node_id: u64,
    /// Ersatz-Wände in Reihenfolge vom ursprünglichen Start- zum End-Node
    pub wall_ids: Vec<u64>,
}

/// Ergebnis eines erfolgreichen `connect_nodes`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectOutcome {
    /// Alle neu angelegten Wände des Pfads, in Reihenfolge vom Start- zum End-Node
    pub wall_ids: Vec<u64>,
    /// An Kreuzungen neu erzeugte Nodes
    pub split_node_ids: Vec<u64>,
    /// Bestehende Wände, die an Kreuzungen ersetzt wurden
    pub split_walls: Vec<WallSplit>,
}

impl ConnectOutcome {
    /// Wand-ID, falls der Pfad aus genau einer Wand besteht (Undo über `remove_wall`).
    pub fn wall_id(&self) -> Option<u64> {
        match self.wall_ids.as_slice() {
            [single] => Some(*single),
            _ => None,
        }
    }

    /// `true` wenn der neue Pfad bestehende Wände gekreuzt hat
    pub fn crossed_existing_walls(&self) -> bool {
        !self.split_node_ids.is_empty() || !self.split_walls.is_empty() || self.wall_ids.len() > 1
    }
}

/// Schnitt eines Segments mit einer bestehenden Wand
#[derive(Debug, Clone, Copy)]
struct Crossing {
    wall_id: u64,
    point: Vec2,
    t: f32,
}

/// Node, in den ein Schnittpunkt aufgelöst wird
#[derive(Debug, Clone, Copy)]
enum CrossingNode {
    /// Bestehender Node innerhalb der Snap-Schwelle
    Existing(u64),
    /// Neuer Split-Node auf der gekreuzten Wand
    Split(Vec2),
}

/// Maße und Eigenschaften, mit denen ein Abschnitt angelegt wird
#[derive(Debug, Clone)]
struct WallTemplate {
    thickness: f32,
    height: f32,
    properties: WallProperties,
}

/// Laufender Zustand eines `connect_nodes`-Aufrufs
#[derive(Debug)]
struct Routing {
    outcome: ConnectOutcome,
    touched: Vec<u64>,
    budget: usize,
}

impl WallGraph {
    /// Verbindet zwei Nodes mit Standard-Wandmaßen aus den Optionen.
    pub fn connect_nodes_default(
        &mut self,
        start_id: u64,
        end_id: u64,
    ) -> Result<ConnectOutcome, ConnectError> {
        let thickness = self.options.default_wall_thickness;
        let height = self.options.default_wall_height;
        self.connect_nodes(start_id, end_id, thickness, height)
    }

    /// Verbindet zwei Nodes durch eine oder mehrere Wände.
    ///
    /// Kreuzt ein Abschnitt bestehende Wände, wird der nächstgelegene
    /// Schnittpunkt in einen Node aufgelöst (wiederverwendet oder neu erzeugt),
    /// die gekreuzte Wand über diesen Node geführt und beide Teilstrecken
    /// erneut geprüft. Jede angelegte Wand, auch jede Ersatzwand, schneidet
    /// bestehende Wände nur in gemeinsamen Nodes. Alle Prüfungen laufen vor der
    /// ersten Mutation.
    pub fn connect_nodes(
        &mut self,
        start_id: u64,
        end_id: u64,
        thickness: f32,
        height: f32,
    ) -> Result<ConnectOutcome, ConnectError> {
        if let Err(e) = self.validate_connect(start_id, end_id, thickness, height) {
            log::warn!("Verbindung {}→{} abgelehnt: {}", start_id, end_id, e);
            return Err(e);
        }

        let template = WallTemplate {
            thickness,
            height,
            properties: WallProperties::new(),
        };
        let mut routing = Routing {
            outcome: ConnectOutcome::default(),
            touched: vec![start_id, end_id],
            budget: ROUTING_BUDGET_BASE + ROUTING_BUDGET_PER_WALL * self.walls.len(),
        };

        let path = self.route_segment(start_id, end_id, &template, &mut routing);

        let Routing {
            mut outcome,
            mut touched,
            ..
        } = routing;
        outcome.wall_ids = path;
        // Abschnitte, die im selben Aufruf erneut ersetzt wurden, fallen heraus
        outcome.wall_ids.retain(|id| self.walls.contains_key(id));
        for split in &mut outcome.split_walls {
            split.wall_ids.retain(|id| self.walls.contains_key(id));
        }

        touched.sort_unstable();
        touched.dedup();
        self.refresh_metadata(&touched);

        if outcome.crossed_existing_walls() {
            log::info!(
                "Verbindung {}→{}: {} Wand/Wände, {} neue Kreuzung(en), {} Wand/Wände ersetzt",
                start_id,
                end_id,
                outcome.wall_ids.len(),
                outcome.split_node_ids.len(),
                outcome.split_walls.len()
            );
        } else {
            log::info!(
                "Wand {:?} ({}→{}) erstellt",
                outcome.wall_id(),
                start_id,
                end_id
            );
        }
        self.debug_check_invariants();
        Ok(outcome)
    }

    fn validate_connect(
        &self,
        start_id: u64,
        end_id: u64,
        thickness: f32,
        height: f32,
    ) -> Result<(), ConnectError> {
        let start = self
            .nodes
            .get(&start_id)
            .ok_or(ConnectError::UnknownNode(start_id))?;
        let end = self
            .nodes
            .get(&end_id)
            .ok_or(ConnectError::UnknownNode(end_id))?;

        if start.connections.contains_key(&end_id) {
            return Err(ConnectError::AlreadyConnected(start_id, end_id));
        }
        if start_id == end_id
            || geometry::distance(start.position, end.position) < self.options.snap_threshold
        {
            return Err(ConnectError::CoincidentNodes(start_id, end_id));
        }
        if !valid_dimensions(thickness, height) {
            return Err(ConnectError::InvalidDimensions { thickness, height });
        }
        Ok(())
    }

    /// Legt den Abschnitt `from → to` an und liefert die neuen Wände in Pfad-Reihenfolge.
    ///
    /// Ohne Kreuzung entsteht genau eine Wand. Sonst wird die erste auflösbare
    /// Kreuzung (kleinster Parameter auf dem Abschnitt) an einen Node gebunden
    /// und beide Teilstrecken rekursiv angelegt. Bereits verbundene Paare
    /// liefern keine neue Wand.
    fn route_segment(
        &mut self,
        from: u64,
        to: u64,
        template: &WallTemplate,
        routing: &mut Routing,
    ) -> Vec<u64> {
        if from == to {
            return Vec::new();
        }
        if self.are_connected(from, to) {
            log::debug!("Abschnitt {}→{} existiert bereits, übersprungen", from, to);
            return Vec::new();
        }

        let next = if routing.budget == 0 {
            log::warn!(
                "Routing-Budget erschöpft, Abschnitt {}→{} wird direkt angelegt",
                from,
                to
            );
            None
        } else {
            self.first_resolvable_crossing(from, to)
        };

        let Some((crossing, target)) = next else {
            let wall_id = self.insert_wall(
                from,
                to,
                template.thickness,
                template.height,
                template.properties.clone(),
            );
            routing.touched.extend([from, to]);
            return vec![wall_id];
        };
        routing.budget -= 1;

        let node_id = match target {
            CrossingNode::Existing(id) => id,
            CrossingNode::Split(point) => {
                let id = self.insert_node(point);
                routing.outcome.split_node_ids.push(id);
                routing.touched.push(id);
                id
            }
        };
        log::debug!(
            "Kreuzung von {}→{} mit Wand {} bei t={:.3} → Node {}",
            from,
            to,
            crossing.wall_id,
            crossing.t,
            node_id
        );

        self.reroute_crossed_wall(crossing.wall_id, node_id, routing);

        let mut walls = self.route_segment(from, node_id, template, routing);
        walls.extend(self.route_segment(node_id, to, template, routing));
        walls
    }

    /// Führt eine gekreuzte Wand über `node_id` (gleiche Maße und Eigenschaften).
    fn reroute_crossed_wall(&mut self, wall_id: u64, node_id: u64, routing: &mut Routing) {
        match self.walls.get(&wall_id) {
            Some(wall) if !wall.touches(node_id) => {}
            _ => return,
        }
        let Some(wall) = self.remove_wall_record(wall_id) else {
            return;
        };
        routing
            .touched
            .extend([wall.start_node_id, wall.end_node_id, node_id]);

        // Platz in Entdeckungs-Reihenfolge reservieren, verschachtelte Splits folgen danach
        let slot = routing.outcome.split_walls.len();
        routing.outcome.split_walls.push(WallSplit {
            original_wall_id: wall_id,
            node_id,
            wall_ids: Vec::new(),
        });

        let template = WallTemplate {
            thickness: wall.thickness,
            height: wall.height,
            properties: wall.properties,
        };
        let mut replacement = self.route_segment(wall.start_node_id, node_id, &template, routing);
        replacement.extend(self.route_segment(node_id, wall.end_node_id, &template, routing));

        log::info!(
            "Wand {} über Node {} neu geführt: {:?}",
            wall_id,
            node_id,
            replacement
        );
        routing.outcome.split_walls[slot].wall_ids = replacement;
    }

    /// Erste Kreuzung des Segments `from → to`, die sich in einen Node auflösen lässt.
    ///
    /// Wände an `from` oder `to` schneiden nur im gemeinsamen Endpunkt und werden
    /// übersprungen. Kandidaten sind nach Parameter auf dem Segment sortiert,
    /// bei Gleichstand nach Wand-ID.
    fn first_resolvable_crossing(&self, from: u64, to: u64) -> Option<(Crossing, CrossingNode)> {
        let from_pos = self.nodes.get(&from)?.position;
        let to_pos = self.nodes.get(&to)?.position;

        let mut wall_ids: Vec<u64> = self.walls.keys().copied().collect();
        wall_ids.sort_unstable();

        let mut crossings: Vec<Crossing> = wall_ids
            .into_iter()
            .filter_map(|wall_id| {
                let wall = self.walls.get(&wall_id)?;
                if wall.touches(from) || wall.touches(to) {
                    return None;
                }
                let a = self.nodes.get(&wall.start_node_id)?.position;
                let b = self.nodes.get(&wall.end_node_id)?.position;
                let hit = geometry::segment_intersection(from_pos, to_pos, a, b)?;
                Some(Crossing {
                    wall_id,
                    point: hit.point,
                    t: hit.t,
                })
            })
            .collect();
        crossings.sort_by(|x, y| x.t.total_cmp(&y.t));

        crossings.into_iter().find_map(|crossing| {
            self.resolve_crossing(&crossing)
                .map(|target| (crossing, target))
        })
    }

    /// Löst einen Schnittpunkt in einen bestehenden Node oder einen neuen Split-Punkt auf.
    fn resolve_crossing(&self, crossing: &Crossing) -> Option<CrossingNode> {
        if let Some(existing) = self.find_snap_node(crossing.point, |_| false) {
            return Some(CrossingNode::Existing(existing));
        }

        let wall = self.walls.get(&crossing.wall_id)?;
        let a = self.nodes.get(&wall.start_node_id)?.position;
        let b = self.nodes.get(&wall.end_node_id)?.position;
        if geometry::point_on_segment(crossing.point, a, b, self.options.split_tolerance) {
            Some(CrossingNode::Split(crossing.point))
        } else {
            log::debug!(
                "Schnittpunkt t={:.3} liegt nicht auf Wand {}, ignoriert",
                crossing.t,
                crossing.wall_id
            );
            None
        }
    }
}
