//! Konsistenzprüfung des Wand-Graphen (Spiegel-Verbindungen, Wand-Endpunkte, Metadaten).

use super::WallGraph;
use crate::core::geometry;

/// Toleranz für Winkelvergleiche (Radiant).
const ANGLE_TOLERANCE: f32 = 1e-3;

/// Verletzte Graph-Invariante
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    /// Verbindung A→B ohne Gegenstück B→A
    #[error("Verbindung {node_id}→{neighbor_id} hat kein Gegenstück")]
    MissingMirror { node_id: u64, neighbor_id: u64 },
    /// Verbindung verweist auf eine unbekannte Wand
    #[error("Verbindung {node_id}→{neighbor_id} verweist auf unbekannte Wand {wall_id}")]
    UnknownWall {
        node_id: u64,
        neighbor_id: u64,
        wall_id: u64,
    },
    /// Wand-Endpunkte passen nicht zur Verbindung oder zum Gegenstück
    #[error("Wand {wall_id} passt nicht zur Verbindung {node_id}→{neighbor_id}")]
    WallMismatch {
        node_id: u64,
        neighbor_id: u64,
        wall_id: u64,
    },
    /// Winkel von A→B und B→A unterscheiden sich nicht um π
    #[error("Winkel {node_id}→{neighbor_id} nicht gespiegelt")]
    AngleNotMirrored { node_id: u64, neighbor_id: u64 },
    /// Gespeicherter Winkel entspricht nicht den Positionen
    #[error("Winkel {node_id}→{neighbor_id} veraltet")]
    StaleAngle { node_id: u64, neighbor_id: u64 },
    /// Wand verweist auf fehlenden Endpunkt
    #[error("Wand {wall_id} verweist auf fehlenden Node {node_id}")]
    DanglingWall { wall_id: u64, node_id: u64 },
    /// Wand mit identischen Endpunkten
    #[error("Wand {wall_id} ist eine Selbstschleife")]
    SelfLoop { wall_id: u64 },
    /// Wand ohne passendes Verbindungspaar
    #[error("Wand {wall_id} fehlt in den Verbindungen ihrer Endpunkte")]
    UnreferencedWall { wall_id: u64 },
    /// Metadaten entsprechen nicht dem Verbindungsstand
    #[error("Metadaten von Node {node_id} veraltet")]
    StaleMetadata { node_id: u64 },
}

impl WallGraph {
    /// Prüft alle strukturellen Invarianten des Graphen.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        for (&wall_id, wall) in &self.walls {
            if wall.start_node_id == wall.end_node_id {
                return Err(InvariantViolation::SelfLoop { wall_id });
            }
            for node_id in wall.node_ids() {
                if !self.nodes.contains_key(&node_id) {
                    return Err(InvariantViolation::DanglingWall { wall_id, node_id });
                }
            }
            if self.find_wall_between(wall.start_node_id, wall.end_node_id) != Some(wall_id) {
                return Err(InvariantViolation::UnreferencedWall { wall_id });
            }
        }

        for (&node_id, node) in &self.nodes {
            for (&neighbor_id, conn) in &node.connections {
                let Some(wall) = self.walls.get(&conn.wall_id) else {
                    return Err(InvariantViolation::UnknownWall {
                        node_id,
                        neighbor_id,
                        wall_id: conn.wall_id,
                    });
                };
                if conn.neighbor_node_id != neighbor_id || wall.other_end(node_id) != Some(neighbor_id)
                {
                    return Err(InvariantViolation::WallMismatch {
                        node_id,
                        neighbor_id,
                        wall_id: conn.wall_id,
                    });
                }

                let Some(mirror) = self
                    .nodes
                    .get(&neighbor_id)
                    .and_then(|n| n.connections.get(&node_id))
                else {
                    return Err(InvariantViolation::MissingMirror {
                        node_id,
                        neighbor_id,
                    });
                };
                if mirror.wall_id != conn.wall_id {
                    return Err(InvariantViolation::WallMismatch {
                        node_id,
                        neighbor_id,
                        wall_id: conn.wall_id,
                    });
                }
                if !geometry::angles_equivalent(
                    mirror.angle,
                    geometry::opposite_angle(conn.angle),
                    ANGLE_TOLERANCE,
                ) {
                    return Err(InvariantViolation::AngleNotMirrored {
                        node_id,
                        neighbor_id,
                    });
                }

                let expected = geometry::angle_between(node.position, self.nodes[&neighbor_id].position);
                if !geometry::angles_equivalent(conn.angle, expected, ANGLE_TOLERANCE) {
                    return Err(InvariantViolation::StaleAngle {
                        node_id,
                        neighbor_id,
                    });
                }
            }

            if self.expected_metadata(node_id) != Some(node.metadata) {
                return Err(InvariantViolation::StaleMetadata { node_id });
            }
        }

        Ok(())
    }
}
