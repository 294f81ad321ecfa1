//! Winkelbasierte Klassifizierung von Nodes (Endpunkt, Ecke, Kreuzung).

use super::WallGraph;
use crate::core::geometry::angle_bucket;
use crate::core::NodeMetadata;
use std::f32::consts::PI;

/// Klassifiziert einen Node anhand der Winkel seiner Verbindungen.
///
/// Winkel werden vor dem Vergleich auf `factor` (= 10^Nachkommastellen)
/// quantisiert. Das ist eine bewusste Näherung gegen Rundungsrauschen, keine
/// exakte geometrische Gleichheit:
/// - keine Verbindung → Default (freier Endpunkt)
/// - genau eine Verbindung → `is_endpoint`
/// - zwei Verbindungen mit verschiedenen, nicht entgegengesetzten Winkeln → `is_corner`
/// - mehr als zwei Verbindungen oder mehr als zwei verschiedene Winkel → `is_intersection`
pub fn classify_connections(angles: impl IntoIterator<Item = f32>, factor: f32) -> NodeMetadata {
    let mut buckets: Vec<i64> = angles
        .into_iter()
        .map(|angle| angle_bucket(angle, factor))
        .collect();
    let connection_count = buckets.len();
    if connection_count == 0 {
        return NodeMetadata::default();
    }

    buckets.sort_unstable();
    buckets.dedup();
    let distinct = buckets.len();

    // Gegenläufige Winkel liegen einen halben Umlauf auseinander (±1 Bucket Rundung)
    let half_turn = (PI * factor).round() as i64;
    let opposite = distinct == 2 && ((buckets[1] - buckets[0]) - half_turn).abs() <= 1;

    NodeMetadata {
        is_endpoint: connection_count == 1,
        is_corner: connection_count == 2 && distinct == 2 && !opposite,
        is_intersection: connection_count > 2 || distinct > 2,
    }
}

impl WallGraph {
    /// Berechnet die Metadaten der angegebenen Nodes komplett neu (nie inkrementell).
    pub(super) fn refresh_metadata(&mut self, node_ids: &[u64]) {
        let factor = self.options.angle_rounding_factor();
        for node_id in node_ids {
            let Some(node) = self.nodes.get_mut(node_id) else {
                continue;
            };
            node.metadata = classify_connections(node.connections.values().map(|c| c.angle), factor);
        }
    }

    /// Erwartete Metadaten eines Nodes bei aktuellem Verbindungsstand.
    pub(super) fn expected_metadata(&self, node_id: u64) -> Option<NodeMetadata> {
        let node = self.nodes.get(&node_id)?;
        Some(classify_connections(
            node.connections.values().map(|c| c.angle),
            self.options.angle_rounding_factor(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const FACTOR: f32 = 100.0;

    #[test]
    fn single_connection_is_endpoint() {
        let meta = classify_connections([0.0], FACTOR);
        assert!(meta.is_endpoint);
        assert!(!meta.is_corner);
        assert!(!meta.is_intersection);
    }

    #[test]
    fn right_angle_is_corner() {
        let meta = classify_connections([PI, FRAC_PI_2], FACTOR);
        assert!(meta.is_corner);
        assert!(!meta.is_endpoint);
        assert!(!meta.is_intersection);
    }

    #[test]
    fn straight_through_node_is_no_corner() {
        let meta = classify_connections([0.0, PI], FACTOR);
        assert!(!meta.is_corner);
        assert!(!meta.is_endpoint);
        assert!(!meta.is_intersection);

        let meta = classify_connections([FRAC_PI_2, -FRAC_PI_2], FACTOR);
        assert!(!meta.is_corner);
    }

    #[test]
    fn three_or_more_connections_are_intersection() {
        let meta = classify_connections([0.0, PI, FRAC_PI_2], FACTOR);
        assert!(meta.is_intersection);
        assert!(!meta.is_corner);

        let meta = classify_connections([0.0, FRAC_PI_2, PI, -FRAC_PI_2], FACTOR);
        assert!(meta.is_intersection);
    }

    #[test]
    fn rounding_noise_collapses_to_one_bucket() {
        // Zwei praktisch identische Richtungen → nur ein eindeutiger Winkel
        let meta = classify_connections([0.5, 0.5 + 1e-4], FACTOR);
        assert!(!meta.is_corner);
        assert!(!meta.is_intersection);
    }

    #[test]
    fn no_connections_yield_default_metadata() {
        assert_eq!(classify_connections(std::iter::empty::<f32>(), FACTOR), NodeMetadata::default());
    }
}
