//! Snap-Index (KD-Tree) über Node-Positionen des Wand-Graphen.

use glam::Vec2;
use kiddo::{KdTree, SquaredEuclidean};

/// Ergebnis einer Distanzabfrage gegen den Snap-Index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialMatch {
    /// ID des gefundenen Nodes
    pub node_id: u64,
    /// Euklidische Distanz zum Suchpunkt
    pub distance: f32,
}

/// Behandlung von Treffern genau auf dem Radius
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    /// Distanz ≤ Radius (Bereichsabfrage)
    Inclusive,
    /// Distanz < Radius (Snap: ein Node genau auf der Schwelle gilt als frei)
    Strict,
}

/// Unveränderlicher Index über allen Node-Positionen; wird nach jeder
/// Positionsänderung komplett neu aufgebaut.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    tree: KdTree<f64, 2>,
    /// Node-ID je Tree-Eintrag (Eintrag `i` gehört zu `node_ids[i]`)
    node_ids: Vec<u64>,
}

impl SpatialIndex {
    /// Leerer Index.
    pub fn empty() -> Self {
        Self::build(std::iter::empty())
    }

    /// Baut den Index aus `(Node-ID, Position)`-Paaren.
    ///
    /// Einträge werden nach ID sortiert eingefügt, damit der Baum unabhängig von
    /// der Iterationsreihenfolge der Quelle deterministisch ist.
    pub fn build(entries: impl IntoIterator<Item = (u64, Vec2)>) -> Self {
        let mut entries: Vec<(u64, Vec2)> = entries.into_iter().collect();
        entries.sort_unstable_by_key(|(id, _)| *id);

        let points: Vec<[f64; 2]> = entries
            .iter()
            .map(|(_, pos)| [pos.x as f64, pos.y as f64])
            .collect();

        Self {
            tree: (&points).into(),
            node_ids: entries.into_iter().map(|(id, _)| id).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.node_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_ids.is_empty()
    }

    /// Nächster Node zur Weltposition.
    pub fn nearest(&self, query: Vec2) -> Option<SpatialMatch> {
        if self.is_empty() {
            return None;
        }
        let result = self
            .tree
            .nearest_one::<SquaredEuclidean>(&[query.x as f64, query.y as f64]);
        self.to_match(result.item, result.distance)
    }

    /// Alle Nodes mit Distanz ≤ `radius`, aufsteigend nach Distanz, bei Gleichstand nach ID.
    pub fn within_radius(&self, query: Vec2, radius: f32) -> Vec<SpatialMatch> {
        self.collect_within(query, radius, Boundary::Inclusive)
    }

    /// Alle Nodes echt näher als `threshold`, sortiert wie [`Self::within_radius`].
    pub fn within_snap(&self, query: Vec2, threshold: f32) -> Vec<SpatialMatch> {
        self.collect_within(query, threshold, Boundary::Strict)
    }

    /// Nächster Node echt innerhalb von `threshold`, den `exclude` nicht ausschließt.
    ///
    /// Grundlage für Merge-by-Proximity, Kreuzungsauflösung und Kollisionsprüfung
    /// beim Verschieben.
    pub fn snap_candidate(
        &self,
        query: Vec2,
        threshold: f32,
        exclude: impl Fn(u64) -> bool,
    ) -> Option<SpatialMatch> {
        self.collect_within(query, threshold, Boundary::Strict)
            .into_iter()
            .find(|m| !exclude(m.node_id))
    }

    fn collect_within(&self, query: Vec2, radius: f32, boundary: Boundary) -> Vec<SpatialMatch> {
        if self.is_empty() || radius.is_nan() || radius.is_sign_negative() {
            return Vec::new();
        }

        // Baum leicht über den Radius abfragen, die Randregel gilt danach auf f32-Distanzen
        let reach = (radius as f64).powi(2) * (1.0 + 1e-9) + f64::MIN_POSITIVE;
        let mut results: Vec<SpatialMatch> = self
            .tree
            .within::<SquaredEuclidean>(&[query.x as f64, query.y as f64], reach)
            .into_iter()
            .filter_map(|entry| self.to_match(entry.item, entry.distance))
            .filter(|m| match boundary {
                Boundary::Inclusive => m.distance <= radius,
                Boundary::Strict => m.distance < radius,
            })
            .collect();

        results.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.node_id.cmp(&b.node_id))
        });
        results
    }

    fn to_match(&self, item: u64, squared_distance: f64) -> Option<SpatialMatch> {
        let node_id = *self.node_ids.get(item as usize)?;
        Some(SpatialMatch {
            node_id,
            distance: squared_distance.sqrt() as f32,
        })
    }
}
