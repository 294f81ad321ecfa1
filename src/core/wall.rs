//! Repräsentiert ein Wandsegment zwischen zwei Nodes.

use indexmap::IndexMap;

/// Freie Zusatz-Eigenschaften einer Wand (z.B. Material, Layer)
pub type WallProperties = IndexMap<String, String>;

/// Ein Wandsegment
#[derive(Debug, Clone, PartialEq)]
pub struct Wall {
    /// Eindeutige ID
    pub id: u64,
    /// Start-Node-ID
    pub start_node_id: u64,
    /// End-Node-ID
    pub end_node_id: u64,
    /// Wandstärke (> 0)
    pub thickness: f32,
    /// Wandhöhe (> 0)
    pub height: f32,
    /// Zusatz-Eigenschaften
    pub properties: WallProperties,
}

impl Wall {
    /// Erstellt eine neue Wand ohne Zusatz-Eigenschaften
    pub(crate) fn new(id: u64, start_node_id: u64, end_node_id: u64, thickness: f32, height: f32) -> Self {
        Self {
            id,
            start_node_id,
            end_node_id,
            thickness,
            height,
            properties: WallProperties::new(),
        }
    }

    /// Beide Endpunkt-IDs als `[start, end]`
    pub fn node_ids(&self) -> [u64; 2] {
        [self.start_node_id, self.end_node_id]
    }

    /// Prüft ob die Wand an `node_id` endet
    pub fn touches(&self, node_id: u64) -> bool {
        self.start_node_id == node_id || self.end_node_id == node_id
    }

    /// Liefert den gegenüberliegenden Endpunkt zu `node_id`
    pub fn other_end(&self, node_id: u64) -> Option<u64> {
        if self.start_node_id == node_id {
            Some(self.end_node_id)
        } else if self.end_node_id == node_id {
            Some(self.start_node_id)
        } else {
            None
        }
    }
}

/// Prüft ob Stärke und Höhe gültige (positive, endliche) Wandmaße sind.
pub fn valid_dimensions(thickness: f32, height: f32) -> bool {
    thickness.is_finite() && height.is_finite() && thickness > 0.0 && height > 0.0
}
