//! Repräsentiert einen Wand-Node (Endpunkt, Ecke oder Kreuzung) im Grundriss.

use glam::Vec2;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Optionale Bearbeitungs-Einschränkungen einer Verbindung.
///
/// Werden gespiegelt auf beiden Seiten einer Wand gespeichert; die Engine
/// erzwingt sie nicht, sondern reicht sie an die Editier-Tools weiter.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ConnectionConstraints {
    /// Fixierter Wandwinkel (Radiant), falls gesetzt
    pub locked_angle: Option<f32>,
    /// Fixierte Wandlänge (Welteinheiten), falls gesetzt
    pub locked_length: Option<f32>,
}

/// Gerichteter Adjazenz-Eintrag eines Nodes zu einem Nachbarn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConnection {
    /// ID des Nachbar-Nodes
    pub neighbor_node_id: u64,
    /// ID der Wand zwischen beiden Nodes
    pub wall_id: u64,
    /// Richtungswinkel von diesem Node zum Nachbarn (Radiant)
    pub angle: f32,
    /// Optionale Einschränkungen
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<ConnectionConstraints>,
}

/// Abgeleitete Klassifizierung eines Nodes, nie direkt von außen gesetzt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMetadata {
    /// Zwei nicht-kollineare Wände treffen sich
    pub is_corner: bool,
    /// Drei oder mehr Wände treffen sich
    pub is_intersection: bool,
    /// Genau eine Wand endet hier
    pub is_endpoint: bool,
}

impl Default for NodeMetadata {
    fn default() -> Self {
        Self {
            is_corner: false,
            is_intersection: false,
            is_endpoint: true,
        }
    }
}

/// Ein Node im Wand-Graph
#[derive(Debug, Clone, PartialEq)]
pub struct WallNode {
    /// Eindeutige ID
    pub id: u64,
    /// Position in Weltkoordinaten
    pub position: Vec2,
    /// Verbindungen, indexiert nach Nachbar-ID (Einfüge-Reihenfolge bleibt erhalten)
    pub(crate) connections: IndexMap<u64, NodeConnection>,
    /// Abgeleitete Metadaten
    pub(crate) metadata: NodeMetadata,
}

impl WallNode {
    /// Erstellt einen neuen Node ohne Verbindungen
    pub(crate) fn new(id: u64, position: Vec2) -> Self {
        Self {
            id,
            position,
            connections: IndexMap::new(),
            metadata: NodeMetadata::default(),
        }
    }

    /// Verbindungen dieses Nodes (read-only)
    pub fn connections(&self) -> &IndexMap<u64, NodeConnection> {
        &self.connections
    }

    /// Verbindung zu einem bestimmten Nachbarn
    pub fn connection_to(&self, neighbor_id: u64) -> Option<&NodeConnection> {
        self.connections.get(&neighbor_id)
    }

    /// Abgeleitete Metadaten
    pub fn metadata(&self) -> NodeMetadata {
        self.metadata
    }

    /// Anzahl angeschlossener Wände
    pub fn degree(&self) -> usize {
        self.connections.len()
    }

    /// IDs aller angeschlossenen Wände, in Verbindungs-Reihenfolge
    pub fn wall_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.connections.values().map(|c| c.wall_id)
    }
}
