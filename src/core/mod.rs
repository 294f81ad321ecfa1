//! Core-Domänentypen: Nodes, Wände, Wand-Graph, Spatial-Index, Events.

pub mod events;
pub mod geometry;
/// Core-Datenmodelle des Grundriss-Editors
///
/// - WallGraph: Container für alle Nodes und Wände
/// - WallNode: Endpunkt, Ecke oder Kreuzung mit gespiegelten Verbindungen
/// - Wall: Wandsegment zwischen genau zwei Nodes
pub mod node;
pub mod spatial;
pub mod wall;
pub mod wall_graph;

pub use events::{ChangeNotifier, GraphChange, GraphChangeKind, ListenerId};
pub use node::{ConnectionConstraints, NodeConnection, NodeMetadata, WallNode};
pub use spatial::{SpatialIndex, SpatialMatch};
pub use wall::{Wall, WallProperties};
pub use wall_graph::{
    classify_connections, ConnectError, ConnectOutcome, GraphSnapshot, InvariantViolation,
    NodeSnapshot, SnapshotError, WallGraph, WallSnapshot, WallSplit, WallUpdateError,
};
