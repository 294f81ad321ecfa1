//! Floorplan Wall Editor Library.
//! Wand-Graph-Engine für 2D-Grundrisse, als Library exportiert für Editoren,
//! Exporter und Tests.

pub mod core;
pub mod shared;

pub use core::{
    ConnectError, ConnectOutcome, ConnectionConstraints, GraphChange, GraphChangeKind,
    GraphSnapshot, InvariantViolation, ListenerId, NodeConnection, NodeMetadata, SnapshotError,
    Wall, WallGraph, WallNode, WallSplit, WallUpdateError,
};
pub use core::{SpatialIndex, SpatialMatch};
pub use shared::GraphOptions;
