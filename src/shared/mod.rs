//! Geteilte Konfiguration für alle Engine-Komponenten.

pub mod options;

pub use options::GraphOptions;
pub use options::{
    ANGLE_PRECISION_DECIMALS, DEFAULT_WALL_HEIGHT, DEFAULT_WALL_THICKNESS, SNAP_THRESHOLD,
    SPLIT_TOLERANCE,
};
