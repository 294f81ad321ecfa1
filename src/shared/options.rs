//! Zentrale Konfiguration der Wand-Graph-Engine.
//!
//! `GraphOptions` enthält alle zur Laufzeit änderbaren Toleranzen und Defaults.
//! Die `const`-Werte bleiben als Fallback/Default erhalten.

use serde::{Deserialize, Serialize};

// ── Toleranzen ──────────────────────────────────────────────────────

/// Snap-Schwelle (Welteinheiten): Positionen näher als dieser Abstand gelten als derselbe Node.
pub const SNAP_THRESHOLD: f32 = 1.0;
/// Nachkommastellen, auf die Verbindungswinkel vor der Klassifizierung gerundet werden.
///
/// Bewusste Näherung: zwei Winkel gelten als gleich, wenn sie auf diese
/// Genauigkeit gerundet übereinstimmen (keine exakte geometrische Gleichheit).
pub const ANGLE_PRECISION_DECIMALS: u32 = 2;
/// Lotabstand, innerhalb dessen ein Schnittpunkt noch als "auf der Wand" gilt.
pub const SPLIT_TOLERANCE: f32 = 0.01;

// ── Wand-Defaults ───────────────────────────────────────────────────

/// Standard-Wandstärke in Welteinheiten.
pub const DEFAULT_WALL_THICKNESS: f32 = 10.0;
/// Standard-Wandhöhe in Welteinheiten.
pub const DEFAULT_WALL_HEIGHT: f32 = 240.0;

/// Alle zur Laufzeit änderbaren Engine-Optionen.
/// Wird als `floorplan_wall_editor.toml` gespeichert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphOptions {
    /// Snap-Schwelle für Merge-by-Proximity und Kollisionsprüfungen
    pub snap_threshold: f32,
    /// Rundungsgenauigkeit (Nachkommastellen) für die Winkel-Klassifizierung
    pub angle_precision_decimals: u32,
    /// Lotabstand-Toleranz für Split-Nodes auf bestehenden Wänden
    pub split_tolerance: f32,
    /// Wandstärke für `connect_nodes_default`
    pub default_wall_thickness: f32,
    /// Wandhöhe für `connect_nodes_default`
    pub default_wall_height: f32,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            snap_threshold: SNAP_THRESHOLD,
            angle_precision_decimals: ANGLE_PRECISION_DECIMALS,
            split_tolerance: SPLIT_TOLERANCE,
            default_wall_thickness: DEFAULT_WALL_THICKNESS,
            default_wall_height: DEFAULT_WALL_HEIGHT,
        }
    }
}

impl GraphOptions {
    /// Lädt Optionen aus einer TOML-Datei. Bei Fehler: Standardwerte.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(opts) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    opts
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Speichert Optionen als TOML-Datei.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }

    /// Faktor `10^angle_precision_decimals` für die Winkel-Rundung.
    pub fn angle_rounding_factor(&self) -> f32 {
        10f32.powi(self.angle_precision_decimals.min(6) as i32)
    }
}
