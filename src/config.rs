//! Board configuration and derived geometry
//!
//! A `BoardConfig` is an immutable value. Changing the board means building a
//! new config and handing it to `SimulationEngine::rebuild`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// How the ball radius is chosen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BallSize {
    /// Absolute radius in board units
    Fixed { radius: f64 },
    /// Radius as a fraction of the pin spacing
    Relative { fraction: f64 },
}

impl Default for BallSize {
    fn default() -> Self {
        BallSize::Relative {
            fraction: BALL_SIZE_FRACTION,
        }
    }
}

/// Shape of the pin field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinPattern {
    /// Row `r` holds `r + 1` pins
    Triangular,
    /// Row width interpolates from `top_width_ratio * bins` to `bins`
    Trapezoidal { top_width_ratio: f64 },
}

impl Default for PinPattern {
    fn default() -> Self {
        PinPattern::Trapezoidal {
            top_width_ratio: TRAPEZOID_TOP_WIDTH,
        }
    }
}

/// Board and physics parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Number of pin rows
    pub rows: usize,
    /// Distance between neighbouring pins (both axes)
    pub pin_spacing: f64,
    /// Pin collision radius
    pub pin_radius: f64,
    /// Number of collection bins (`None` = rows + 1)
    pub bin_count: Option<usize>,
    pub ball_size: BallSize,
    pub pattern: PinPattern,

    // === Physics ===
    /// Gravity magnitude (units/s²)
    pub gravity: f64,
    /// Fraction of normal velocity kept (and inverted) after a bounce
    pub restitution: f64,
    /// Per-step velocity multiplier
    pub damping: f64,
    /// Extra gap left after pushing a ball out of a pin
    pub contact_epsilon: f64,
    /// Width of the uniform horizontal kick applied on pin bounces
    pub pin_perturbation: f64,
    /// Width of the uniform horizontal offset applied at spawn
    pub spawn_jitter: f64,

    // === Population ===
    /// Maximum number of particles alive at once
    pub max_live: usize,
    /// Maximum number of settled particles
    pub max_settled: usize,
    /// Vertical spacing between stacked balls, in ball radii
    pub stack_offset: f64,

    /// Upward shift of the pin field as a fraction of board height
    pub pin_area_offset: f64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            pin_spacing: DEFAULT_PIN_SPACING,
            pin_radius: DEFAULT_PIN_RADIUS,
            bin_count: None,
            ball_size: BallSize::default(),
            pattern: PinPattern::default(),

            gravity: DEFAULT_GRAVITY,
            restitution: DEFAULT_RESTITUTION,
            damping: DEFAULT_DAMPING,
            contact_epsilon: CONTACT_EPSILON,
            pin_perturbation: PIN_PERTURBATION,
            spawn_jitter: SPAWN_JITTER,

            max_live: DEFAULT_MAX_LIVE,
            max_settled: DEFAULT_MAX_SETTLED,
            stack_offset: DEFAULT_STACK_OFFSET,

            pin_area_offset: PIN_AREA_OFFSET,
        }
    }
}

impl BoardConfig {
    /// Triangular board with `rows + 1` bins
    pub fn triangular(rows: usize, pin_spacing: f64) -> Self {
        Self {
            rows,
            pin_spacing,
            pattern: PinPattern::Triangular,
            ..Self::default()
        }
    }

    /// Effective bin count
    pub fn bins(&self) -> usize {
        self.bin_count.unwrap_or(self.rows + 1)
    }

    /// Effective ball radius
    pub fn ball_radius(&self) -> f64 {
        match self.ball_size {
            BallSize::Fixed { radius } => radius,
            BallSize::Relative { fraction } => self.pin_spacing * fraction,
        }
    }

    /// Cap on live particles (never below 1 so a spawn always fits)
    pub fn live_cap(&self) -> usize {
        self.max_live.max(1)
    }

    /// Derived board dimensions
    pub fn geometry(&self) -> BoardGeometry {
        BoardGeometry::from_config(self)
    }

    /// Parse a config from JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Load a config file, falling back to defaults on any failure
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded board config from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("Invalid board config {}: {e}; using defaults", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Cannot read {}: {e}; using defaults", path.display());
                Self::default()
            }
        }
    }
}

/// Dimensions derived from a config (board-local coordinates, origin at center)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoardGeometry {
    pub width: f64,
    pub height: f64,
    pub ball_radius: f64,
    /// Ceiling balls cannot rise above
    pub top_y: f64,
    /// Height of the first pin row
    pub pin_top_y: f64,
    /// Spawn height
    pub funnel_y: f64,
    /// Balls below this line are assigned to a bin
    pub collection_y: f64,
    /// Physical bottom of the bins
    pub floor_y: f64,
}

impl BoardGeometry {
    pub fn from_config(config: &BoardConfig) -> Self {
        let width = config.bins() as f64 * config.pin_spacing;
        let height = config.rows as f64 * config.pin_spacing;
        let offset = config.pin_area_offset;
        Self {
            width,
            height,
            ball_radius: config.ball_radius(),
            top_y: height * (0.3 + offset),
            pin_top_y: height * (0.2 + offset),
            funnel_y: height * (0.4 + offset),
            collection_y: -height * 0.8,
            floor_y: -height * 1.05,
        }
    }

    #[inline]
    pub fn half_width(&self) -> f64 {
        self.width / 2.0
    }

    /// Resting height of the bottom ball in a bin
    #[inline]
    pub fn bin_floor_y(&self) -> f64 {
        self.floor_y + self.ball_radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_rows() {
        let config = BoardConfig::default();
        assert_eq!(config.bins(), config.rows + 1);
        assert!((config.ball_radius() - 0.12).abs() < 1e-12);
    }

    #[test]
    fn test_explicit_bin_count() {
        let config = BoardConfig {
            bin_count: Some(7),
            ..BoardConfig::triangular(8, 0.7)
        };
        assert_eq!(config.bins(), 7);
        let geometry = config.geometry();
        assert!((geometry.width - 4.9).abs() < 1e-9);
    }

    #[test]
    fn test_geometry_ordering() {
        let g = BoardConfig::default().geometry();
        assert!(g.funnel_y > g.top_y);
        assert!(g.top_y > g.pin_top_y);
        assert!(g.collection_y > g.floor_y);
        assert!(g.bin_floor_y() > g.floor_y);
    }

    #[test]
    fn test_json_partial_uses_defaults() {
        let config = BoardConfig::from_json(r#"{ "rows": 8, "pattern": "triangular" }"#).unwrap();
        assert_eq!(config.rows, 8);
        assert_eq!(config.pattern, PinPattern::Triangular);
        assert_eq!(config.max_live, DEFAULT_MAX_LIVE);
    }

    #[test]
    fn test_json_round_trip() {
        let config = BoardConfig {
            ball_size: BallSize::Fixed { radius: 0.2 },
            ..BoardConfig::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(BoardConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let config = BoardConfig::load("/definitely/not/here.json");
        assert_eq!(config, BoardConfig::default());
    }

    #[test]
    fn test_live_cap_never_zero() {
        let config = BoardConfig {
            max_live: 0,
            ..BoardConfig::default()
        };
        assert_eq!(config.live_cap(), 1);
    }
}
