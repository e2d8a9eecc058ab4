//! Pin and bin layout generation
//!
//! Pins are laid out row by row from the top of the pin field downward. Each
//! row is centered on the board, so triangular and trapezoidal fields both
//! narrow symmetrically toward the funnel.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::state::Bin;
use crate::config::{BoardConfig, PinPattern};

/// A static circular obstacle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    pub pos: DVec2,
    pub radius: f64,
    /// Row index (0 = top)
    pub row: usize,
}

/// Pins plus empty bins for a board
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Layout {
    pub pins: Vec<Pin>,
    pub bins: Vec<Bin>,
}

impl Layout {
    /// Center x of every bin, left to right
    pub fn bin_centers(&self) -> Vec<f64> {
        self.bins.iter().map(|b| b.center_x).collect()
    }

    /// Pins belonging to `row`
    pub fn row(&self, row: usize) -> impl Iterator<Item = &Pin> {
        self.pins.iter().filter(move |p| p.row == row)
    }
}

/// Number of pins in `row` for the given pattern
pub fn row_pin_count(config: &BoardConfig, row: usize) -> usize {
    match config.pattern {
        PinPattern::Triangular => row + 1,
        PinPattern::Trapezoidal { top_width_ratio } => {
            let bins = config.bins() as f64;
            // Single-row boards have no progress to interpolate over
            let progress = if config.rows > 1 {
                row as f64 / (config.rows - 1) as f64
            } else {
                0.0
            };
            let count = top_width_ratio * bins + (1.0 - top_width_ratio) * bins * progress;
            count.floor().max(0.0) as usize
        }
    }
}

/// Build the pin field and bins for a config
///
/// Pure and deterministic. Degenerate configs (no rows or no bins) produce an
/// empty pin field rather than failing.
pub fn generate_layout(config: &BoardConfig) -> Layout {
    let geometry = config.geometry();
    let spacing = config.pin_spacing;
    let bin_count = config.bins();
    let half_width = geometry.half_width();

    let bins = (0..bin_count)
        .map(|i| Bin {
            index: i,
            center_x: -half_width + spacing / 2.0 + i as f64 * spacing,
            floor_y: geometry.bin_floor_y(),
            width: spacing,
            count: 0,
        })
        .collect();

    if bin_count == 0 || config.rows == 0 {
        return Layout {
            pins: Vec::new(),
            bins,
        };
    }

    let mut pins = Vec::new();
    for row in 0..config.rows {
        let pin_count = row_pin_count(config, row);
        let row_offset = (bin_count as f64 - pin_count as f64) * spacing / 2.0;
        let y = geometry.pin_top_y - row as f64 * spacing;

        for i in 0..pin_count {
            let x = i as f64 * spacing + row_offset - half_width + spacing / 2.0;
            pins.push(Pin {
                pos: DVec2::new(x, y),
                radius: config.pin_radius,
                row,
            });
        }
    }

    Layout { pins, bins }
}
