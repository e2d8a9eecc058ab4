//! Galton - a Galton board particle simulation
//!
//! Core modules:
//! - `sim`: Layout generation and the simulation engine (integration, pin
//!   collisions, bin settling, bounded eviction)
//! - `config`: Board parameters and derived geometry
//! - `dropper`: Fixed-cadence ball spawning with a per-run budget
//! - `driver`: Frame timestamps to simulation steps
//! - `snapshot`: Read-only views for renderers

pub mod config;
pub mod driver;
pub mod dropper;
pub mod sim;
pub mod snapshot;
#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use config::{BallSize, BoardConfig, BoardGeometry, PinPattern};
pub use driver::FrameDriver;
pub use dropper::{Dropper, DropperConfig};
pub use sim::{Bin, Layout, Particle, ParticleId, ParticleState, Pin, SimulationEngine};
pub use snapshot::{BoardSnapshot, ParticleInstance};

/// Simulation constants and config defaults
pub mod consts {
    /// `step` ignores any dt at or above this (pauses, tab switches)
    pub const MAX_STEP_DT: f64 = 0.2;

    /// Board defaults
    pub const DEFAULT_ROWS: usize = 20;
    pub const DEFAULT_PIN_SPACING: f64 = 0.5;
    pub const DEFAULT_PIN_RADIUS: f64 = 0.08;
    /// Ball radius as a fraction of pin spacing
    pub const BALL_SIZE_FRACTION: f64 = 0.24;
    /// Top row width relative to the bottom row
    pub const TRAPEZOID_TOP_WIDTH: f64 = 0.5;
    /// Pin field shift upward (fraction of board height), leaves room for the funnel
    pub const PIN_AREA_OFFSET: f64 = 0.3;

    /// Physics defaults
    pub const DEFAULT_GRAVITY: f64 = 9.8;
    pub const DEFAULT_RESTITUTION: f64 = 0.5;
    pub const DEFAULT_DAMPING: f64 = 0.98;
    /// Gap left between ball and pin after push-out (prevents sticking)
    pub const CONTACT_EPSILON: f64 = 0.01;
    /// Horizontal kick on pin bounce, uniform in ±PIN_PERTURBATION/2
    pub const PIN_PERTURBATION: f64 = 0.3;
    /// Spawn x offset, uniform in ±SPAWN_JITTER/2
    pub const SPAWN_JITTER: f64 = 0.2;

    /// Population defaults
    pub const DEFAULT_MAX_LIVE: usize = 1000;
    pub const DEFAULT_MAX_SETTLED: usize = 1000;
    /// Vertical spacing between stacked balls, in ball radii
    pub const DEFAULT_STACK_OFFSET: f64 = 0.3;

    /// Dropper defaults
    pub const DROP_INTERVAL_MS: f64 = 150.0;
    pub const DROP_BUDGET: usize = 50;
}
