//! Simulation module
//!
//! All board physics lives here:
//! - Pure layout generation from a config
//! - Explicit engine instance owning particles and bins
//! - Stable iteration order (by particle id)
//! - No rendering or platform dependencies

pub mod collision;
pub mod engine;
pub mod eviction;
pub mod layout;
pub mod state;

pub use collision::{CollisionResult, ball_pin_collision, reflect_with_restitution};
pub use engine::SimulationEngine;
pub use layout::{Layout, Pin, generate_layout};
pub use state::{Bin, Particle, ParticleId, ParticleState};
