//! Particle and bin state
//!
//! Particles only move while `Falling`. Settling is one-way: a settled
//! particle keeps its position until it is evicted or the board is reset.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Monotonic particle id, doubles as creation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParticleId(pub u64);

/// Particle lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleState {
    /// Moving under gravity
    Falling,
    /// Resting in the given bin
    Settled { bin: usize },
}

/// A ball on the board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub id: ParticleId,
    pub pos: DVec2,
    pub vel: DVec2,
    pub state: ParticleState,
}

impl Particle {
    pub fn new(id: ParticleId, pos: DVec2) -> Self {
        Self {
            id,
            pos,
            vel: DVec2::ZERO,
            state: ParticleState::Falling,
        }
    }

    #[inline]
    pub fn is_settled(&self) -> bool {
        matches!(self.state, ParticleState::Settled { .. })
    }

    /// Bin index if settled
    #[inline]
    pub fn bin(&self) -> Option<usize> {
        match self.state {
            ParticleState::Settled { bin } => Some(bin),
            ParticleState::Falling => None,
        }
    }

    /// Position with z (the board is planar, z is always 0)
    #[inline]
    pub fn position3(&self) -> [f64; 3] {
        [self.pos.x, self.pos.y, 0.0]
    }

    /// Freeze the particle in a bin
    pub fn settle(&mut self, bin: usize, pos: DVec2) {
        self.pos = pos;
        self.vel = DVec2::ZERO;
        self.state = ParticleState::Settled { bin };
    }
}

/// A collection slot at the bottom of the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub index: usize,
    pub center_x: f64,
    /// Resting height of the bottom ball
    pub floor_y: f64,
    pub width: f64,
    /// Settled particles currently in this bin
    pub count: usize,
}

impl Bin {
    /// Height of the ball at stack position `slot` (0 = bottom)
    #[inline]
    pub fn stack_height(&self, slot: usize, ball_radius: f64, stack_offset: f64) -> f64 {
        self.floor_y + slot as f64 * ball_radius * stack_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settle_freezes_particle() {
        let mut p = Particle::new(ParticleId(1), DVec2::new(0.5, 2.0));
        p.vel = DVec2::new(1.0, -3.0);
        assert!(!p.is_settled());
        assert_eq!(p.bin(), None);

        p.settle(3, DVec2::new(0.25, -4.0));
        assert!(p.is_settled());
        assert_eq!(p.bin(), Some(3));
        assert_eq!(p.vel, DVec2::ZERO);
        assert_eq!(p.position3(), [0.25, -4.0, 0.0]);
    }

    #[test]
    fn test_stack_height() {
        let bin = Bin {
            index: 0,
            center_x: 0.0,
            floor_y: -5.0,
            width: 0.5,
            count: 0,
        };
        assert_eq!(bin.stack_height(0, 0.12, 0.3), -5.0);
        assert!((bin.stack_height(10, 0.1, 0.5) - (-4.5)).abs() < 1e-12);
    }

    #[test]
    fn test_ids_order_by_creation() {
        assert!(ParticleId(3) < ParticleId(10));
    }
}
