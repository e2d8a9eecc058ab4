//! Simulation engine
//!
//! Owns the live particles and bin counters for one board. The engine is
//! stepped manually by a driver; it has no timer of its own.

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::{ball_pin_collision, resolve_board_bounds, resolve_pin_contact};
use super::eviction;
use super::layout::{Layout, Pin, generate_layout};
use super::state::{Bin, Particle, ParticleId};
use crate::config::{BoardConfig, BoardGeometry};
use crate::consts::MAX_STEP_DT;
use crate::snapshot::BoardSnapshot;

/// A Galton board simulation
#[derive(Debug, Clone)]
pub struct SimulationEngine {
    config: BoardConfig,
    geometry: BoardGeometry,
    layout: Layout,
    /// Live particles in creation order
    particles: Vec<Particle>,
    gravity_inverted: bool,
    rng: Pcg32,
    next_id: u64,
}

impl SimulationEngine {
    /// Create an engine with an unseeded RNG
    pub fn new(config: BoardConfig) -> Self {
        let seed = rand::rng().random();
        Self::with_seed(config, seed)
    }

    /// Create an engine whose random perturbations come from `seed`
    pub fn with_seed(config: BoardConfig, seed: u64) -> Self {
        let geometry = config.geometry();
        let layout = generate_layout(&config);
        log::info!(
            "Board: {} rows, {} pins, {} bins, width={:.2}",
            config.rows,
            layout.pins.len(),
            layout.bins.len(),
            geometry.width
        );
        Self {
            config,
            geometry,
            layout,
            particles: Vec::new(),
            gravity_inverted: false,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Discard the layout and all particles and rebuild from `config`
    pub fn rebuild(&mut self, config: BoardConfig) {
        self.geometry = config.geometry();
        self.layout = generate_layout(&config);
        self.config = config;
        self.particles.clear();
        log::info!(
            "Board rebuilt: {} rows, {} pins, {} bins",
            self.config.rows,
            self.layout.pins.len(),
            self.layout.bins.len()
        );
    }

    /// Remove every particle and zero the bin counters
    pub fn reset(&mut self) {
        self.particles.clear();
        for bin in &mut self.layout.bins {
            bin.count = 0;
        }
        log::debug!("Board reset");
    }

    /// Flip gravity (driven by an external orientation signal)
    pub fn set_gravity_inverted(&mut self, inverted: bool) {
        if self.gravity_inverted != inverted {
            log::info!("Gravity inverted: {inverted}");
        }
        self.gravity_inverted = inverted;
    }

    pub fn gravity_inverted(&self) -> bool {
        self.gravity_inverted
    }

    /// Current gravity acceleration
    pub fn gravity(&self) -> DVec2 {
        let g = DVec2::new(0.0, -self.config.gravity);
        if self.gravity_inverted { -g } else { g }
    }

    // === Queries ===

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn geometry(&self) -> &BoardGeometry {
        &self.geometry
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn pins(&self) -> &[Pin] {
        &self.layout.pins
    }

    pub fn bins(&self) -> &[Bin] {
        &self.layout.bins
    }

    pub fn bin_counts(&self) -> Vec<usize> {
        self.layout.bins.iter().map(|b| b.count).collect()
    }

    /// Live particles in creation order
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particle(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.iter().find(|p| p.id == id)
    }

    pub fn live_count(&self) -> usize {
        self.particles.len()
    }

    pub fn settled_count(&self) -> usize {
        self.particles.iter().filter(|p| p.is_settled()).count()
    }

    pub fn falling_count(&self) -> usize {
        self.live_count() - self.settled_count()
    }

    /// Capture a read-only view of the current board
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot::capture(self)
    }

    // === Spawning ===

    /// Drop a ball from the funnel with a small random horizontal offset
    pub fn spawn_particle(&mut self) -> ParticleId {
        let jitter = self.config.spawn_jitter;
        let x = if jitter > 0.0 {
            self.rng.random_range(-0.5..0.5) * jitter
        } else {
            0.0
        };
        self.spawn_particle_at(x)
    }

    /// Drop a ball from the funnel at exactly `x`, at rest
    pub fn spawn_particle_at(&mut self, x: f64) -> ParticleId {
        self.make_room();

        let id = ParticleId(self.next_id);
        self.next_id += 1;
        self.particles
            .push(Particle::new(id, DVec2::new(x, self.geometry.funnel_y)));
        id
    }

    /// Evict until one more falling particle fits within both caps
    fn make_room(&mut self) {
        let live_cap = self.config.live_cap();
        let settled_cap = self.config.max_settled;

        let mut settled = self.settled_count();
        if self.particles.len() < live_cap && settled < settled_cap {
            return;
        }

        // A falling ball goes first whenever a cap is hit
        if let Some(idx) = eviction::first_falling(&self.particles) {
            let victim = self.particles.remove(idx);
            log::debug!("Evicted falling particle {:?}", victim.id);
        } else if self.evict_settled() {
            settled -= 1;
        }

        // Settling between spawns can overshoot the settled cap
        while self.particles.len() >= live_cap || settled > settled_cap {
            let evicted = if settled > settled_cap {
                self.evict_settled()
            } else if let Some(idx) = eviction::first_falling(&self.particles) {
                self.particles.remove(idx);
                continue;
            } else {
                self.evict_settled()
            };
            if !evicted {
                break;
            }
            settled -= 1;
        }
    }

    /// Remove one settled particle per the edge/outside-in policy
    fn evict_settled(&mut self) -> bool {
        let Some((idx, bin_idx)) = eviction::settled_victim(&self.particles, self.layout.bins.len())
        else {
            return false;
        };

        let victim = self.particles.remove(idx);
        let bin = &mut self.layout.bins[bin_idx];
        bin.count = bin.count.saturating_sub(1);
        eviction::repack_bin(
            &mut self.particles,
            bin,
            self.geometry.ball_radius,
            self.config.stack_offset,
            self.geometry.top_y,
        );
        log::debug!(
            "Evicted settled particle {:?} from bin {} ({} left)",
            victim.id,
            bin_idx,
            bin.count
        );
        true
    }

    // === Stepping ===

    /// Advance all falling particles by `dt` seconds
    ///
    /// Steps outside `(0, MAX_STEP_DT)` are skipped entirely.
    pub fn step(&mut self, dt: f64) {
        if !(dt > 0.0 && dt < MAX_STEP_DT) {
            return;
        }

        let gravity = self.gravity();
        let config = &self.config;
        let geometry = &self.geometry;
        let radius = geometry.ball_radius;
        let half_width = geometry.half_width();
        let pins = &self.layout.pins;
        let bins = &mut self.layout.bins;
        let rng = &mut self.rng;

        for particle in &mut self.particles {
            if particle.is_settled() {
                continue;
            }

            // Integrate
            particle.vel += gravity * dt;
            particle.vel *= config.damping;
            particle.pos += particle.vel * dt;

            // Pin contacts, resolved one after another
            for pin in pins {
                let contact = ball_pin_collision(particle.pos, radius, pin);
                if !contact.hit {
                    continue;
                }
                let bounced = resolve_pin_contact(
                    &mut particle.pos,
                    &mut particle.vel,
                    pin,
                    &contact,
                    radius,
                    config.restitution,
                    config.contact_epsilon,
                );
                if bounced && config.pin_perturbation > 0.0 {
                    particle.vel.x += rng.random_range(-0.5..0.5) * config.pin_perturbation;
                }
            }

            // Bin settling
            let target = if particle.pos.y < geometry.collection_y {
                bin_index(particle.pos.x, half_width, config.pin_spacing)
                    .filter(|&i| i < bins.len())
            } else {
                None
            };
            if let Some(index) = target {
                let bin = &mut bins[index];
                let y = bin
                    .stack_height(bin.count, radius, config.stack_offset)
                    .max(bin.floor_y)
                    .min(geometry.top_y);
                particle.settle(bin.index, DVec2::new(bin.center_x, y));
                bin.count += 1;
                log::trace!("Particle {:?} settled in bin {}", particle.id, bin.index);
                continue;
            }

            resolve_board_bounds(
                &mut particle.pos,
                &mut particle.vel,
                radius,
                half_width,
                geometry.top_y,
                config.restitution,
            );
        }
    }
}

/// Bin under horizontal position `x`, if any
fn bin_index(x: f64, half_width: f64, spacing: f64) -> Option<usize> {
    let index = ((x + half_width) / spacing).floor();
    if index.is_finite() && index >= 0.0 {
        Some(index as usize)
    } else {
        None
    }
}
