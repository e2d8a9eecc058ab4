//! Read-only board views for renderers and tooling

use bytemuck::{Pod, Zeroable};
use serde::Serialize;

use crate::sim::{Particle, SimulationEngine};

/// Marker stored in `ParticleInstance::bin` for falling balls
pub const NO_BIN: u32 = u32::MAX;

/// Per-ball instance data, laid out for a GPU instance buffer
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 3],
    pub radius: f32,
    /// 1 if settled
    pub settled: u32,
    pub bin: u32,
}

impl ParticleInstance {
    pub fn new(particle: &Particle, radius: f64) -> Self {
        let [x, y, z] = particle.position3();
        Self {
            position: [x as f32, y as f32, z as f32],
            radius: radius as f32,
            settled: particle.is_settled() as u32,
            bin: particle.bin().map_or(NO_BIN, |b| b as u32),
        }
    }
}

/// One ball as seen by a renderer
#[derive(Debug, Clone, Serialize)]
pub struct ParticleView {
    pub id: u64,
    pub position: [f64; 3],
    pub settled: bool,
    pub bin: Option<usize>,
}

/// Particle positions and bin counts at one instant
#[derive(Debug, Clone, Serialize)]
pub struct BoardSnapshot {
    pub ball_radius: f64,
    pub particles: Vec<ParticleView>,
    pub bin_counts: Vec<usize>,
    pub settled: usize,
    pub falling: usize,
}

impl BoardSnapshot {
    pub fn capture(engine: &SimulationEngine) -> Self {
        let particles: Vec<ParticleView> = engine
            .particles()
            .iter()
            .map(|p| ParticleView {
                id: p.id.0,
                position: p.position3(),
                settled: p.is_settled(),
                bin: p.bin(),
            })
            .collect();
        let settled = particles.iter().filter(|p| p.settled).count();

        Self {
            ball_radius: engine.geometry().ball_radius,
            falling: particles.len() - settled,
            settled,
            particles,
            bin_counts: engine.bin_counts(),
        }
    }

    /// GPU instance data for every ball
    pub fn instances(&self) -> Vec<ParticleInstance> {
        self.particles
            .iter()
            .map(|p| ParticleInstance {
                position: p.position.map(|c| c as f32),
                radius: self.ball_radius as f32,
                settled: p.settled as u32,
                bin: p.bin.map_or(NO_BIN, |b| b as u32),
            })
            .collect()
    }

    /// Mean bin index of settled balls
    pub fn mean_bin(&self) -> Option<f64> {
        let total: usize = self.bin_counts.iter().sum();
        if total == 0 {
            return None;
        }
        let weighted: f64 = self
            .bin_counts
            .iter()
            .enumerate()
            .map(|(i, &c)| i as f64 * c as f64)
            .sum();
        Some(weighted / total as f64)
    }

    /// Horizontal bar chart of bin counts, longest bar `width` wide
    pub fn histogram(&self, width: usize) -> String {
        let max = self.bin_counts.iter().copied().max().unwrap_or(0).max(1);
        let digits = self.bin_counts.len().saturating_sub(1).to_string().len();
        let mut out = String::new();
        for (i, &count) in self.bin_counts.iter().enumerate() {
            let bar = "#".repeat(count * width / max);
            out.push_str(&format!("{i:>digits$} | {bar} {count}\n"));
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Raw bytes of an instance slice, ready for upload
pub fn as_bytes(instances: &[ParticleInstance]) -> &[u8] {
    bytemuck::cast_slice(instances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardConfig;

    #[test]
    fn test_instance_layout() {
        assert_eq!(std::mem::size_of::<ParticleInstance>(), 24);
        let instance = ParticleInstance::zeroed();
        assert_eq!(as_bytes(&[instance]).len(), 24);
    }

    #[test]
    fn test_capture_counts() {
        let mut engine = SimulationEngine::with_seed(BoardConfig::triangular(8, 0.7), 8);
        for _ in 0..5 {
            engine.spawn_particle();
        }
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.falling, 5);
        assert_eq!(snapshot.settled, 0);
        assert_eq!(snapshot.bin_counts.len(), 9);
        assert_eq!(snapshot.mean_bin(), None);

        let instances = snapshot.instances();
        assert_eq!(instances.len(), 5);
        assert!(instances.iter().all(|i| i.bin == NO_BIN && i.settled == 0));
        assert_eq!(instances[0], ParticleInstance::new(&engine.particles()[0], snapshot.ball_radius));
        assert!(snapshot.to_json().unwrap().contains("\"falling\":5"));
    }

    #[test]
    fn test_mean_and_histogram() {
        let snapshot = BoardSnapshot {
            ball_radius: 0.1,
            particles: Vec::new(),
            bin_counts: vec![0, 2, 4, 2, 0],
            settled: 8,
            falling: 0,
        };
        assert_eq!(snapshot.mean_bin(), Some(2.0));
        let chart = snapshot.histogram(8);
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[2], "2 | ######## 4");
        assert_eq!(lines[1], "1 | #### 2");
    }
}
