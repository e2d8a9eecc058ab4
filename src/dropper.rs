//! Fixed-cadence ball dropper
//!
//! Spawns one ball when started and then one per interval until the run's
//! budget is used up. The engine never schedules spawns itself; the dropper is
//! advanced by whatever clock drives the frame loop.

use serde::{Deserialize, Serialize};

use crate::consts::{DROP_BUDGET, DROP_INTERVAL_MS};
use crate::sim::SimulationEngine;

/// Spawns allowed in a single `advance` call (absorbs long frame gaps)
pub const MAX_CATCH_UP_DROPS: usize = 8;

/// Shortest interval accepted, in milliseconds
const MIN_INTERVAL_MS: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropperConfig {
    /// Milliseconds between drops
    pub interval_ms: f64,
    /// Balls per run (`None` = until stopped)
    pub budget: Option<usize>,
}

impl Default for DropperConfig {
    fn default() -> Self {
        Self {
            interval_ms: DROP_INTERVAL_MS,
            budget: Some(DROP_BUDGET),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dropper {
    config: DropperConfig,
    running: bool,
    /// Balls dropped in the current run
    dropped: usize,
    /// Time since the last drop
    elapsed_ms: f64,
}

impl Dropper {
    pub fn new(config: DropperConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Change cadence/budget; takes effect on the next interval
    pub fn set_config(&mut self, config: DropperConfig) {
        self.config = config;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Begin a new run, dropping the first ball immediately
    pub fn start(&mut self, engine: &mut SimulationEngine) {
        if self.running {
            return;
        }
        self.running = true;
        self.dropped = 0;
        self.elapsed_ms = 0.0;
        log::info!("Dropping {} balls", self.budget_label());
        self.drop_one(engine);
    }

    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        log::info!("Dropper stopped after {} balls", self.dropped);
    }

    /// Start if stopped, stop if running
    pub fn toggle(&mut self, engine: &mut SimulationEngine) {
        if self.running {
            self.stop();
        } else {
            self.start(engine);
        }
    }

    /// Stop and forget the current run
    pub fn reset(&mut self) {
        self.stop();
        self.dropped = 0;
        self.elapsed_ms = 0.0;
    }

    /// Advance the dropper clock, spawning any balls that are due
    ///
    /// Returns the number of balls spawned.
    pub fn advance(&mut self, elapsed_ms: f64, engine: &mut SimulationEngine) -> usize {
        if !self.running || !(elapsed_ms > 0.0) {
            return 0;
        }

        let interval = self.config.interval_ms.max(MIN_INTERVAL_MS);
        self.elapsed_ms += elapsed_ms;

        let mut spawned = 0;
        while self.running && self.elapsed_ms >= interval && spawned < MAX_CATCH_UP_DROPS {
            self.elapsed_ms -= interval;
            self.drop_one(engine);
            spawned += 1;
        }

        // Don't bank time we refused to spend
        if spawned == MAX_CATCH_UP_DROPS {
            self.elapsed_ms = self.elapsed_ms.min(interval);
        }
        spawned
    }

    fn drop_one(&mut self, engine: &mut SimulationEngine) {
        engine.spawn_particle();
        self.dropped += 1;
        if self.config.budget.is_some_and(|budget| self.dropped >= budget) {
            self.stop();
        }
    }

    fn budget_label(&self) -> String {
        match self.config.budget {
            Some(budget) => budget.to_string(),
            None => "unlimited".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardConfig;

    fn engine() -> SimulationEngine {
        SimulationEngine::with_seed(BoardConfig::triangular(8, 0.7), 1)
    }

    #[test]
    fn test_start_drops_immediately() {
        let mut engine = engine();
        let mut dropper = Dropper::default();
        dropper.start(&mut engine);
        assert!(dropper.is_running());
        assert_eq!(engine.live_count(), 1);
        assert_eq!(dropper.dropped(), 1);
    }

    #[test]
    fn test_cadence() {
        let mut engine = engine();
        let mut dropper = Dropper::new(DropperConfig {
            interval_ms: 100.0,
            budget: None,
        });
        dropper.start(&mut engine);
        assert_eq!(dropper.advance(99.0, &mut engine), 0);
        assert_eq!(dropper.advance(1.0, &mut engine), 1);
        assert_eq!(dropper.advance(250.0, &mut engine), 2);
        assert_eq!(dropper.dropped(), 4);
    }

    #[test]
    fn test_budget_stops_run() {
        let mut engine = engine();
        let mut dropper = Dropper::new(DropperConfig {
            interval_ms: 10.0,
            budget: Some(5),
        });
        dropper.start(&mut engine);
        for _ in 0..100 {
            dropper.advance(16.0, &mut engine);
        }
        assert!(!dropper.is_running());
        assert_eq!(dropper.dropped(), 5);
        assert_eq!(engine.live_count(), 5);
    }

    #[test]
    fn test_catch_up_is_bounded() {
        let mut engine = engine();
        let mut dropper = Dropper::new(DropperConfig {
            interval_ms: 10.0,
            budget: None,
        });
        dropper.start(&mut engine);
        assert_eq!(dropper.advance(10_000.0, &mut engine), MAX_CATCH_UP_DROPS);
        assert!(dropper.advance(5.0, &mut engine) <= 1);
    }

    #[test]
    fn test_toggle_and_reset() {
        let mut engine = engine();
        let mut dropper = Dropper::default();
        dropper.toggle(&mut engine);
        assert!(dropper.is_running());
        dropper.toggle(&mut engine);
        assert!(!dropper.is_running());
        assert_eq!(dropper.advance(1000.0, &mut engine), 0);

        dropper.reset();
        assert_eq!(dropper.dropped(), 0);
    }
}
