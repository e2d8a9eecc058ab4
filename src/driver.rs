//! Frame driver
//!
//! Turns absolute frame timestamps (milliseconds, as handed out by
//! `requestAnimationFrame` or a native loop) into engine steps and dropper
//! ticks. Everything runs on the caller's thread.

use crate::config::BoardConfig;
use crate::dropper::{Dropper, DropperConfig};
use crate::sim::SimulationEngine;
use crate::snapshot::BoardSnapshot;

#[derive(Debug, Clone)]
pub struct FrameDriver {
    engine: SimulationEngine,
    dropper: Dropper,
    last_time_ms: Option<f64>,
}

impl FrameDriver {
    pub fn new(engine: SimulationEngine, dropper: DropperConfig) -> Self {
        Self {
            engine,
            dropper: Dropper::new(dropper),
            last_time_ms: None,
        }
    }

    pub fn engine(&self) -> &SimulationEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut SimulationEngine {
        &mut self.engine
    }

    pub fn dropper(&self) -> &Dropper {
        &self.dropper
    }

    /// Run one frame at `time_ms`
    ///
    /// The first frame only records the clock. Large gaps reach the engine
    /// unchanged; it skips steps it considers unstable.
    pub fn frame(&mut self, time_ms: f64) {
        let Some(last) = self.last_time_ms.replace(time_ms) else {
            return;
        };
        let elapsed_ms = time_ms - last;

        self.engine.step(elapsed_ms / 1000.0);
        self.dropper.advance(elapsed_ms, &mut self.engine);
    }

    /// Start a drop run, or stop the current one
    pub fn toggle_drop(&mut self) {
        self.dropper.toggle(&mut self.engine);
    }

    pub fn start_drop(&mut self) {
        self.dropper.start(&mut self.engine);
    }

    pub fn set_dropper_config(&mut self, config: DropperConfig) {
        self.dropper.set_config(config);
    }

    pub fn set_gravity_inverted(&mut self, inverted: bool) {
        self.engine.set_gravity_inverted(inverted);
    }

    /// Clear the board and stop dropping
    pub fn reset(&mut self) {
        self.dropper.reset();
        self.engine.reset();
    }

    /// Stop dropping and rebuild the board from `config`
    pub fn rebuild(&mut self, config: BoardConfig) {
        self.dropper.reset();
        self.engine.rebuild(config);
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        self.engine.snapshot()
    }
}
