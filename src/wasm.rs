//! Browser bindings
//!
//! Exposes a `GaltonBoard` class to JavaScript. The page owns rendering,
//! the animation loop and the orientation sensor; it calls `frame` once per
//! `requestAnimationFrame` and reads positions back for drawing.

use wasm_bindgen::prelude::*;

use crate::config::BoardConfig;
use crate::dropper::DropperConfig;
use crate::driver::FrameDriver;
use crate::sim::SimulationEngine;
use crate::snapshot::{self, BoardSnapshot};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // Fails only if a logger is already installed
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("Galton board (wasm) starting...");
}

fn parse_config(json: Option<String>) -> Result<BoardConfig, JsValue> {
    match json {
        Some(json) => BoardConfig::from_json(&json)
            .map_err(|e| JsValue::from_str(&format!("invalid board config: {e}"))),
        None => Ok(BoardConfig::default()),
    }
}

#[wasm_bindgen]
pub struct GaltonBoard {
    driver: FrameDriver,
}

#[wasm_bindgen]
impl GaltonBoard {
    /// Build a board from an optional JSON config
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<GaltonBoard, JsValue> {
        let config = parse_config(config_json)?;
        Ok(Self {
            driver: FrameDriver::new(SimulationEngine::new(config), DropperConfig::default()),
        })
    }

    /// Advance to the given `requestAnimationFrame` timestamp
    pub fn frame(&mut self, time_ms: f64) {
        self.driver.frame(time_ms);
    }

    pub fn step(&mut self, dt: f64) {
        self.driver.engine_mut().step(dt);
    }

    /// Spawn one ball, returning its id
    #[wasm_bindgen(js_name = spawnParticle)]
    pub fn spawn_particle(&mut self) -> u64 {
        self.driver.engine_mut().spawn_particle().0
    }

    /// Start/stop dropping `count` balls every `interval_ms`
    #[wasm_bindgen(js_name = toggleDrop)]
    pub fn toggle_drop(&mut self, count: usize, interval_ms: f64) -> bool {
        if !self.driver.dropper().is_running() {
            self.driver.set_dropper_config(DropperConfig {
                interval_ms,
                budget: Some(count),
            });
        }
        self.driver.toggle_drop();
        self.driver.dropper().is_running()
    }

    #[wasm_bindgen(js_name = isDropping)]
    pub fn is_dropping(&self) -> bool {
        self.driver.dropper().is_running()
    }

    pub fn reset(&mut self) {
        self.driver.reset();
    }

    /// Replace the board with one built from a JSON config
    pub fn rebuild(&mut self, config_json: String) -> Result<(), JsValue> {
        let config = parse_config(Some(config_json))?;
        self.driver.rebuild(config);
        Ok(())
    }

    #[wasm_bindgen(js_name = setGravityInverted)]
    pub fn set_gravity_inverted(&mut self, inverted: bool) {
        self.driver.set_gravity_inverted(inverted);
    }

    /// Pin centers as flat `[x, y, x, y, ...]`
    #[wasm_bindgen(js_name = pinPositions)]
    pub fn pin_positions(&self) -> js_sys::Float32Array {
        let flat: Vec<f32> = self
            .driver
            .engine()
            .pins()
            .iter()
            .flat_map(|p| [p.pos.x as f32, p.pos.y as f32])
            .collect();
        js_sys::Float32Array::from(flat.as_slice())
    }

    /// Bin centers, left to right
    #[wasm_bindgen(js_name = binCenters)]
    pub fn bin_centers(&self) -> Vec<f64> {
        self.driver.engine().layout().bin_centers()
    }

    #[wasm_bindgen(js_name = binCounts)]
    pub fn bin_counts(&self) -> Vec<u32> {
        self.driver
            .engine()
            .bin_counts()
            .into_iter()
            .map(|c| c as u32)
            .collect()
    }

    /// Packed instance buffer (see `ParticleInstance`), ready for GPU upload
    pub fn instances(&self) -> js_sys::Uint8Array {
        let instances = BoardSnapshot::capture(self.driver.engine()).instances();
        js_sys::Uint8Array::from(snapshot::as_bytes(&instances))
    }

    #[wasm_bindgen(js_name = ballRadius)]
    pub fn ball_radius(&self) -> f64 {
        self.driver.engine().geometry().ball_radius
    }

    #[wasm_bindgen(js_name = snapshotJson)]
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        self.driver
            .snapshot()
            .to_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
