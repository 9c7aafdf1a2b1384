//! Panel driver and TUI application state.

use std::time::Instant;

use crate::config::PanelConfig;
use crate::panel::engine::PanelEngine;
use crate::telemetry::{Reading, ReadingSource, SimulatedMeter};

/// Tick interval options in milliseconds (slowest → fastest). The dashboard
/// the panel simulates refreshes every 2 seconds.
const SPEED_LEVELS_MS: [u64; 5] = [2000, 1000, 500, 250, 100];

/// Default speed index (1000 ms).
const DEFAULT_SPEED_IDX: usize = 1;

/// Threshold step applied per keypress (W).
const THRESHOLD_STEP_W: i64 = 5;

/// TUI application state.
pub struct App {
    /// Policy engine owning the panel state.
    pub engine: PanelEngine,
    /// Simulated meter feeding the chart.
    meter: SimulatedMeter,
    /// Configuration kept for restart.
    config: PanelConfig,
    /// Name of the active preset.
    pub preset_name: String,
    /// Number of readings taken so far.
    pub tick_count: usize,
    /// Latest meter reading, if any tick ran.
    pub last_reading: Option<Reading>,
    /// Whether ticking is paused.
    pub paused: bool,
    /// Current index into `SPEED_LEVELS_MS`.
    pub speed_idx: usize,
    /// Whether the user has requested quit.
    pub quit: bool,
    /// When the last tick was executed.
    pub last_tick: Instant,
}

impl App {
    /// Creates a new app from a validated configuration.
    pub fn new(config: PanelConfig, preset: &str) -> Self {
        let engine = build_engine(&config);
        let meter = build_meter(&config);
        Self {
            engine,
            meter,
            config,
            preset_name: preset.to_string(),
            tick_count: 0,
            last_reading: None,
            paused: false,
            speed_idx: DEFAULT_SPEED_IDX,
            quit: false,
            last_tick: Instant::now(),
        }
    }

    /// Draws a reading from the meter and records it with the engine.
    pub fn tick(&mut self) {
        let reading = self.meter.reading(self.engine.total_power_w());
        // Meter power is clamped non-negative, so recording cannot fail.
        let _ = self.engine.tick(reading.power_w);
        self.last_reading = Some(reading);
        self.tick_count += 1;
    }

    /// Toggles pause/resume.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Increases tick rate (shorter interval).
    pub fn speed_up(&mut self) {
        if self.speed_idx + 1 < SPEED_LEVELS_MS.len() {
            self.speed_idx += 1;
        }
    }

    /// Decreases tick rate (longer interval).
    pub fn speed_down(&mut self) {
        if self.speed_idx > 0 {
            self.speed_idx -= 1;
        }
    }

    /// Returns the current tick interval in milliseconds.
    pub fn tick_interval_ms(&self) -> u64 {
        SPEED_LEVELS_MS[self.speed_idx]
    }

    /// Moves the threshold by `steps` increments, clamped at zero.
    pub fn adjust_threshold(&mut self, steps: i64) {
        let current = i64::from(self.engine.threshold_w());
        let next = (current + steps * THRESHOLD_STEP_W).max(0);
        let _ = self.engine.set_threshold(next);
    }

    /// Toggles automatic shedding.
    pub fn toggle_auto(&mut self) {
        let enabled = self.engine.auto_mode();
        self.engine.set_auto_mode(!enabled);
    }

    /// Flips the commanded state of the load in catalog slot `slot`.
    pub fn toggle_load(&mut self, slot: usize) {
        let Some(load) = self.engine.registry().loads().get(slot) else {
            return;
        };
        let id = load.id.clone();
        if let Ok(on) = self.engine.is_on(&id) {
            let _ = self.engine.set_load(&id, !on);
        }
    }

    /// Toggles a feeder: off when any member draws power, else restore.
    pub fn toggle_feeder(&mut self, feeder: u8) {
        if !self.engine.registry().has_feeder(feeder) {
            return;
        }
        let any_on = self.engine.feeder_power_w(feeder) > 0;
        let _ = self.engine.set_feeder(feeder, !any_on);
    }

    /// Restores the partial-on all-loads configuration.
    pub fn all_on(&mut self) {
        self.engine.all_on();
    }

    /// Drops every load.
    pub fn all_off(&mut self) {
        self.engine.all_off();
    }

    /// Rebuilds the engine and meter from the kept configuration.
    pub fn restart(&mut self) {
        self.engine = build_engine(&self.config);
        self.meter = build_meter(&self.config);
        self.tick_count = 0;
        self.last_reading = None;
        self.paused = false;
    }
}

fn build_engine(config: &PanelConfig) -> PanelEngine {
    PanelEngine::with_capacities(
        config.build_registry(),
        config.panel.threshold_w,
        config.panel.auto_mode,
        config.panel.alert_capacity,
        config.panel.chart_capacity,
    )
}

fn build_meter(config: &PanelConfig) -> SimulatedMeter {
    let m = &config.meter;
    SimulatedMeter::new(
        m.nominal_voltage_v,
        m.voltage_jitter_v,
        m.power_jitter_w,
        m.nominal_power_factor,
        m.power_factor_jitter,
        m.seed,
    )
}
