//! Scripted demo driver: a fixed number of telemetry ticks with an optional
//! threshold dip, producing a telemetry log and the alerts it provoked.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::PanelConfig;
use crate::error::PanelError;
use crate::panel::alert::AlertRecord;
use crate::panel::engine::PanelEngine;
use crate::panel::state::StateSnapshot;
use crate::panel::status::{
    PowerFactorStatus, PowerStatus, VoltageStatus, classify_power_factor, classify_voltage,
};
use crate::telemetry::{ReadingSource, SimulatedMeter};

/// Scripted threshold adjustment applied during a demo window.
///
/// While a tick falls in `[start_tick, end_tick)` the demo lowers the
/// threshold to `threshold_w`; outside the window the configured threshold
/// is restored. Restoring the threshold does not restore shed loads.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdDip {
    /// Start tick (inclusive).
    pub start_tick: usize,
    /// End tick (exclusive).
    pub end_tick: usize,
    /// Threshold applied while active (W).
    pub threshold_w: u32,
}

impl ThresholdDip {
    /// Creates a dip spanning `[start_tick, end_tick)`.
    ///
    /// # Panics
    ///
    /// Panics if `start_tick >= end_tick`.
    pub fn new(start_tick: usize, end_tick: usize, threshold_w: u32) -> Self {
        assert!(start_tick < end_tick);
        Self {
            start_tick,
            end_tick,
            threshold_w,
        }
    }

    /// Returns `true` when `tick` falls within the active window.
    pub fn is_active(&self, tick: usize) -> bool {
        tick >= self.start_tick && tick < self.end_tick
    }

    /// Returns the dipped threshold if the dip is active at `tick`.
    pub fn threshold_at(&self, tick: usize) -> Option<u32> {
        if self.is_active(tick) {
            Some(self.threshold_w)
        } else {
            None
        }
    }
}

/// Complete record of one demo tick.
#[derive(Debug, Clone)]
pub struct TelemetryRow {
    /// Tick index.
    pub tick: usize,
    /// Simulated line voltage (V).
    pub voltage_v: f64,
    /// Simulated line current (A).
    pub current_a: f64,
    /// Simulated instantaneous power (W).
    pub power_w: f64,
    /// Simulated power factor.
    pub power_factor: f64,
    /// Power classification against the threshold.
    pub power_status: PowerStatus,
    /// Voltage classification against the service window.
    pub voltage_status: VoltageStatus,
    /// Power factor classification.
    pub power_factor_status: PowerFactorStatus,
    /// Threshold in effect at this tick (W).
    pub threshold_w: u32,
    /// Commanded total over on loads (W).
    pub commanded_w: u32,
    /// Capacity minus commanded total (W).
    pub headroom_w: u32,
    /// Whether automatic shedding was enabled at this tick.
    pub auto_mode: bool,
}

/// Result of a demo run: the per-tick log, every alert emitted, and the
/// final panel snapshot.
#[derive(Debug, Clone)]
pub struct DemoReport {
    /// One row per tick.
    pub telemetry: Vec<TelemetryRow>,
    /// Alerts in emission order, unbounded (unlike the engine's capped log).
    pub alerts: Vec<AlertRecord>,
    /// Panel state after the final tick.
    pub snapshot: StateSnapshot,
}

/// Runs the scripted demo described by `config`.
///
/// Builds the registry, engine, and meter from the configuration, then for
/// each tick applies the scheduled threshold (only when it differs from the
/// current one), draws a reading from the meter, and records a telemetry
/// row. Deterministic for a fixed configuration and seed.
///
/// # Errors
///
/// Returns a `PanelError` if a scripted operation is rejected; with a
/// validated configuration this does not happen.
pub fn run_demo(config: &PanelConfig, print_readable_log: bool) -> Result<DemoReport, PanelError> {
    let registry = config.build_registry();
    let mut engine = PanelEngine::with_capacities(
        registry,
        config.panel.threshold_w,
        config.panel.auto_mode,
        config.panel.alert_capacity,
        config.panel.chart_capacity,
    );
    let m = &config.meter;
    let mut meter = SimulatedMeter::new(
        m.nominal_voltage_v,
        m.voltage_jitter_v,
        m.power_jitter_w,
        m.nominal_power_factor,
        m.power_factor_jitter,
        m.seed,
    );

    let dip = config.demo.dip_enabled.then(|| {
        ThresholdDip::new(
            config.demo.dip_start,
            config.demo.dip_end,
            config.demo.dip_threshold_w,
        )
    });

    // Collect alerts through the observer seam so the report sees every
    // emission even when the engine's bounded log has already evicted it.
    let collected: Rc<RefCell<Vec<AlertRecord>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&collected);
    engine.on_alert(move |alert| sink.borrow_mut().push(alert.clone()));

    let base_threshold_w = config.panel.threshold_w;
    let mut telemetry = Vec::with_capacity(config.demo.ticks);

    for tick in 0..config.demo.ticks {
        let scheduled_w = dip
            .and_then(|d| d.threshold_at(tick))
            .unwrap_or(base_threshold_w);
        if scheduled_w != engine.threshold_w() {
            engine.set_threshold(i64::from(scheduled_w))?;
        }

        let reading = meter.reading(engine.total_power_w());
        let power_status = engine.tick(reading.power_w)?;

        let row = TelemetryRow {
            tick,
            voltage_v: reading.voltage_v,
            current_a: reading.current_a,
            power_w: reading.power_w,
            power_factor: reading.power_factor,
            power_status,
            voltage_status: classify_voltage(reading.voltage_v),
            power_factor_status: classify_power_factor(reading.power_factor),
            threshold_w: engine.threshold_w(),
            commanded_w: engine.total_power_w(),
            headroom_w: engine.headroom_w(),
            auto_mode: engine.auto_mode(),
        };

        if print_readable_log {
            println!(
                "Tick {:>3}: {:.1} V  {:.2} A  {:>7.1} W [{}] | \
                 commanded={} W  threshold={} W  headroom={} W",
                row.tick,
                row.voltage_v,
                row.current_a,
                row.power_w,
                row.power_status,
                row.commanded_w,
                row.threshold_w,
                row.headroom_w,
            );
        }

        telemetry.push(row);
    }

    let alerts = collected.borrow().clone();
    if print_readable_log && !alerts.is_empty() {
        println!("\n--- Alerts ---");
        for alert in &alerts {
            println!("[{:>9}] {}", alert.severity, alert.message);
        }
    }

    Ok(DemoReport {
        telemetry,
        alerts,
        snapshot: engine.snapshot(),
    })
}
