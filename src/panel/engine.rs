//! The policy engine: owns the system state and enforces the shedding
//! policy whenever power or threshold changes.

use crate::error::PanelError;
use crate::loads::LoadRegistry;
use crate::panel::MAX_THRESHOLD_W;
use crate::panel::alert::{AlertLog, AlertRecord, Severity};
use crate::panel::policy::PolicyTable;
use crate::panel::state::{StateSnapshot, SystemState};
use crate::panel::status::{PowerStatus, classify_power};
use crate::telemetry::ReadingHistory;

/// Default retained alert count.
const DEFAULT_ALERT_CAPACITY: usize = 64;
/// Default retained chart points (the dashboard keeps a 12-point chart).
const DEFAULT_CHART_CAPACITY: usize = 12;

/// Observer invoked with a fresh snapshot after every state-changing
/// operation.
type StateObserver = Box<dyn FnMut(&StateSnapshot)>;
/// Observer invoked once per emitted alert, in emission order.
type AlertObserver = Box<dyn FnMut(&AlertRecord)>;

/// Load-shedding policy engine.
///
/// Owns the registry, the mutable [`SystemState`], the band table, the
/// bounded alert log, and the bounded reading history. Every operation is
/// synchronous and atomic with respect to observers: validation happens
/// before any mutation, and aggregates are recomputed before the operation
/// returns.
///
/// # Examples
///
/// ```
/// use loadshed_sim::loads::LoadRegistry;
/// use loadshed_sim::panel::PanelEngine;
///
/// let mut engine = PanelEngine::new(LoadRegistry::demo_panel(), 120, true);
/// assert_eq!(engine.total_power_w(), 120);
///
/// engine.set_threshold(110).unwrap();
/// // Branch shed band: the whole secondary feeder drops.
/// assert_eq!(engine.total_power_w(), 100);
/// ```
pub struct PanelEngine {
    registry: LoadRegistry,
    policy: PolicyTable,
    state: SystemState,
    alerts: AlertLog,
    history: ReadingHistory,
    state_observers: Vec<StateObserver>,
    alert_observers: Vec<AlertObserver>,
}

impl PanelEngine {
    /// Creates an engine with default alert/history capacities.
    ///
    /// The starting configuration is taken from the catalog's `default_on`
    /// flags; no policy evaluation runs until the first state-affecting
    /// operation.
    pub fn new(registry: LoadRegistry, threshold_w: u32, auto_mode: bool) -> Self {
        Self::with_capacities(
            registry,
            threshold_w,
            auto_mode,
            DEFAULT_ALERT_CAPACITY,
            DEFAULT_CHART_CAPACITY,
        )
    }

    /// Creates an engine with explicit alert and chart history capacities.
    pub fn with_capacities(
        registry: LoadRegistry,
        threshold_w: u32,
        auto_mode: bool,
        alert_capacity: usize,
        chart_capacity: usize,
    ) -> Self {
        let policy = PolicyTable::standard(&registry);
        let state = SystemState::new(&registry, threshold_w, auto_mode);
        Self {
            registry,
            policy,
            state,
            alerts: AlertLog::new(alert_capacity),
            history: ReadingHistory::new(chart_capacity),
            state_observers: Vec::new(),
            alert_observers: Vec::new(),
        }
    }

    /// Registers an observer fired after every operation that changed a
    /// load state, the threshold, or the auto-mode flag.
    pub fn on_state_changed(&mut self, f: impl FnMut(&StateSnapshot) + 'static) {
        self.state_observers.push(Box::new(f));
    }

    /// Registers an observer fired exactly once per emitted alert.
    pub fn on_alert(&mut self, f: impl FnMut(&AlertRecord) + 'static) {
        self.alert_observers.push(Box::new(f));
    }

    /// Sets the shedding threshold.
    ///
    /// Always emits one informational alert noting the new value, then
    /// re-evaluates the policy when auto mode is on.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::InvalidThreshold`] for negative values or
    /// values above [`MAX_THRESHOLD_W`].
    pub fn set_threshold(&mut self, watts: i64) -> Result<(), PanelError> {
        if watts < 0 || watts > i64::from(MAX_THRESHOLD_W) {
            return Err(PanelError::InvalidThreshold(watts));
        }
        let watts = watts as u32;
        let changed = self.state.threshold_w() != watts;
        self.state.set_threshold_w(watts);
        self.emit_alert(Severity::Info, format!("Power threshold set to {watts} W"));
        let shed = if self.state.auto_mode() {
            self.run_policy()
        } else {
            false
        };
        if changed || shed {
            self.notify_state();
        }
        Ok(())
    }

    /// Enables or disables automatic shedding.
    ///
    /// Setting the current value again is a silent no-op. Enabling
    /// immediately re-evaluates the policy against the current threshold;
    /// loads shed earlier are not restored.
    pub fn set_auto_mode(&mut self, enabled: bool) {
        if self.state.auto_mode() == enabled {
            return;
        }
        self.state.set_auto_mode(enabled);
        let message = if enabled {
            "Automatic load control enabled".to_string()
        } else {
            "Automatic load control disabled; manual control only".to_string()
        };
        self.emit_alert(Severity::Info, message);
        if enabled {
            self.run_policy();
        }
        self.notify_state();
    }

    /// Manually commands one load on or off, regardless of auto mode.
    ///
    /// Emits no alert of its own; when auto mode is on, the policy
    /// re-evaluates against the new total and may shed further.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::UnknownLoad`] for an uncatalogued id.
    pub fn set_load(&mut self, id: &str, on: bool) -> Result<(), PanelError> {
        let idx = self
            .registry
            .index_of(id)
            .ok_or_else(|| PanelError::UnknownLoad(id.to_string()))?;
        let changed = self.state.is_on(idx) != on;
        self.state.set_on(idx, on);
        self.state.recompute(&self.registry);
        let shed = if self.state.auto_mode() {
            self.run_policy()
        } else {
            false
        };
        if changed || shed {
            self.notify_state();
        }
        Ok(())
    }

    /// Bulk-commands a feeder group.
    ///
    /// Off turns every member off. On restores the feeder to its canonical
    /// partial-on configuration: every member on except the feeder's
    /// designated lowest-priority load, which stays off. On and off are
    /// deliberately not inverses for multi-load feeders.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::UnknownFeeder`] when no catalogued load
    /// belongs to `feeder`.
    pub fn set_feeder(&mut self, feeder: u8, on: bool) -> Result<(), PanelError> {
        if !self.registry.has_feeder(feeder) {
            return Err(PanelError::UnknownFeeder(feeder));
        }
        let stays_off = self.registry.restore_stays_off(feeder);
        let mut changed = false;
        for idx in self.registry.feeder_indices(feeder) {
            let want = on && Some(idx) != stays_off;
            if self.state.is_on(idx) != want {
                self.state.set_on(idx, want);
                changed = true;
            }
        }
        self.state.recompute(&self.registry);
        let shed = if self.state.auto_mode() {
            self.run_policy()
        } else {
            false
        };
        if changed || shed {
            self.notify_state();
        }
        Ok(())
    }

    /// Turns every load on except the globally lowest-priority one, which
    /// stays off (same partial-restore bias as feeder restore).
    pub fn all_on(&mut self) {
        let stays_off = self.registry.lowest_priority();
        self.set_all(|idx| idx != stays_off);
    }

    /// Turns every load off.
    pub fn all_off(&mut self) {
        self.set_all(|_| false);
    }

    fn set_all(&mut self, want: impl Fn(usize) -> bool) {
        let mut changed = false;
        for idx in 0..self.registry.len() {
            let on = want(idx);
            if self.state.is_on(idx) != on {
                self.state.set_on(idx, on);
                changed = true;
            }
        }
        self.state.recompute(&self.registry);
        let shed = if self.state.auto_mode() {
            self.run_policy()
        } else {
            false
        };
        if changed || shed {
            self.notify_state();
        }
    }

    /// Records an externally generated instantaneous power reading.
    ///
    /// Purely informational: classifies the reading against the threshold
    /// and appends it to the bounded chart history. Never mutates load
    /// state and never emits an alert — shedding is driven only by the
    /// commanded total, not by the noisy reading.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::InvalidReading`] for negative or non-finite
    /// values.
    pub fn tick(&mut self, power_w: f64) -> Result<PowerStatus, PanelError> {
        if !power_w.is_finite() || power_w < 0.0 {
            return Err(PanelError::InvalidReading(power_w));
        }
        let status = classify_power(power_w, self.state.threshold_w());
        self.history.push(power_w, status);
        Ok(status)
    }

    /// Forces a policy evaluation against the current threshold and total.
    ///
    /// Evaluation is idempotent: when no load needs to change, nothing is
    /// shed and no alert is emitted. Internal callers guard on auto mode;
    /// this entry point evaluates unconditionally.
    pub fn evaluate_policy(&mut self) {
        if self.run_policy() {
            self.notify_state();
        }
    }

    /// Applies the selected band's required shutdowns.
    ///
    /// Turns off exactly the currently-on loads in the band's target
    /// subset; never turns a load on. Returns `true` and emits one alert
    /// iff at least one load changed.
    fn run_policy(&mut self) -> bool {
        let threshold_w = self.state.threshold_w();
        let Some(band) = self.policy.band_for(threshold_w) else {
            return false;
        };
        let label = band.label;
        let severity = band.severity;
        let to_shed: Vec<usize> = band
            .shed_ids
            .iter()
            .filter_map(|id| self.registry.index_of(id))
            .filter(|&idx| self.state.is_on(idx))
            .collect();
        if to_shed.is_empty() {
            return false;
        }

        let mut dropped_w = 0u32;
        let mut names: Vec<&str> = Vec::with_capacity(to_shed.len());
        for &idx in &to_shed {
            self.state.set_on(idx, false);
            let load = &self.registry.loads()[idx];
            dropped_w += load.power_draw_w;
            names.push(load.name.as_str());
        }
        self.state.recompute(&self.registry);

        let message = format!(
            "{} band engaged at threshold {} W: shed {} ({} W off); total load now {} W",
            label,
            threshold_w,
            names.join(", "),
            dropped_w,
            self.state.total_power_w(),
        );
        self.emit_alert(severity, message);
        true
    }

    fn emit_alert(&mut self, severity: Severity, message: String) {
        let record = self.alerts.push(severity, message);
        for observer in &mut self.alert_observers {
            observer(&record);
        }
    }

    fn notify_state(&mut self) {
        let snapshot = self.state.snapshot(&self.registry);
        for observer in &mut self.state_observers {
            observer(&snapshot);
        }
    }

    /// Returns a read-only copy of the full panel state.
    pub fn snapshot(&self) -> StateSnapshot {
        self.state.snapshot(&self.registry)
    }

    /// Current threshold (W).
    pub fn threshold_w(&self) -> u32 {
        self.state.threshold_w()
    }

    /// Whether automatic shedding is enabled.
    pub fn auto_mode(&self) -> bool {
        self.state.auto_mode()
    }

    /// Commanded total power (W).
    pub fn total_power_w(&self) -> u32 {
        self.state.total_power_w()
    }

    /// Commanded total for one feeder (W).
    pub fn feeder_power_w(&self, feeder: u8) -> u32 {
        self.state.feeder_power_w(feeder)
    }

    /// Capacity minus commanded total (W).
    pub fn headroom_w(&self) -> u32 {
        self.state.headroom_w(&self.registry)
    }

    /// Commanded state of one load.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::UnknownLoad`] for an uncatalogued id.
    pub fn is_on(&self, id: &str) -> Result<bool, PanelError> {
        let idx = self
            .registry
            .index_of(id)
            .ok_or_else(|| PanelError::UnknownLoad(id.to_string()))?;
        Ok(self.state.is_on(idx))
    }

    /// The load catalog.
    pub fn registry(&self) -> &LoadRegistry {
        &self.registry
    }

    /// The ordered band table.
    pub fn policy(&self) -> &PolicyTable {
        &self.policy
    }

    /// The bounded alert history.
    pub fn alerts(&self) -> &AlertLog {
        &self.alerts
    }

    /// The bounded reading history.
    pub fn history(&self) -> &ReadingHistory {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn demo_engine() -> PanelEngine {
        PanelEngine::new(LoadRegistry::demo_panel(), 120, true)
    }

    #[test]
    fn startup_is_silent() {
        let engine = demo_engine();
        assert!(engine.alerts().is_empty());
        assert_eq!(engine.total_power_w(), 120);
    }

    #[test]
    fn set_threshold_always_emits_info() {
        let mut engine = demo_engine();
        engine.set_threshold(150).unwrap();
        assert_eq!(engine.alerts().len(), 1);
        let latest = engine.alerts().recent().next().cloned().unwrap();
        assert_eq!(latest.severity, Severity::Info);
        assert!(latest.message.contains("150"));
    }

    #[test]
    fn set_threshold_rejects_out_of_range() {
        let mut engine = demo_engine();
        assert!(engine.set_threshold(-1).is_err());
        assert!(engine.set_threshold(i64::from(MAX_THRESHOLD_W) + 1).is_err());
        // Failed calls leave no trace.
        assert!(engine.alerts().is_empty());
        assert_eq!(engine.threshold_w(), 120);
    }

    #[test]
    fn auto_mode_same_value_is_a_no_op() {
        let mut engine = demo_engine();
        engine.set_auto_mode(true);
        assert!(engine.alerts().is_empty());
        engine.set_auto_mode(false);
        assert_eq!(engine.alerts().len(), 1);
    }

    #[test]
    fn tick_rejects_bad_readings() {
        let mut engine = demo_engine();
        assert!(engine.tick(-1.0).is_err());
        assert!(engine.tick(f64::NAN).is_err());
        assert!(engine.tick(f64::INFINITY).is_err());
        assert!(engine.history().is_empty());
        assert_eq!(engine.tick(96.5), Ok(PowerStatus::Warning));
        assert_eq!(engine.history().len(), 1);
    }

    #[test]
    fn tick_never_sheds() {
        let mut engine = demo_engine();
        // A reading far above the threshold classifies critical but leaves
        // commanded state untouched.
        assert_eq!(engine.tick(10_000.0), Ok(PowerStatus::Critical));
        assert_eq!(engine.total_power_w(), 120);
        assert!(engine.alerts().is_empty());
    }

    #[test]
    fn observers_fire_in_order() {
        let mut engine = demo_engine();
        let seen: Rc<RefCell<Vec<u64>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        engine.on_alert(move |a| sink.borrow_mut().push(a.seq));

        let states: Rc<RefCell<Vec<u32>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&states);
        engine.on_state_changed(move |s| sink.borrow_mut().push(s.total_power_w));

        engine.set_threshold(110).unwrap();
        // Info alert then the branch-shed alert, one state notification.
        assert_eq!(seen.borrow().as_slice(), &[0, 1]);
        assert_eq!(states.borrow().as_slice(), &[100]);
    }

    #[test]
    fn manual_set_load_emits_no_alert() {
        let mut engine = PanelEngine::new(LoadRegistry::demo_panel(), 120, false);
        engine.set_load("hvac_fan", false).unwrap();
        assert!(engine.alerts().is_empty());
        assert_eq!(engine.total_power_w(), 70);
    }

    #[test]
    fn unknown_ids_are_rejected_without_mutation() {
        let mut engine = demo_engine();
        assert_eq!(
            engine.set_load("toaster", true),
            Err(PanelError::UnknownLoad("toaster".to_string()))
        );
        assert_eq!(engine.set_feeder(9, true), Err(PanelError::UnknownFeeder(9)));
        assert_eq!(engine.total_power_w(), 120);
    }
}
