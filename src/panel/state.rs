//! The one mutable aggregate: commanded load states, threshold, and cached
//! totals.

use serde::Serialize;

use crate::loads::LoadRegistry;
use crate::panel::status::{PowerStatus, classify_power};

/// Mutable panel state, owned exclusively by the policy engine.
///
/// `on` parallels the registry's catalog order. The cached totals are
/// recomputed after every mutation, before any observer can see the state:
/// `total_power_w` always equals the sum of draws over currently-on loads.
#[derive(Debug, Clone)]
pub struct SystemState {
    threshold_w: u32,
    auto_mode: bool,
    on: Vec<bool>,
    total_power_w: u32,
    feeder_power_w: Vec<(u8, u32)>,
}

impl SystemState {
    /// Creates state from the catalog's default on/off configuration.
    pub fn new(registry: &LoadRegistry, threshold_w: u32, auto_mode: bool) -> Self {
        let on = registry.loads().iter().map(|l| l.default_on).collect();
        let mut state = Self {
            threshold_w,
            auto_mode,
            on,
            total_power_w: 0,
            feeder_power_w: Vec::new(),
        };
        state.recompute(registry);
        state
    }

    /// Current threshold (W).
    pub fn threshold_w(&self) -> u32 {
        self.threshold_w
    }

    /// Sets the threshold. Callers validate range beforehand.
    pub fn set_threshold_w(&mut self, watts: u32) {
        self.threshold_w = watts;
    }

    /// Whether automatic shedding is enabled.
    pub fn auto_mode(&self) -> bool {
        self.auto_mode
    }

    /// Enables or disables automatic shedding.
    pub fn set_auto_mode(&mut self, enabled: bool) {
        self.auto_mode = enabled;
    }

    /// Commanded state of the load at catalog index `idx`.
    pub fn is_on(&self, idx: usize) -> bool {
        self.on[idx]
    }

    /// Sets the commanded state of one load. The caller must recompute
    /// aggregates before the surrounding operation returns.
    pub fn set_on(&mut self, idx: usize, on: bool) {
        self.on[idx] = on;
    }

    /// Recomputes the cached total and per-feeder totals from `on`.
    pub fn recompute(&mut self, registry: &LoadRegistry) {
        let mut total = 0u32;
        let mut feeders: Vec<(u8, u32)> = registry
            .feeders()
            .into_iter()
            .map(|f| (f, 0u32))
            .collect();
        for (idx, load) in registry.loads().iter().enumerate() {
            if self.on[idx] {
                total += load.power_draw_w;
                if let Some(entry) = feeders.iter_mut().find(|(f, _)| *f == load.feeder) {
                    entry.1 += load.power_draw_w;
                }
            }
        }
        self.total_power_w = total;
        self.feeder_power_w = feeders;
    }

    /// Cached total commanded power (W).
    pub fn total_power_w(&self) -> u32 {
        self.total_power_w
    }

    /// Cached total for one feeder (W); zero for unknown feeders.
    pub fn feeder_power_w(&self, feeder: u8) -> u32 {
        self.feeder_power_w
            .iter()
            .find(|(f, _)| *f == feeder)
            .map_or(0, |(_, w)| *w)
    }

    /// Headroom: connected capacity minus the commanded total (W).
    pub fn headroom_w(&self, registry: &LoadRegistry) -> u32 {
        registry.capacity_w().saturating_sub(self.total_power_w)
    }

    /// Builds a read-only snapshot for observers and polling consumers.
    pub fn snapshot(&self, registry: &LoadRegistry) -> StateSnapshot {
        let loads = registry
            .loads()
            .iter()
            .enumerate()
            .map(|(idx, l)| LoadState {
                id: l.id.clone(),
                name: l.name.clone(),
                power_draw_w: l.power_draw_w,
                feeder: l.feeder,
                on: self.on[idx],
            })
            .collect();
        let feeder_totals = self
            .feeder_power_w
            .iter()
            .map(|&(feeder, power_w)| FeederTotal { feeder, power_w })
            .collect();
        StateSnapshot {
            threshold_w: self.threshold_w,
            auto_mode: self.auto_mode,
            loads,
            total_power_w: self.total_power_w,
            feeder_totals,
            capacity_w: registry.capacity_w(),
            headroom_w: self.headroom_w(registry),
            status: classify_power(f64::from(self.total_power_w), self.threshold_w),
        }
    }
}

/// One load's commanded state within a snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct LoadState {
    /// Load id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Fixed draw when on (W).
    pub power_draw_w: u32,
    /// Feeder group.
    pub feeder: u8,
    /// Commanded state.
    pub on: bool,
}

/// Cached total for one feeder group.
#[derive(Debug, Clone, Serialize)]
pub struct FeederTotal {
    /// Feeder id.
    pub feeder: u8,
    /// Sum of draws over the feeder's currently-on loads (W).
    pub power_w: u32,
}

/// Read-only copy of the full panel state.
#[derive(Debug, Clone, Serialize)]
pub struct StateSnapshot {
    /// Configured shedding threshold (W).
    pub threshold_w: u32,
    /// Whether automatic shedding is enabled.
    pub auto_mode: bool,
    /// Per-load commanded states in catalog order.
    pub loads: Vec<LoadState>,
    /// Sum of draws over currently-on loads (W).
    pub total_power_w: u32,
    /// Per-feeder totals (W).
    pub feeder_totals: Vec<FeederTotal>,
    /// Total connected capacity (W).
    pub capacity_w: u32,
    /// Capacity minus commanded total (W).
    pub headroom_w: u32,
    /// Classification of the commanded total against the threshold.
    pub status: PowerStatus,
}

impl StateSnapshot {
    /// Commanded state of a load by id, if catalogued.
    pub fn is_on(&self, id: &str) -> Option<bool> {
        self.loads.iter().find(|l| l.id == id).map(|l| l.on)
    }
}
