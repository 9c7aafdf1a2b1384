//! Immutable catalog of controllable loads and their static attributes.

use crate::error::PanelError;

/// Feeder group carrying the high-priority loads.
pub const PRIMARY_FEEDER: u8 = 1;
/// Feeder group carrying the low-priority loads (shed first as a block).
pub const SECONDARY_FEEDER: u8 = 2;

/// A controllable load with a fixed power draw, defined once at startup.
///
/// `shed_rank` orders loads for shedding: the higher the rank, the earlier
/// the load is sacrificed when total power must come down. Ranks are unique
/// across a catalog.
#[derive(Debug, Clone)]
pub struct Load {
    /// Unique identifier, stable across the catalog's fixed ordering.
    pub id: String,
    /// Human-readable label for display surfaces.
    pub name: String,
    /// Fixed power consumption when commanded on (W, > 0).
    pub power_draw_w: u32,
    /// Feeder group used for bulk on/off control and per-feeder totals.
    pub feeder: u8,
    /// Shedding order rank; higher ranks are shed first.
    pub shed_rank: u8,
    /// Commanded state the panel starts with.
    pub default_on: bool,
}

/// Fixed-order catalog of loads.
///
/// The registry is configuration, not logic: it has no mutable state and no
/// side effects, but every other panel component depends on it.
///
/// # Examples
///
/// ```
/// use loadshed_sim::loads::LoadRegistry;
///
/// let registry = LoadRegistry::demo_panel();
/// assert_eq!(registry.capacity_w(), 140);
/// assert!(registry.get("hall_lighting").is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct LoadRegistry {
    loads: Vec<Load>,
}

impl LoadRegistry {
    /// Creates a registry from a fixed load catalog.
    ///
    /// # Panics
    ///
    /// Panics if the catalog is empty, contains a non-positive power draw,
    /// or repeats a load id or shed rank. Catalogs come from validated
    /// configuration, so any of these indicates a programming error.
    pub fn new(loads: Vec<Load>) -> Self {
        assert!(!loads.is_empty(), "load catalog must not be empty");
        for (i, load) in loads.iter().enumerate() {
            assert!(load.power_draw_w > 0, "load power draw must be > 0");
            for other in &loads[i + 1..] {
                assert!(load.id != other.id, "duplicate load id \"{}\"", load.id);
                assert!(
                    load.shed_rank != other.shed_rank,
                    "duplicate shed rank {}",
                    load.shed_rank
                );
            }
        }
        Self { loads }
    }

    /// Returns the built-in demo panel catalog: two 50 W loads on feeder 1,
    /// two 20 W loads on feeder 2, water heater off by default.
    pub fn demo_panel() -> Self {
        Self::new(vec![
            Load {
                id: "hall_lighting".to_string(),
                name: "Hall lighting".to_string(),
                power_draw_w: 50,
                feeder: PRIMARY_FEEDER,
                shed_rank: 0,
                default_on: true,
            },
            Load {
                id: "hvac_fan".to_string(),
                name: "HVAC fan".to_string(),
                power_draw_w: 50,
                feeder: PRIMARY_FEEDER,
                shed_rank: 1,
                default_on: true,
            },
            Load {
                id: "aux_outlets".to_string(),
                name: "Auxiliary outlets".to_string(),
                power_draw_w: 20,
                feeder: SECONDARY_FEEDER,
                shed_rank: 2,
                default_on: true,
            },
            Load {
                id: "water_heater".to_string(),
                name: "Water heater".to_string(),
                power_draw_w: 20,
                feeder: SECONDARY_FEEDER,
                shed_rank: 3,
                default_on: false,
            },
        ])
    }

    /// Returns the catalog in its fixed, stable order.
    pub fn loads(&self) -> &[Load] {
        &self.loads
    }

    /// Number of catalogued loads.
    pub fn len(&self) -> usize {
        self.loads.len()
    }

    /// Returns `true` when the catalog is empty (never, by construction).
    pub fn is_empty(&self) -> bool {
        self.loads.is_empty()
    }

    /// Looks up a load by id.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::UnknownLoad`] if `id` is not catalogued.
    pub fn get(&self, id: &str) -> Result<&Load, PanelError> {
        self.loads
            .iter()
            .find(|l| l.id == id)
            .ok_or_else(|| PanelError::UnknownLoad(id.to_string()))
    }

    /// Returns the catalog index of a load id, if present.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.loads.iter().position(|l| l.id == id)
    }

    /// Total connected capacity: the sum of every load's power draw.
    pub fn capacity_w(&self) -> u32 {
        self.loads.iter().map(|l| l.power_draw_w).sum()
    }

    /// Returns the distinct feeder ids present in the catalog, ascending.
    pub fn feeders(&self) -> Vec<u8> {
        let mut feeders: Vec<u8> = self.loads.iter().map(|l| l.feeder).collect();
        feeders.sort_unstable();
        feeders.dedup();
        feeders
    }

    /// Returns `true` when at least one load belongs to `feeder`.
    pub fn has_feeder(&self, feeder: u8) -> bool {
        self.loads.iter().any(|l| l.feeder == feeder)
    }

    /// Catalog indices of every load in `feeder`, in catalog order.
    pub fn feeder_indices(&self, feeder: u8) -> Vec<usize> {
        self.loads
            .iter()
            .enumerate()
            .filter(|(_, l)| l.feeder == feeder)
            .map(|(i, _)| i)
            .collect()
    }

    /// The load within `feeder` that stays off on a feeder restore: the
    /// feeder's highest-`shed_rank` member. Returns `None` for an unknown
    /// feeder.
    pub fn restore_stays_off(&self, feeder: u8) -> Option<usize> {
        self.loads
            .iter()
            .enumerate()
            .filter(|(_, l)| l.feeder == feeder)
            .max_by_key(|(_, l)| l.shed_rank)
            .map(|(i, _)| i)
    }

    /// Catalog index of the globally lowest-priority load (highest rank);
    /// the first to be shed and the one left off by a global restore.
    pub fn lowest_priority(&self) -> usize {
        self.loads
            .iter()
            .enumerate()
            .max_by_key(|(_, l)| l.shed_rank)
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    /// Catalog index of the globally highest-priority load (lowest rank);
    /// the only load an emergency shed keeps running.
    pub fn highest_priority(&self) -> usize {
        self.loads
            .iter()
            .enumerate()
            .min_by_key(|(_, l)| l.shed_rank)
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}
