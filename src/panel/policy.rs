//! Ordered threshold-band table for the shedding policy.
//!
//! Each band maps a threshold range to the fixed subset of loads that must
//! be off while the threshold sits in that range. Bands are data: built once
//! from the registry, evaluated top-down, first match wins.

use crate::loads::{LoadRegistry, SECONDARY_FEEDER};
use crate::panel::alert::Severity;

/// One policy band: a threshold range and the loads it keeps off.
#[derive(Debug, Clone)]
pub struct PolicyBand {
    /// Short label used in alert messages.
    pub label: &'static str,
    /// Lower bound of the threshold range (inclusive).
    pub min_w: u32,
    /// Upper bound of the threshold range (exclusive); `None` means unbounded.
    pub max_w: Option<u32>,
    /// Severity of the alert emitted when this band sheds anything.
    pub severity: Severity,
    /// Ids of the loads that must be off while this band is selected.
    pub shed_ids: Vec<String>,
}

impl PolicyBand {
    /// Returns `true` when `threshold_w` falls inside this band's range.
    pub fn contains(&self, threshold_w: u32) -> bool {
        threshold_w >= self.min_w && self.max_w.is_none_or(|max| threshold_w < max)
    }
}

/// Ordered list of policy bands, evaluated top-down.
#[derive(Debug, Clone)]
pub struct PolicyTable {
    bands: Vec<PolicyBand>,
}

impl PolicyTable {
    /// Builds the standard five-band table from a load catalog.
    ///
    /// Target subsets are derived from the catalog's shed ranks and feeder
    /// groupings, so the same table shape adapts to any two-feeder catalog:
    ///
    /// - `>= 140 W`: monitor only, nothing shed.
    /// - `[120, 140) W`: shed the single lowest-priority load.
    /// - `[100, 120) W`: shed the whole secondary feeder.
    /// - `[50, 100) W`: shed the secondary feeder plus the primary feeder's
    ///   lowest-priority member.
    /// - `< 50 W`: emergency — shed everything except the highest-priority
    ///   load.
    pub fn standard(registry: &LoadRegistry) -> Self {
        let loads = registry.loads();
        let id = |idx: usize| loads[idx].id.clone();

        let lowest = registry.lowest_priority();
        let protected = registry.highest_priority();

        let secondary: Vec<String> = registry
            .feeder_indices(SECONDARY_FEEDER)
            .into_iter()
            .map(id)
            .collect();

        let mut deep = secondary.clone();
        // Primary-feeder sacrifice: its own lowest-priority member.
        let primary_feeder = loads[protected].feeder;
        if let Some(idx) = registry.restore_stays_off(primary_feeder) {
            let load_id = id(idx);
            if !deep.contains(&load_id) {
                deep.push(load_id);
            }
        }

        let everything_else: Vec<String> = loads
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != protected)
            .map(|(_, l)| l.id.clone())
            .collect();

        Self {
            bands: vec![
                PolicyBand {
                    label: "monitor",
                    min_w: 140,
                    max_w: None,
                    severity: Severity::Info,
                    shed_ids: Vec::new(),
                },
                PolicyBand {
                    label: "trim",
                    min_w: 120,
                    max_w: Some(140),
                    severity: Severity::Warning,
                    shed_ids: vec![id(lowest)],
                },
                PolicyBand {
                    label: "branch shed",
                    min_w: 100,
                    max_w: Some(120),
                    severity: Severity::Alert,
                    shed_ids: secondary,
                },
                PolicyBand {
                    label: "deep shed",
                    min_w: 50,
                    max_w: Some(100),
                    severity: Severity::Critical,
                    shed_ids: deep,
                },
                PolicyBand {
                    label: "emergency",
                    min_w: 0,
                    max_w: Some(50),
                    severity: Severity::Emergency,
                    shed_ids: everything_else,
                },
            ],
        }
    }

    /// Selects the band for a threshold: top-down, first match wins.
    pub fn band_for(&self, threshold_w: u32) -> Option<&PolicyBand> {
        self.bands.iter().find(|b| b.contains(threshold_w))
    }

    /// Returns the full ordered band list.
    pub fn bands(&self) -> &[PolicyBand] {
        &self.bands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loads::LoadRegistry;

    fn table() -> PolicyTable {
        PolicyTable::standard(&LoadRegistry::demo_panel())
    }

    #[test]
    fn ranges_cover_every_threshold() {
        let table = table();
        for t in [0, 49, 50, 99, 100, 119, 120, 139, 140, 500, 100_000] {
            assert!(table.band_for(t).is_some(), "no band for threshold {t}");
        }
    }

    #[test]
    fn boundaries_are_inclusive_lower_exclusive_upper() {
        let table = table();
        assert_eq!(table.band_for(140).map(|b| b.label), Some("monitor"));
        assert_eq!(table.band_for(139).map(|b| b.label), Some("trim"));
        assert_eq!(table.band_for(120).map(|b| b.label), Some("trim"));
        assert_eq!(table.band_for(119).map(|b| b.label), Some("branch shed"));
        assert_eq!(table.band_for(100).map(|b| b.label), Some("branch shed"));
        assert_eq!(table.band_for(99).map(|b| b.label), Some("deep shed"));
        assert_eq!(table.band_for(50).map(|b| b.label), Some("deep shed"));
        assert_eq!(table.band_for(49).map(|b| b.label), Some("emergency"));
        assert_eq!(table.band_for(0).map(|b| b.label), Some("emergency"));
    }

    #[test]
    fn severities_escalate_down_the_table() {
        let table = table();
        let severities: Vec<Severity> = table.bands().iter().map(|b| b.severity).collect();
        for pair in severities.windows(2) {
            assert!(pair[0] < pair[1], "severity must escalate: {pair:?}");
        }
    }

    #[test]
    fn target_subsets_match_the_demo_catalog() {
        let table = table();
        let shed_at = |t: u32| -> Vec<String> {
            table
                .band_for(t)
                .map(|b| b.shed_ids.clone())
                .unwrap_or_default()
        };

        assert!(shed_at(150).is_empty());
        assert_eq!(shed_at(125), vec!["water_heater"]);
        assert_eq!(shed_at(110), vec!["aux_outlets", "water_heater"]);
        assert_eq!(shed_at(75), vec!["aux_outlets", "water_heater", "hvac_fan"]);
        // Emergency keeps only the protected load.
        let emergency = shed_at(10);
        assert_eq!(emergency.len(), 3);
        assert!(!emergency.contains(&"hall_lighting".to_string()));
    }

    #[test]
    fn target_subsets_grow_monotonically() {
        let table = table();
        // Walking the table downward never removes a target.
        let bands = table.bands();
        for pair in bands.windows(2) {
            for id in &pair[0].shed_ids {
                assert!(
                    pair[1].shed_ids.contains(id),
                    "{} missing from the next band down",
                    id
                );
            }
        }
    }
}
