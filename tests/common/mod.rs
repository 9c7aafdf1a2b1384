//! Shared test fixtures for integration tests.

use loadshed_sim::loads::LoadRegistry;
use loadshed_sim::panel::PanelEngine;

/// Engine with the demo catalog, 120 W threshold, auto mode on — the
/// panel's startup configuration (three loads on, water heater off).
pub fn default_engine() -> PanelEngine {
    PanelEngine::new(LoadRegistry::demo_panel(), 120, true)
}

/// Engine with every load on, auto mode on, threshold 150 (monitor band,
/// so forcing the water heater on does not trigger a shed).
pub fn all_on_engine() -> PanelEngine {
    let mut engine = PanelEngine::new(LoadRegistry::demo_panel(), 150, true);
    engine
        .set_load("water_heater", true)
        .expect("water heater is catalogued");
    engine
}

/// Engine with the demo catalog and auto mode off, for manual-control tests.
pub fn manual_engine() -> PanelEngine {
    PanelEngine::new(LoadRegistry::demo_panel(), 120, false)
}

/// Sum of draws over loads reported on by the snapshot — the ground truth
/// the cached total must match.
pub fn summed_power_w(engine: &PanelEngine) -> u32 {
    engine
        .snapshot()
        .loads
        .iter()
        .filter(|l| l.on)
        .map(|l| l.power_draw_w)
        .sum()
}
