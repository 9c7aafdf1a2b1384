//! TOML-based panel configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::loads::{Load, LoadRegistry, PRIMARY_FEEDER, SECONDARY_FEEDER};
use crate::panel::MAX_THRESHOLD_W;

/// Top-level panel configuration parsed from TOML.
///
/// All fields have defaults matching the demo panel. Load from TOML with
/// [`PanelConfig::from_toml_file`] or use [`PanelConfig::demo`] for the
/// built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PanelConfig {
    /// Threshold, mode, and history capacities.
    #[serde(default)]
    pub panel: PanelSettings,
    /// Simulated meter parameters.
    #[serde(default)]
    pub meter: MeterSettings,
    /// Demo run parameters.
    #[serde(default)]
    pub demo: DemoSettings,
    /// Load catalog; defaults to the built-in demo panel.
    #[serde(default = "default_loads")]
    pub loads: Vec<LoadConfig>,
}

/// Threshold, mode, and history capacities.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PanelSettings {
    /// Starting shedding threshold (W).
    pub threshold_w: u32,
    /// Whether automatic shedding starts enabled.
    pub auto_mode: bool,
    /// Retained alert count.
    pub alert_capacity: usize,
    /// Retained chart points.
    pub chart_capacity: usize,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            threshold_w: 120,
            auto_mode: true,
            alert_capacity: 64,
            chart_capacity: 12,
        }
    }
}

/// Simulated meter parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MeterSettings {
    /// Nominal line voltage (V).
    pub nominal_voltage_v: f64,
    /// Uniform voltage jitter span (V).
    pub voltage_jitter_v: f64,
    /// Uniform power jitter span around the commanded total (W).
    pub power_jitter_w: f64,
    /// Nominal power factor (0.0–1.0).
    pub nominal_power_factor: f64,
    /// Uniform power factor jitter span.
    pub power_factor_jitter: f64,
    /// Meter random seed.
    pub seed: u64,
}

impl Default for MeterSettings {
    fn default() -> Self {
        Self {
            nominal_voltage_v: 230.0,
            voltage_jitter_v: 1.0,
            power_jitter_w: 8.0,
            nominal_power_factor: 0.92,
            power_factor_jitter: 0.03,
            seed: 42,
        }
    }
}

/// Demo run parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemoSettings {
    /// Number of telemetry ticks to run.
    pub ticks: usize,
    /// Whether the scripted threshold dip is applied.
    pub dip_enabled: bool,
    /// Dip start tick (inclusive).
    pub dip_start: usize,
    /// Dip end tick (exclusive).
    pub dip_end: usize,
    /// Threshold applied while the dip is active (W).
    pub dip_threshold_w: u32,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            ticks: 24,
            dip_enabled: true,
            dip_start: 8,
            dip_end: 16,
            dip_threshold_w: 90,
        }
    }
}

/// One catalog entry as configured.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoadConfig {
    /// Unique load id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Fixed draw when on (W, > 0).
    pub power_draw_w: u32,
    /// Feeder group (1 or 2).
    pub feeder: u8,
    /// Shedding order rank; higher ranks shed first. Unique per catalog.
    pub shed_rank: u8,
    /// Commanded state the panel starts with.
    #[serde(default = "default_true")]
    pub default_on: bool,
}

fn default_true() -> bool {
    true
}

fn default_loads() -> Vec<LoadConfig> {
    LoadRegistry::demo_panel()
        .loads()
        .iter()
        .map(|l| LoadConfig {
            id: l.id.clone(),
            name: l.name.clone(),
            power_draw_w: l.power_draw_w,
            feeder: l.feeder,
            shed_rank: l.shed_rank,
            default_on: l.default_on,
        })
        .collect()
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"panel.threshold_w"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} — {}", self.field, self.message)
    }
}

impl PanelConfig {
    /// Returns the demo panel configuration (built-in defaults).
    pub fn demo() -> Self {
        Self {
            panel: PanelSettings::default(),
            meter: MeterSettings::default(),
            demo: DemoSettings::default(),
            loads: default_loads(),
        }
    }

    /// Returns the brownout preset: a long run with an emergency-depth
    /// threshold dip in the middle.
    pub fn brownout() -> Self {
        Self {
            demo: DemoSettings {
                ticks: 30,
                dip_start: 6,
                dip_end: 18,
                dip_threshold_w: 40,
                ..DemoSettings::default()
            },
            ..Self::demo()
        }
    }

    /// Returns the manual preset: automatic shedding disabled, dip still
    /// scripted so only informational threshold alerts appear.
    pub fn manual() -> Self {
        Self {
            panel: PanelSettings {
                auto_mode: false,
                ..PanelSettings::default()
            },
            ..Self::demo()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["demo", "brownout", "manual"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "demo" => Ok(Self::demo()),
            "brownout" => Ok(Self::brownout()),
            "manual" => Ok(Self::manual()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is
    /// invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown
    /// fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let p = &self.panel;

        if p.threshold_w > MAX_THRESHOLD_W {
            errors.push(ConfigError {
                field: "panel.threshold_w".into(),
                message: format!("must be <= {MAX_THRESHOLD_W}"),
            });
        }
        if p.alert_capacity == 0 {
            errors.push(ConfigError {
                field: "panel.alert_capacity".into(),
                message: "must be > 0".into(),
            });
        }
        if p.chart_capacity == 0 {
            errors.push(ConfigError {
                field: "panel.chart_capacity".into(),
                message: "must be > 0".into(),
            });
        }

        let m = &self.meter;
        if m.nominal_voltage_v <= 0.0 {
            errors.push(ConfigError {
                field: "meter.nominal_voltage_v".into(),
                message: "must be > 0".into(),
            });
        }
        if m.voltage_jitter_v < 0.0 || m.power_jitter_w < 0.0 || m.power_factor_jitter < 0.0 {
            errors.push(ConfigError {
                field: "meter".into(),
                message: "jitter spans must be >= 0".into(),
            });
        }
        if !(0.0..=1.0).contains(&m.nominal_power_factor) {
            errors.push(ConfigError {
                field: "meter.nominal_power_factor".into(),
                message: "must be in [0.0, 1.0]".into(),
            });
        }

        let d = &self.demo;
        if d.ticks == 0 {
            errors.push(ConfigError {
                field: "demo.ticks".into(),
                message: "must be > 0".into(),
            });
        }
        if d.dip_enabled {
            if d.dip_start >= d.dip_end {
                errors.push(ConfigError {
                    field: "demo.dip_start".into(),
                    message: "must be < demo.dip_end".into(),
                });
            }
            if d.dip_threshold_w > MAX_THRESHOLD_W {
                errors.push(ConfigError {
                    field: "demo.dip_threshold_w".into(),
                    message: format!("must be <= {MAX_THRESHOLD_W}"),
                });
            }
        }

        if self.loads.is_empty() {
            errors.push(ConfigError {
                field: "loads".into(),
                message: "at least one load is required".into(),
            });
        }
        for (i, load) in self.loads.iter().enumerate() {
            if load.power_draw_w == 0 {
                errors.push(ConfigError {
                    field: format!("loads[{i}].power_draw_w"),
                    message: "must be > 0".into(),
                });
            }
            if load.feeder != PRIMARY_FEEDER && load.feeder != SECONDARY_FEEDER {
                errors.push(ConfigError {
                    field: format!("loads[{i}].feeder"),
                    message: format!("must be {PRIMARY_FEEDER} or {SECONDARY_FEEDER}"),
                });
            }
            for (j, other) in self.loads.iter().enumerate().skip(i + 1) {
                if load.id == other.id {
                    errors.push(ConfigError {
                        field: format!("loads[{j}].id"),
                        message: format!("duplicate id \"{}\"", other.id),
                    });
                }
                if load.shed_rank == other.shed_rank {
                    errors.push(ConfigError {
                        field: format!("loads[{j}].shed_rank"),
                        message: format!("duplicate shed_rank {}", other.shed_rank),
                    });
                }
            }
        }

        errors
    }

    /// Builds the load registry from the configured catalog.
    ///
    /// Expects a configuration that passed [`PanelConfig::validate`].
    pub fn build_registry(&self) -> LoadRegistry {
        LoadRegistry::new(
            self.loads
                .iter()
                .map(|l| Load {
                    id: l.id.clone(),
                    name: l.name.clone(),
                    power_draw_w: l.power_draw_w,
                    feeder: l.feeder,
                    shed_rank: l.shed_rank,
                    default_on: l.default_on,
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_preset_valid() {
        let cfg = PanelConfig::demo();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "demo should be valid: {errors:?}");
    }

    #[test]
    fn all_presets_are_valid() {
        for name in PanelConfig::PRESETS {
            let cfg = PanelConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn from_preset_unknown() {
        let err = PanelConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[panel]
threshold_w = 150
auto_mode = false
alert_capacity = 16
chart_capacity = 24

[meter]
nominal_voltage_v = 240.0
voltage_jitter_v = 2.0
power_jitter_w = 4.0
nominal_power_factor = 0.95
power_factor_jitter = 0.02
seed = 99

[demo]
ticks = 48
dip_enabled = true
dip_start = 10
dip_end = 20
dip_threshold_w = 60

[[loads]]
id = "pump"
name = "Pump"
power_draw_w = 80
feeder = 1
shed_rank = 0

[[loads]]
id = "fan"
name = "Fan"
power_draw_w = 30
feeder = 2
shed_rank = 1
default_on = false
"#;
        let cfg = PanelConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.panel.threshold_w), Some(150));
        assert_eq!(cfg.as_ref().map(|c| c.loads.len()), Some(2));
        assert_eq!(
            cfg.as_ref().map(|c| c.loads[1].default_on),
            Some(false)
        );
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[meter]
seed = 7
"#;
        let cfg = PanelConfig::from_toml_str(toml);
        assert!(cfg.is_ok());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.meter.seed), Some(7));
        assert_eq!(cfg.as_ref().map(|c| c.panel.threshold_w), Some(120));
        assert_eq!(cfg.as_ref().map(|c| c.loads.len()), Some(4));
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[panel]
threshold_w = 120
bogus_field = true
"#;
        let result = PanelConfig::from_toml_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn validation_catches_zero_ticks() {
        let mut cfg = PanelConfig::demo();
        cfg.demo.ticks = 0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "demo.ticks"));
    }

    #[test]
    fn validation_catches_inverted_dip_window() {
        let mut cfg = PanelConfig::demo();
        cfg.demo.dip_start = 20;
        cfg.demo.dip_end = 10;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "demo.dip_start"));

        // A disabled dip skips the window check.
        cfg.demo.dip_enabled = false;
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn validation_catches_duplicate_load_ids() {
        let mut cfg = PanelConfig::demo();
        cfg.loads[1].id = cfg.loads[0].id.clone();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field.ends_with(".id")));
    }

    #[test]
    fn validation_catches_bad_feeder() {
        let mut cfg = PanelConfig::demo();
        cfg.loads[0].feeder = 3;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "loads[0].feeder"));
    }

    #[test]
    fn validation_catches_bad_power_factor() {
        let mut cfg = PanelConfig::demo();
        cfg.meter.nominal_power_factor = 1.5;
        let errors = cfg.validate();
        assert!(
            errors
                .iter()
                .any(|e| e.field == "meter.nominal_power_factor")
        );
    }

    #[test]
    fn built_registry_matches_catalog() {
        let cfg = PanelConfig::demo();
        let registry = cfg.build_registry();
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.capacity_w(), 140);
    }

    #[test]
    fn manual_preset_disables_auto_mode() {
        let cfg = PanelConfig::manual();
        assert!(!cfg.panel.auto_mode);
    }

    #[test]
    fn brownout_preset_dips_to_emergency_depth() {
        let cfg = PanelConfig::brownout();
        assert!(cfg.demo.dip_threshold_w < 50);
        assert!(cfg.demo.ticks > cfg.demo.dip_end);
    }
}
