//! Threshold-relative status classification for display surfaces.
//!
//! Classification annotates a reading for presentation; it never mutates
//! load state and never drives shedding.

use std::fmt;

use serde::Serialize;

/// Power reading classification relative to the configured threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerStatus {
    /// At or below 80% of the threshold.
    Normal,
    /// Above 80% of the threshold but not above it.
    Warning,
    /// Above the threshold.
    Critical,
}

impl fmt::Display for PowerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Normal => "normal",
            Self::Warning => "warning",
            Self::Critical => "critical",
        };
        write!(f, "{s}")
    }
}

/// Classifies a power figure against a threshold.
///
/// Fixed ratio rule: `power > threshold` is critical, `power > 0.8 ×
/// threshold` is warning, anything else is normal.
pub fn classify_power(power_w: f64, threshold_w: u32) -> PowerStatus {
    let threshold = f64::from(threshold_w);
    if power_w > threshold {
        PowerStatus::Critical
    } else if power_w > 0.8 * threshold {
        PowerStatus::Warning
    } else {
        PowerStatus::Normal
    }
}

/// Voltage reading classification against the nominal service window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoltageStatus {
    /// Within the 220–240 V window.
    Normal,
    /// Outside the window in either direction.
    Abnormal,
}

impl fmt::Display for VoltageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Normal => "normal",
            Self::Abnormal => "abnormal",
        };
        write!(f, "{s}")
    }
}

/// Classifies a voltage reading; anything outside [220, 240] V is abnormal.
pub fn classify_voltage(voltage_v: f64) -> VoltageStatus {
    if (220.0..=240.0).contains(&voltage_v) {
        VoltageStatus::Normal
    } else {
        VoltageStatus::Abnormal
    }
}

/// Power factor classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerFactorStatus {
    /// Below 0.85.
    Poor,
    /// At least 0.85 but below 0.95.
    Acceptable,
    /// 0.95 or better.
    Good,
}

impl fmt::Display for PowerFactorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Poor => "poor",
            Self::Acceptable => "acceptable",
            Self::Good => "good",
        };
        write!(f, "{s}")
    }
}

/// Classifies a power factor reading.
pub fn classify_power_factor(power_factor: f64) -> PowerFactorStatus {
    if power_factor < 0.85 {
        PowerFactorStatus::Poor
    } else if power_factor < 0.95 {
        PowerFactorStatus::Acceptable
    } else {
        PowerFactorStatus::Good
    }
}
