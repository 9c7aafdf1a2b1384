//! Error types for panel control operations.

use std::error::Error;
use std::fmt;

use crate::panel::MAX_THRESHOLD_W;

/// Error returned by panel control operations.
///
/// Every variant is reported synchronously to the caller of the offending
/// operation; no operation leaves the system state partially updated.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelError {
    /// A load id was not found in the registry.
    UnknownLoad(String),
    /// A feeder id does not match any catalogued load.
    UnknownFeeder(u8),
    /// A threshold value was negative or above [`MAX_THRESHOLD_W`].
    InvalidThreshold(i64),
    /// A power reading was negative or non-finite.
    InvalidReading(f64),
}

impl fmt::Display for PanelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownLoad(id) => write!(f, "unknown load id \"{id}\""),
            Self::UnknownFeeder(feeder) => write!(f, "unknown feeder {feeder}"),
            Self::InvalidThreshold(watts) => write!(
                f,
                "threshold {watts} W out of range (expected 0..={MAX_THRESHOLD_W})"
            ),
            Self::InvalidReading(power_w) => {
                write!(f, "power reading {power_w} is not a valid wattage")
            }
        }
    }
}

impl Error for PanelError {}
