//! Load-shedding policy engine and its supporting types.

/// Bounded alert history and severity levels.
pub mod alert;
pub mod engine;
/// Ordered threshold-band table driving the shedding policy.
pub mod policy;
pub mod state;
/// Presentational status classification for readings.
pub mod status;

pub use alert::{AlertLog, AlertRecord, Severity};
pub use engine::PanelEngine;
pub use policy::{PolicyBand, PolicyTable};
pub use state::{StateSnapshot, SystemState};
pub use status::{PowerStatus, classify_power};

/// Upper bound accepted for the configurable power threshold (W).
pub const MAX_THRESHOLD_W: u32 = 100_000;
