//! API response and query types.
//!
//! Field names follow the CSV schema v1 conventions for consistency across
//! export formats.

use serde::{Deserialize, Serialize};

use crate::panel::state::StateSnapshot;
use crate::panel::status::{PowerFactorStatus, PowerStatus, VoltageStatus};
use crate::runner::TelemetryRow;

/// Combined state response: final snapshot and latest telemetry record.
#[derive(Debug, Serialize)]
pub struct StateResponse {
    /// Panel state after the final tick.
    pub snapshot: StateSnapshot,
    /// Most recent telemetry record, if any tick ran.
    pub latest_tick: Option<TelemetryRecord>,
}

/// Single telemetry record using CSV schema v1 field names.
#[derive(Debug, Serialize)]
pub struct TelemetryRecord {
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

impl From<&TelemetryRow> for TelemetryRecord {
    fn from(r: &TelemetryRow) -> Self {
        Self {
            tick: r.tick,
            voltage_v: r.voltage_v,
            current_a: r.current_a,
            power_w: r.power_w,
            power_factor: r.power_factor,
            power_status: r.power_status,
            voltage_status: r.voltage_status,
            power_factor_status: r.power_factor_status,
            threshold_w: r.threshold_w,
            commanded_w: r.commanded_w,
            headroom_w: r.headroom_w,
            auto_mode: r.auto_mode,
        }
    }
}

/// Optional range query parameters for the telemetry endpoint.
#[derive(Debug, Deserialize)]
pub struct TelemetryQuery {
    /// Start tick (inclusive).
    pub from: Option<usize>,
    /// End tick (inclusive).
    pub to: Option<usize>,
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_row() -> TelemetryRow {
        TelemetryRow {
            tick: 5,
            voltage_v: 229.4,
            current_a: 0.52,
            power_w: 118.9,
            power_factor: 0.91,
            power_status: PowerStatus::Warning,
            voltage_status: VoltageStatus::Normal,
            power_factor_status: PowerFactorStatus::Acceptable,
            threshold_w: 120,
            commanded_w: 120,
            headroom_w: 20,
            auto_mode: true,
        }
    }

    #[test]
    fn telemetry_record_from_row_maps_fields() {
        let row = make_row();
        let record = TelemetryRecord::from(&row);

        assert_eq!(record.tick, 5);
        assert_eq!(record.voltage_v, 229.4);
        assert_eq!(record.power_w, 118.9);
        assert_eq!(record.power_status, PowerStatus::Warning);
        assert_eq!(record.threshold_w, 120);
        assert_eq!(record.commanded_w, 120);
        assert_eq!(record.headroom_w, 20);
        assert!(record.auto_mode);
    }
}
