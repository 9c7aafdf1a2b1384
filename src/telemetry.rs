//! Simulated metering: reading generation and the bounded chart history.
//!
//! Reading generation sits behind [`ReadingSource`] so the policy engine and
//! the demo driver can be tested deterministically, with randomness kept out
//! of the control loop.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::Serialize;

use crate::panel::status::PowerStatus;

/// One instantaneous meter reading.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Reading {
    /// Line voltage (V).
    pub voltage_v: f64,
    /// Line current (A).
    pub current_a: f64,
    /// Instantaneous power (W).
    pub power_w: f64,
    /// Power factor (0.0–1.0).
    pub power_factor: f64,
}

/// Source of instantaneous readings for the panel's display surfaces.
///
/// `commanded_w` is the engine's current commanded total, which a simulated
/// meter tracks with jitter and a fixed source may ignore.
pub trait ReadingSource {
    /// Produces the next reading.
    fn reading(&mut self, commanded_w: u32) -> Reading;
}

/// Seeded meter producing readings that follow the commanded total with
/// uniform jitter.
///
/// Jitter spans match the dashboard the panel simulates: voltage ±1 V around
/// 230 V, power factor ±0.03 around 0.92, power ±8 W around the commanded
/// total. Current is derived as power over voltage.
///
/// # Examples
///
/// ```
/// use loadshed_sim::telemetry::{ReadingSource, SimulatedMeter};
///
/// let mut meter = SimulatedMeter::with_defaults(42);
/// let r = meter.reading(120);
/// assert!((r.power_w - 120.0).abs() <= 8.0);
/// ```
#[derive(Debug, Clone)]
pub struct SimulatedMeter {
    nominal_voltage_v: f64,
    voltage_jitter_v: f64,
    power_jitter_w: f64,
    nominal_power_factor: f64,
    power_factor_jitter: f64,
    rng: StdRng,
}

impl SimulatedMeter {
    /// Creates a meter with explicit jitter parameters.
    ///
    /// # Panics
    ///
    /// Panics if `nominal_voltage_v` is not positive or any jitter span is
    /// negative.
    pub fn new(
        nominal_voltage_v: f64,
        voltage_jitter_v: f64,
        power_jitter_w: f64,
        nominal_power_factor: f64,
        power_factor_jitter: f64,
        seed: u64,
    ) -> Self {
        assert!(nominal_voltage_v > 0.0);
        assert!(voltage_jitter_v >= 0.0);
        assert!(power_jitter_w >= 0.0);
        assert!(power_factor_jitter >= 0.0);

        Self {
            nominal_voltage_v,
            voltage_jitter_v,
            power_jitter_w,
            nominal_power_factor,
            power_factor_jitter,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Creates a meter with the standard 230 V / 0.92 pf parameters.
    pub fn with_defaults(seed: u64) -> Self {
        Self::new(230.0, 1.0, 8.0, 0.92, 0.03, seed)
    }

    /// Uniform jitter in `[-span, span)`.
    fn jitter(&mut self, span: f64) -> f64 {
        if span <= 0.0 {
            return 0.0;
        }
        (self.rng.random::<f64>() * 2.0 - 1.0) * span
    }
}

impl ReadingSource for SimulatedMeter {
    fn reading(&mut self, commanded_w: u32) -> Reading {
        let voltage_v = self.nominal_voltage_v + self.jitter(self.voltage_jitter_v);
        let power_w = (f64::from(commanded_w) + self.jitter(self.power_jitter_w)).max(0.0);
        let current_a = if voltage_v > 0.0 {
            power_w / voltage_v
        } else {
            0.0
        };
        let power_factor = (self.nominal_power_factor + self.jitter(self.power_factor_jitter))
            .clamp(0.0, 1.0);
        Reading {
            voltage_v,
            current_a,
            power_w,
            power_factor,
        }
    }
}

/// One retained chart point.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct HistoryPoint {
    /// Monotonic reading ordinal.
    pub seq: u64,
    /// Recorded power (W).
    pub power_w: f64,
    /// Classification at the time of recording.
    pub status: PowerStatus,
}

/// Bounded ring of recorded readings, oldest evicted first.
#[derive(Debug)]
pub struct ReadingHistory {
    points: VecDeque<HistoryPoint>,
    capacity: usize,
    next_seq: u64,
}

impl ReadingHistory {
    /// Creates a history retaining at most `capacity` points (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
            next_seq: 0,
        }
    }

    /// Records a point, evicting the oldest when at capacity.
    pub fn push(&mut self, power_w: f64, status: PowerStatus) -> HistoryPoint {
        let point = HistoryPoint {
            seq: self.next_seq,
            power_w,
            status,
        };
        self.next_seq += 1;
        if self.points.len() >= self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
        point
    }

    /// Iterates retained points, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryPoint> {
        self.points.iter()
    }

    /// Most recently recorded point, if any.
    pub fn latest(&self) -> Option<&HistoryPoint> {
        self.points.back()
    }

    /// Number of retained points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` when no point has been recorded.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Maximum number of retained points.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
