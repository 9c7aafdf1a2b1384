//! Alert records and the bounded alert history.

use std::collections::VecDeque;
use std::fmt;

use serde::Serialize;

/// Severity attached to an alert, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Routine state change (threshold moved, mode toggled).
    Info,
    /// A single low-priority load was dropped.
    Warning,
    /// A whole feeder branch was dropped.
    Alert,
    /// Deep shedding across both feeders.
    Critical,
    /// Everything but the protected load was dropped.
    Emergency,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Alert => "alert",
            Self::Critical => "critical",
            Self::Emergency => "emergency",
        };
        write!(f, "{s}")
    }
}

/// Immutable record of one panel event.
///
/// Alerts are a log, not control state; they never feed back into policy
/// decisions. `seq` is the panel's event clock: a monotonic emission ordinal
/// (the simulation has no wall clock).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertRecord {
    /// Monotonic emission ordinal, unique per log.
    pub seq: u64,
    /// Alert severity.
    pub severity: Severity,
    /// Human-readable description of what happened.
    pub message: String,
}

/// Bounded alert history with most-recent-first access.
///
/// Insertion and eviction are both O(1): a capped deque drops the oldest
/// entry when full.
#[derive(Debug)]
pub struct AlertLog {
    entries: VecDeque<AlertRecord>,
    capacity: usize,
    next_seq: u64,
}

impl AlertLog {
    /// Creates a log retaining at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            next_seq: 0,
        }
    }

    /// Appends a record, evicting the oldest entry when at capacity.
    ///
    /// Returns a clone of the stored record for observer dispatch.
    pub fn push(&mut self, severity: Severity, message: String) -> AlertRecord {
        let record = AlertRecord {
            seq: self.next_seq,
            severity,
            message,
        };
        self.next_seq += 1;
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(record.clone());
        record
    }

    /// Iterates retained records, most recent first.
    pub fn recent(&self) -> impl Iterator<Item = &AlertRecord> {
        self.entries.iter().rev()
    }

    /// Iterates retained records in emission order (oldest first).
    pub fn in_emission_order(&self) -> impl Iterator<Item = &AlertRecord> {
        self.entries.iter()
    }

    /// Number of retained records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing has been retained.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of retained records.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total number of records ever emitted, including evicted ones.
    pub fn emitted(&self) -> u64 {
        self.next_seq
    }
}
