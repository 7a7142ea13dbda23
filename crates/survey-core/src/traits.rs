//! Core abstraction traits for read-only campaign collaborators.

use std::fmt;

use crate::location::Location;

/// Key into a ground-truth table: a location at a campaign time.
///
/// Time-invariant tables (one value per location) key every entry at
/// time zero; see [`MeasurementKey::untimed`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeasurementKey {
    /// Where the value was observed.
    pub location: Location,
    /// When it was observed, in campaign seconds.
    pub time: i64,
}

impl MeasurementKey {
    /// Key for `location` at `time`.
    pub fn new(location: Location, time: i64) -> Self {
        Self { location, time }
    }

    /// Key for a time-invariant value at `location`.
    pub fn untimed(location: Location) -> Self {
        Self { location, time: 0 }
    }
}

impl fmt::Display for MeasurementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at t={}", self.location, self.time)
    }
}

/// Read-only access to reference values for completed tasks.
///
/// Resolves "what value was actually measured" once a worker reports a
/// completed task. Implemented by the file-backed ground-truth table and
/// by test mocks. Returns `None` when the table has no entry for `key`;
/// whether that is fatal is up to the calling policy.
pub trait GroundTruthSource: Send + Sync {
    /// Look up the reference value observed at `key`.
    fn lookup(&self, key: &MeasurementKey) -> Option<f64>;
}
