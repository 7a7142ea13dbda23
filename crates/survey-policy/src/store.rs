//! Per-location, append-only measurement histories.

use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;
use survey_core::Location;

use crate::stats::RunningStats;

/// One observed value at a location and time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    /// Where the value was observed.
    pub location: Location,
    /// Observation time in campaign seconds.
    pub time: i64,
    /// Observed value.
    pub value: f64,
}

#[derive(Clone, Debug, Default)]
struct History {
    samples: SmallVec<[Measurement; 4]>,
    stats: RunningStats,
}

/// Measurement histories keyed by location.
///
/// Histories are append-only: samples are stored in arrival order and
/// never mutated or dropped. Locations iterate in the order they were
/// first tracked, which callers rely on for deterministic tie-breaking.
#[derive(Clone, Debug, Default)]
pub struct MeasurementStore {
    histories: IndexMap<Location, History>,
}

impl MeasurementStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store tracking `locations` with empty histories, in the given order.
    pub fn tracking(locations: impl IntoIterator<Item = Location>) -> Self {
        let mut store = Self::new();
        for loc in locations {
            store.track(loc);
        }
        store
    }

    /// Start tracking `location`. No-op if already tracked.
    pub fn track(&mut self, location: Location) {
        self.histories.entry(location).or_default();
    }

    /// Append a sample. Tracks `location` if it was not already.
    pub fn record(&mut self, location: Location, time: i64, value: f64) {
        let history = self.histories.entry(location).or_default();
        history.samples.push(Measurement {
            location,
            time,
            value,
        });
        history.stats.push(value);
    }

    /// Number of samples recorded at `location` (zero if untracked).
    pub fn count(&self, location: &Location) -> usize {
        self.histories
            .get(location)
            .map_or(0, |h| h.samples.len())
    }

    /// Samples at `location` in arrival order.
    pub fn history(&self, location: &Location) -> &[Measurement] {
        self.histories
            .get(location)
            .map(|h| h.samples.as_slice())
            .unwrap_or(&[])
    }

    /// Time of the most recent sample at `location`.
    pub fn last_time(&self, location: &Location) -> Option<i64> {
        self.histories
            .get(location)
            .and_then(|h| h.samples.last())
            .map(|m| m.time)
    }

    /// Whether `location` is tracked.
    pub fn is_tracked(&self, location: &Location) -> bool {
        self.histories.contains_key(location)
    }

    /// Number of tracked locations.
    pub fn len(&self) -> usize {
        self.histories.len()
    }

    /// Whether no location is tracked.
    pub fn is_empty(&self) -> bool {
        self.histories.is_empty()
    }

    /// Tracked locations in tracking order.
    pub fn locations(&self) -> impl Iterator<Item = &Location> + '_ {
        self.histories.keys()
    }

    /// Total number of samples across all locations.
    pub fn total_measurements(&self) -> usize {
        self.histories.values().map(|h| h.samples.len()).sum()
    }

    /// Whether every tracked location has at least `n` samples.
    ///
    /// Vacuously true for an empty store.
    pub fn all_have_at_least(&self, n: usize) -> bool {
        self.histories.values().all(|h| h.samples.len() >= n)
    }

    /// Sample standard deviation of each tracked location's full history.
    ///
    /// Returned in tracking order. `None` marks a location with fewer than
    /// two samples, whose dispersion is undefined.
    pub fn dispersion_by_location(&self) -> Vec<(Location, Option<f64>)> {
        self.histories
            .iter()
            .map(|(loc, h)| (*loc, h.stats.sample_std_dev()))
            .collect()
    }

    /// Locations whose most recent sample is at least `validity_secs` old.
    ///
    /// A tracked location with no samples at all is stale.
    pub fn stale_locations(&self, now: i64, validity_secs: i64) -> IndexSet<Location> {
        self.histories
            .iter()
            .filter(|(_, h)| match h.samples.last() {
                Some(last) => now - last.time >= validity_secs,
                None => true,
            })
            .map(|(loc, _)| *loc)
            .collect()
    }
}
