//! Pure selection helpers shared by the rebuild-style policies.
//!
//! Policies pick a set of target locations, then translate it back into
//! task identities from the catalog. Both steps are free functions so a
//! rebuilt [`InterestMap`] depends only on its inputs.

use indexmap::IndexSet;
use survey_core::{InterestMap, Location, TaskData};

use crate::store::MeasurementStore;

/// Build a fresh interest map holding every catalog task whose location
/// is in `targets`.
///
/// Catalog order is preserved. Tasks sharing an identity collapse to the
/// last one seen.
pub fn rebuild_interest_map<'a>(
    catalog: impl IntoIterator<Item = &'a TaskData>,
    targets: &IndexSet<Location>,
) -> InterestMap {
    catalog
        .into_iter()
        .filter(|t| targets.contains(&t.location))
        .map(|t| (t.task(), t.clone()))
        .collect()
}

/// Tracked locations with fewer than `n` samples, in tracking order.
pub fn undersampled(store: &MeasurementStore, n: usize) -> IndexSet<Location> {
    store
        .locations()
        .filter(|loc| store.count(loc) < n)
        .copied()
        .collect()
}

/// The `k` locations with the highest dispersion, highest first.
///
/// Undefined dispersion (fewer than two samples) ranks as maximally
/// uncertain. Ties keep the input order, so passing
/// [`MeasurementStore::dispersion_by_location`] breaks ties by tracking
/// order. Returns `min(k, dispersion.len())` locations.
pub fn rank_by_dispersion(
    mut dispersion: Vec<(Location, Option<f64>)>,
    k: usize,
) -> IndexSet<Location> {
    let key = |d: &Option<f64>| d.unwrap_or(f64::INFINITY);
    dispersion.sort_by(|a, b| key(&b.1).total_cmp(&key(&a.1)));
    dispersion.into_iter().take(k).map(|(loc, _)| loc).collect()
}
