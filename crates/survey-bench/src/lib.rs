//! Benchmark profiles for the survey policy framework.
//!
//! - [`grid_catalog`]: a `side x side` grid of untimed tasks
//! - [`noisy_ground_truth`]: seeded random readings for every grid point
//! - [`warmed_staged_policy`]: a staged policy past cold start, refining
//! - [`demand_catalog`]: timed demand spread over a horizon

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use survey_catalog::{GroundTruth, TaskCatalog};
use survey_core::{CampaignId, Location, MeasurementKey, TaskData};
use survey_policies::{StagedConfig, StagedPolicy};
use survey_policy::CampaignPolicy;

/// Campaign id used by every profile.
pub const BENCH_CAMPAIGN: CampaignId = CampaignId(1);

/// `side * side` untimed tasks on a 1e-3 degree grid.
pub fn grid_catalog(side: usize) -> TaskCatalog {
    let mut tasks = Vec::with_capacity(side * side);
    for row in 0..side {
        for col in 0..side {
            let loc = Location::from_micro_degrees(
                42_000_000 + 1_000 * row as i64,
                -71_000_000 + 1_000 * col as i64,
            );
            tasks.push(TaskData::new(BENCH_CAMPAIGN, loc).with_duration(25.0));
        }
    }
    TaskCatalog::from_tasks(tasks)
}

/// Random readings in `[0, 100)` for every catalog location at each of
/// `times`.
pub fn noisy_ground_truth(catalog: &TaskCatalog, times: &[i64], seed: u64) -> GroundTruth {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut entries = Vec::with_capacity(catalog.len() * times.len());
    for loc in catalog.locations() {
        for &t in times {
            entries.push((MeasurementKey::new(loc, t), rng.random::<f64>() * 100.0));
        }
    }
    GroundTruth::from_entries(entries)
}

/// A staged policy over a `side x side` grid that has taken `samples`
/// readings everywhere and is now refining `refine` locations per cycle.
///
/// Samples never go stale, so every later `update` is a refinement cycle.
pub fn warmed_staged_policy(
    side: usize,
    samples: usize,
    refine: usize,
    seed: u64,
) -> StagedPolicy {
    let catalog = grid_catalog(side);
    let times: Vec<i64> = (0..samples as i64).collect();
    let truth = noisy_ground_truth(&catalog, &times, seed);
    let reports: Vec<TaskData> = catalog.iter().cloned().collect();
    let mut policy = StagedPolicy::new(
        BENCH_CAMPAIGN,
        catalog,
        Arc::new(truth),
        StagedConfig {
            num_samples_init: samples,
            sample_valid_secs: i64::MAX / 4,
            num_samples_uncertain: refine,
        },
    );
    for &t in &times {
        let done: Vec<TaskData> = reports.iter().map(|r| r.clone().fulfilled_at(t)).collect();
        // Only `refine == 0` can fail here; the store is filled either way.
        let _ = policy.update(&done, t);
    }
    policy
}

/// `n` timed tasks with request times spread uniformly over `(0, horizon]`
/// across 64 locations, each with unit interest and a 10 s duration.
pub fn demand_catalog(n: usize, horizon: i64, seed: u64) -> TaskCatalog {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let tasks = (0..n)
        .map(|_| {
            let spot = rng.random_range(0..64i64);
            let loc = Location::from_micro_degrees(42_000_000 + 1_000 * spot, -71_000_000);
            TaskData::new(BENCH_CAMPAIGN, loc)
                .with_request_time(rng.random_range(1..=horizon))
                .with_duration(10.0)
        })
        .collect();
    TaskCatalog::from_tasks(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_policies::Stage;

    #[test]
    fn grid_has_distinct_locations() {
        let catalog = grid_catalog(8);
        assert_eq!(catalog.len(), 64);
        assert_eq!(catalog.locations().len(), 64);
    }

    #[test]
    fn warmed_policy_is_refining() {
        let policy = warmed_staged_policy(5, 3, 4, 42);
        assert!(policy.is_initialized());
        assert_eq!(policy.stage(), Stage::Refining);
        assert_eq!(policy.interest_map().len(), 4);
        assert_eq!(policy.store().total_measurements(), 75);
    }

    #[test]
    fn demand_catalog_is_deterministic() {
        let a = demand_catalog(100, 3_600, 7);
        let b = demand_catalog(100, 3_600, 7);
        assert_eq!(a, b);
        assert_eq!(a.requested_within(0, 3_600).count(), 100);
    }
}
