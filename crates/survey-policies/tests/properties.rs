//! Property tests for the policy invariants: monotonic cold-start
//! progress, renewal priority, refinement size, and residual-demand
//! non-negativity under integral and fractional reports.

use std::sync::Arc;

use indexmap::IndexSet;
use proptest::prelude::*;
use survey_core::{CampaignId, Location, PolicyError, TaskData};
use survey_policies::{DemandDecayPolicy, Stage, StagedConfig, StagedPolicy};
use survey_policy::CampaignPolicy;
use survey_test_utils::{
    completion, grid_locations, staged_catalog, timed_catalog, MockGroundTruth,
};

const APP: CampaignId = CampaignId(30);

fn staged(
    n: usize,
    config: StagedConfig,
    gt: MockGroundTruth,
) -> (StagedPolicy, Vec<Location>) {
    let locs = grid_locations(n);
    let p = StagedPolicy::new(APP, staged_catalog(APP, &locs), Arc::new(gt), config);
    (p, locs)
}

fn targets(p: &StagedPolicy) -> IndexSet<Location> {
    p.interest_map().tasks().map(|t| t.location).collect()
}

proptest! {
    #[test]
    fn init_flags_never_revert(
        n in 1usize..6,
        init in 0usize..4,
        batches in prop::collection::vec(prop::collection::vec(0usize..6, 0..5), 1..15),
    ) {
        let config = StagedConfig {
            num_samples_init: init,
            sample_valid_secs: 50,
            num_samples_uncertain: 2,
        };
        let (mut p, locs) = staged(n, config, MockGroundTruth::constant(1.0));
        let mut prev = p.init_flags().to_vec();
        let mut left_init = false;

        for (cycle, batch) in batches.iter().enumerate() {
            let now = 10 * cycle as i64;
            let done: Vec<TaskData> = batch
                .iter()
                .map(|&i| TaskData::new(APP, locs[i % n]).fulfilled_at(now))
                .collect();
            p.update(&done, now).unwrap();

            let flags = p.init_flags().to_vec();
            for (before, after) in prev.iter().zip(&flags) {
                prop_assert!(!*before || *after, "flag reverted: {:?} -> {:?}", prev, flags);
            }
            let initializing = matches!(p.stage(), Stage::Initializing(_));
            prop_assert!(!(left_init && initializing), "returned to initializing");
            left_init |= !initializing;
            prev = flags;

            // Two reads between updates see the same snapshot.
            prop_assert_eq!(p.interest_map(), p.interest_map());
        }
    }

    #[test]
    fn stale_set_is_exactly_the_target(
        last_seen in prop::collection::vec(0i64..300, 1..8),
    ) {
        let n = last_seen.len();
        let config = StagedConfig {
            num_samples_init: 1,
            sample_valid_secs: 100,
            num_samples_uncertain: 1,
        };
        let (mut p, locs) = staged(n, config, MockGroundTruth::constant(3.0));
        let now = 300;
        let done: Vec<TaskData> = locs
            .iter()
            .zip(&last_seen)
            .map(|(&l, &t)| TaskData::new(APP, l).fulfilled_at(t))
            .collect();
        p.update(&done, now).unwrap();

        let stale: IndexSet<Location> = locs
            .iter()
            .zip(&last_seen)
            .filter(|(_, t)| now - **t >= 100)
            .map(|(&l, _)| l)
            .collect();
        if stale.is_empty() {
            prop_assert_eq!(p.stage(), Stage::Refining);
        } else {
            prop_assert_eq!(p.stage(), Stage::Renewing);
            prop_assert_eq!(targets(&p), stale);
        }
    }

    #[test]
    fn refinement_picks_most_dispersed(
        values in prop::collection::vec((0.0f64..100.0, 0.0f64..100.0), 1..10),
        k in 1usize..12,
    ) {
        let n = values.len();
        let locs = grid_locations(n);
        let mut gt = MockGroundTruth::new();
        for (l, (v0, v1)) in locs.iter().zip(&values) {
            gt.set(*l, 0, *v0);
            gt.set(*l, 1, *v1);
        }
        let config = StagedConfig {
            num_samples_init: 2,
            sample_valid_secs: 1_000,
            num_samples_uncertain: k,
        };
        let mut p = StagedPolicy::new(APP, staged_catalog(APP, &locs), Arc::new(gt), config);
        for t in 0..2 {
            let done: Vec<TaskData> = locs
                .iter()
                .map(|&l| TaskData::new(APP, l).fulfilled_at(t))
                .collect();
            p.update(&done, t).unwrap();
        }

        prop_assert_eq!(p.stage(), Stage::Refining);
        let picked = targets(&p);
        prop_assert_eq!(picked.len(), k.min(n));

        let dispersion = p.store().dispersion_by_location();
        let score = |l: &Location| {
            dispersion
                .iter()
                .find(|(x, _)| x == l)
                .and_then(|(_, d)| *d)
                .unwrap_or(f64::INFINITY)
        };
        let floor = picked.iter().map(score).fold(f64::INFINITY, f64::min);
        for l in &locs {
            if !picked.contains(l) {
                prop_assert!(score(l) <= floor);
            }
        }
    }

    #[test]
    fn residual_demand_never_negative(
        interest in 1u32..8,
        draws in prop::collection::vec(1u32..4, 1..10),
    ) {
        let l = grid_locations(1);
        let catalog = timed_catalog(
            APP,
            &[(l[0], 1_000, f64::from(interest), 10.0 * f64::from(interest))],
        );
        let task = catalog.tasks()[0].clone();
        let mut p = DemandDecayPolicy::new(APP, catalog, 10, 990);
        let mut residual = interest;

        for (i, &d) in draws.iter().enumerate() {
            let now = 1 + i as i64;
            let report = completion(&task, now, f64::from(d), 10.0 * f64::from(d));
            let result = p.update(&[report], now);
            if residual == 0 {
                prop_assert!(result.is_ok());
                prop_assert!(p.interest_map().is_empty());
                continue;
            }
            if d > residual {
                prop_assert!(
                    matches!(result, Err(PolicyError::ConsistencyViolation { .. })),
                    "overdraw of {} against {} not detected",
                    d,
                    residual
                );
                break;
            }
            prop_assert!(result.is_ok());
            residual -= d;
            match p.interest_map().get(&task.task()) {
                Some(entry) => {
                    prop_assert!(entry.interest >= 0.0 && entry.duration_secs >= 0.0);
                    prop_assert_eq!(entry.interest, f64::from(residual));
                }
                None => prop_assert_eq!(residual, 0),
            }
        }
    }

    #[test]
    fn fractional_reports_that_match_demand_drain_it(
        pieces in prop::collection::vec(1u32..50, 1..12),
    ) {
        let shares: Vec<f64> = pieces.iter().map(|&p| f64::from(p) * 0.01).collect();
        let total: f64 = shares.iter().sum();
        let l = grid_locations(1);
        let catalog = timed_catalog(APP, &[(l[0], 1_000, total, 10.0 * total)]);
        let task = catalog.tasks()[0].clone();
        let mut p = DemandDecayPolicy::new(APP, catalog, 10, 990);

        let reports: Vec<TaskData> = shares
            .iter()
            .map(|&s| completion(&task, 1, s, 10.0 * s))
            .collect();
        prop_assert!(p.update(&reports, 1).is_ok());
        prop_assert!(p.interest_map().is_empty());
    }
}
