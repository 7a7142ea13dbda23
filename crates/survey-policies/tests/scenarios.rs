//! Integration test: end-to-end cycles for the staged and demand-decay
//! policies, driven the way a host scheduler drives them.

use std::sync::Arc;

use indexmap::IndexSet;
use survey_core::{CampaignId, Location, PolicyError, TaskData};
use survey_policies::{DemandDecayPolicy, Stage, StagedConfig, StagedPolicy};
use survey_policy::CampaignPolicy;
use survey_test_utils::{
    completion, grid_locations, staged_catalog, timed_catalog, MockGroundTruth,
};

const APP: CampaignId = CampaignId(21);

fn target_set(p: &dyn CampaignPolicy) -> IndexSet<Location> {
    p.interest_map().tasks().map(|t| t.location).collect()
}

fn set(locs: &[Location]) -> IndexSet<Location> {
    locs.iter().copied().collect()
}

// ── Staged: two cold-start rounds over three locations ───────────────

#[test]
fn two_round_cold_start_then_refine() {
    let locs = grid_locations(3);
    let (a, b, c) = (locs[0], locs[1], locs[2]);
    let mut p = StagedPolicy::new(
        APP,
        staged_catalog(APP, &locs),
        Arc::new(MockGroundTruth::constant(12.0)),
        StagedConfig {
            num_samples_init: 2,
            sample_valid_secs: 100,
            num_samples_uncertain: 3,
        },
    );

    let done = |l: Location, t: i64| TaskData::new(APP, l).fulfilled_at(t);

    // Only A and B report back during round 0: C is the sole gap.
    p.update(&[done(a, 1), done(b, 1)], 1).unwrap();
    assert_eq!(p.stage(), Stage::Initializing(0));
    assert_eq!(target_set(&p), set(&[c]));
    assert_eq!(p.init_flags(), &[false, false]);

    // C fills in; round 1 wants everything again.
    p.update(&[done(c, 2)], 2).unwrap();
    assert_eq!(p.stage(), Stage::Initializing(1));
    assert_eq!(target_set(&p), set(&[a, b, c]));
    assert_eq!(p.init_flags(), &[true, false]);

    // A partial second round keeps the policy in round 1.
    p.update(&[done(a, 3)], 3).unwrap();
    assert_eq!(p.stage(), Stage::Initializing(1));
    assert_eq!(target_set(&p), set(&[b, c]));

    p.update(&[done(b, 4), done(c, 4)], 4).unwrap();
    assert!(p.is_initialized());
    assert_eq!(p.stage(), Stage::Refining);
    assert_eq!(p.interest_map().len(), 3);
}

#[test]
fn staleness_outranks_dispersion() {
    let locs = grid_locations(3);
    let mut gt = MockGroundTruth::new();
    // Location 0 is wildly dispersed, but fresh.
    gt.set(locs[0], 0, 0.0);
    gt.set(locs[0], 150, 1000.0);
    gt.set(locs[1], 0, 5.0);
    gt.set(locs[2], 0, 5.0);
    gt.set(locs[1], 160, 5.0);
    gt.set(locs[2], 160, 5.0);
    let mut p = StagedPolicy::new(
        APP,
        staged_catalog(APP, &locs),
        Arc::new(gt),
        StagedConfig {
            num_samples_init: 1,
            sample_valid_secs: 100,
            num_samples_uncertain: 1,
        },
    );
    let all: Vec<TaskData> = locs
        .iter()
        .map(|&l| TaskData::new(APP, l).fulfilled_at(0))
        .collect();
    p.update(&all, 0).unwrap();

    p.update(&[TaskData::new(APP, locs[0]).fulfilled_at(150)], 160)
        .unwrap();
    assert_eq!(p.stage(), Stage::Renewing);
    assert_eq!(target_set(&p), set(&[locs[1], locs[2]]));

    // Renew the stale pair; now dispersion decides.
    p.update(
        &[
            TaskData::new(APP, locs[1]).fulfilled_at(160),
            TaskData::new(APP, locs[2]).fulfilled_at(160),
        ],
        170,
    )
    .unwrap();
    assert_eq!(p.stage(), Stage::Refining);
    assert_eq!(target_set(&p), set(&[locs[0]]));
}

// ── Demand decay: interest 3, duration 30 s ──────────────────────────

fn decay_policy() -> (DemandDecayPolicy, TaskData) {
    let l = grid_locations(1);
    let catalog = timed_catalog(APP, &[(l[0], 100, 3.0, 30.0)]);
    let task = catalog.tasks()[0].clone();
    (DemandDecayPolicy::new(APP, catalog, 100, 0), task)
}

#[test]
fn decay_removes_entry_after_exact_consumption() {
    let (mut p, task) = decay_policy();
    assert!(p.interest_map().contains(&task.task()));

    for (i, now) in [50, 60].into_iter().enumerate() {
        p.update(&[completion(&task, now - 5, 1.0, 10.0)], now).unwrap();
        let left = p
            .interest_map()
            .get(&task.task())
            .map(|d| (d.interest, d.duration_secs));
        let spent = (i + 1) as f64;
        assert_eq!(left, Some((3.0 - spent, 30.0 - 10.0 * spent)));
    }

    p.update(&[completion(&task, 65, 1.0, 10.0)], 70).unwrap();
    assert!(p.interest_map().is_empty());

    // A fourth report finds nothing to consume: skipped, not fatal.
    p.update(&[completion(&task, 75, 1.0, 10.0)], 80).unwrap();
    assert!(p.interest_map().is_empty());
}

#[test]
fn decay_four_reports_in_one_cycle() {
    let (mut p, task) = decay_policy();
    let reports = vec![completion(&task, 150, 1.0, 10.0); 4];
    p.update(&reports, 200).unwrap();
    assert!(p.interest_map().is_empty());
}

#[test]
fn decay_overdraw_is_consistency_violation() {
    let (mut p, task) = decay_policy();
    match p.update(&[completion(&task, 40, 3.5, 10.0)], 50) {
        Err(PolicyError::ConsistencyViolation { reason }) => {
            assert!(reason.contains("negative"));
        }
        other => panic!("expected ConsistencyViolation, got {other:?}"),
    }
}
