//! Staged active-learning controller.
//!
//! Each cycle the policy picks one of three regimes, in fixed priority
//! order, and rebuilds its interest map from that regime's target set:
//!
//! 1. **Initializing(k)**: cold-start coverage: every tracked location
//!    with fewer than `k + 1` samples. Stage `k` completes once every
//!    location has `k + 1` samples; completion flags never revert.
//! 2. **Renewing**: every location whose newest sample is at least
//!    `sample_valid_secs` old.
//! 3. **Refining**: the `num_samples_uncertain` locations with the highest
//!    sample standard deviation over their whole history.
//!
//! The regime is re-derived from scratch every cycle; only the
//! initialization flags carry over.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexSet;
use survey_catalog::TaskCatalog;
use survey_core::{
    CampaignId, GroundTruthSource, InterestMap, Location, MeasurementKey, PolicyError, TaskData,
};
use survey_policy::{
    rank_by_dispersion, rebuild_interest_map, undersampled, CampaignPolicy, MeasurementStore,
};
use tracing::{debug, warn};

/// Tuning for [`StagedPolicy`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StagedConfig {
    /// Number of cold-start coverage rounds.
    pub num_samples_init: usize,
    /// Seconds a sample stays fresh before its location needs renewal.
    pub sample_valid_secs: i64,
    /// Number of locations requested per refinement cycle.
    pub num_samples_uncertain: usize,
}

/// The regime a [`StagedPolicy`] selected on its last cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Cold-start coverage round `k` (zero-based).
    Initializing(usize),
    /// Re-sampling stale locations.
    Renewing,
    /// Re-sampling the most dispersed locations.
    Refining,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initializing(k) => write!(f, "initializing({k})"),
            Self::Renewing => write!(f, "renewing"),
            Self::Refining => write!(f, "refining"),
        }
    }
}

/// Coverage, then staleness, then dispersion-driven sampling.
///
/// Completed tasks are resolved against the ground truth at
/// `(location, fulfill_time)`. A miss is logged and treated as no data:
/// nothing is recorded and the cycle continues. This is deliberately more
/// lenient than [`EstimatorPolicy`](crate::EstimatorPolicy).
///
/// Every catalog task is requested until the first update.
pub struct StagedPolicy {
    id: CampaignId,
    catalog: TaskCatalog,
    ground_truth: Arc<dyn GroundTruthSource>,
    config: StagedConfig,
    store: MeasurementStore,
    init_done: Vec<bool>,
    stage: Stage,
    interest_map: InterestMap,
}

impl StagedPolicy {
    /// Create a policy over `catalog`, tracking every catalog location.
    pub fn new(
        id: CampaignId,
        catalog: TaskCatalog,
        ground_truth: Arc<dyn GroundTruthSource>,
        config: StagedConfig,
    ) -> Self {
        let store = MeasurementStore::tracking(catalog.iter().map(|t| t.location));
        let interest_map = catalog.iter().map(|t| (t.task(), t.clone())).collect();
        let stage = if config.num_samples_init > 0 {
            Stage::Initializing(0)
        } else {
            Stage::Renewing
        };
        Self {
            id,
            catalog,
            ground_truth,
            config,
            store,
            init_done: vec![false; config.num_samples_init],
            stage,
            interest_map,
        }
    }

    /// The regime chosen on the last cycle.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Per-round cold-start completion flags.
    pub fn init_flags(&self) -> &[bool] {
        &self.init_done
    }

    /// Whether every cold-start round has completed.
    pub fn is_initialized(&self) -> bool {
        self.init_done.iter().all(|&d| d)
    }

    /// Accumulated measurements.
    pub fn store(&self) -> &MeasurementStore {
        &self.store
    }

    /// First cold-start round not yet complete.
    fn init_stage(&self) -> Option<usize> {
        self.init_done.iter().position(|&d| !d)
    }

    /// Flip completion flags for every round now satisfied, in order.
    fn advance_init(&mut self) {
        for (round, done) in self.init_done.iter_mut().enumerate() {
            if *done {
                continue;
            }
            if !self.store.all_have_at_least(round + 1) {
                break;
            }
            *done = true;
        }
    }

    fn record(&mut self, task: &TaskData, now: i64) {
        if !self.store.is_tracked(&task.location) {
            warn!(
                campaign = %self.id,
                location = %task.location,
                "completion at a location outside the catalog; ignoring"
            );
            return;
        }
        let time = task.fulfill_time.unwrap_or(now);
        let key = MeasurementKey::new(task.location, time);
        match self.ground_truth.lookup(&key) {
            Some(value) => {
                debug!(campaign = %self.id, location = %task.location, time, value, "measured");
                self.store.record(task.location, time, value);
                self.advance_init();
            }
            None => {
                debug!(campaign = %self.id, %key, "no ground truth for completion; treating as no data");
            }
        }
    }

    /// Pick this cycle's regime and its target locations.
    fn plan(&self, now: i64) -> (Stage, IndexSet<Location>) {
        if let Some(round) = self.init_stage() {
            return (
                Stage::Initializing(round),
                undersampled(&self.store, round + 1),
            );
        }
        let stale = self
            .store
            .stale_locations(now, self.config.sample_valid_secs);
        if !stale.is_empty() {
            return (Stage::Renewing, stale);
        }
        let uncertain = rank_by_dispersion(
            self.store.dispersion_by_location(),
            self.config.num_samples_uncertain,
        );
        (Stage::Refining, uncertain)
    }
}

impl CampaignPolicy for StagedPolicy {
    fn id(&self) -> CampaignId {
        self.id
    }

    fn name(&self) -> &str {
        "staged"
    }

    fn interest_map(&self) -> &InterestMap {
        &self.interest_map
    }

    fn update(&mut self, completed: &[TaskData], now: i64) -> Result<(), PolicyError> {
        for task in completed {
            self.record(task, now);
        }

        let (stage, targets) = self.plan(now);
        let map = rebuild_interest_map(&self.catalog, &targets);
        debug!(
            campaign = %self.id,
            %stage,
            targets = targets.len(),
            tasks = map.len(),
            "rebuilt interest map"
        );
        if map.is_empty() {
            return Err(PolicyError::ConsistencyViolation {
                reason: format!("interest map is empty after {stage} cycle at t={now}"),
            });
        }
        self.stage = stage;
        self.interest_map = map;
        Ok(())
    }
}

impl fmt::Debug for StagedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StagedPolicy")
            .field("id", &self.id)
            .field("stage", &self.stage)
            .field("init_done", &self.init_done)
            .field("tracked", &self.store.len())
            .field("measurements", &self.store.total_measurements())
            .field("interest_map", &self.interest_map.len())
            .finish()
    }
}
