//! Estimator-driven refinement.
//!
//! Instead of computing dispersion locally, this policy hands all of its
//! measurements to an [`UncertaintyEstimator`] each cycle and requests
//! exactly the locations the estimator flags.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexSet;
use survey_catalog::TaskCatalog;
use survey_core::{
    CampaignId, GroundTruthSource, InterestMap, Location, MeasurementKey, PolicyError, TaskData,
};
use survey_estimator::{EstimateRequest, MeasuredValue, UncertaintyEstimator};
use survey_policy::{rebuild_interest_map, CampaignPolicy};
use tracing::debug;

/// Tuning for [`EstimatorPolicy`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EstimatorConfig {
    /// Confidence threshold passed to the estimator.
    pub confidence_threshold: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 1e-6,
        }
    }
}

/// Requests the locations an external estimator reports as uncertain.
///
/// The ground truth is treated as time-invariant: completions are looked
/// up with [`MeasurementKey::untimed`]. Unlike
/// [`StagedPolicy`](crate::StagedPolicy), a lookup miss is fatal
/// ([`PolicyError::NotFound`]), as is any estimator failure.
///
/// Until the first measurement arrives the estimator is never invoked
/// and the initial interest map (the whole catalog) stays in place.
pub struct EstimatorPolicy {
    id: CampaignId,
    catalog: TaskCatalog,
    queries: Vec<Location>,
    ground_truth: Arc<dyn GroundTruthSource>,
    estimator: Box<dyn UncertaintyEstimator>,
    config: EstimatorConfig,
    measurements: Vec<MeasuredValue>,
    interest_map: InterestMap,
}

impl EstimatorPolicy {
    /// Create a policy over `catalog`, querying every catalog location.
    pub fn new(
        id: CampaignId,
        catalog: TaskCatalog,
        ground_truth: Arc<dyn GroundTruthSource>,
        estimator: Box<dyn UncertaintyEstimator>,
        config: EstimatorConfig,
    ) -> Self {
        let queries = catalog.locations().into_iter().collect();
        let interest_map = catalog.iter().map(|t| (t.task(), t.clone())).collect();
        Self {
            id,
            catalog,
            queries,
            ground_truth,
            estimator,
            config,
            measurements: Vec::new(),
            interest_map,
        }
    }

    /// Measurements accumulated so far, in arrival order.
    pub fn measurements(&self) -> &[MeasuredValue] {
        &self.measurements
    }

    fn record(&mut self, task: &TaskData) -> Result<(), PolicyError> {
        let key = MeasurementKey::untimed(task.location);
        let value = self
            .ground_truth
            .lookup(&key)
            .ok_or_else(|| PolicyError::NotFound {
                what: format!("ground truth for completion at {}", task.location),
            })?;
        debug!(
            campaign = %self.id,
            location = %task.location,
            time = task.fulfill_time,
            value,
            "measured"
        );
        self.measurements.push(MeasuredValue {
            location: task.location,
            value,
        });
        Ok(())
    }
}

impl CampaignPolicy for EstimatorPolicy {
    fn id(&self) -> CampaignId {
        self.id
    }

    fn name(&self) -> &str {
        "estimator"
    }

    fn interest_map(&self) -> &InterestMap {
        &self.interest_map
    }

    fn update(&mut self, completed: &[TaskData], now: i64) -> Result<(), PolicyError> {
        for task in completed {
            self.record(task)?;
        }
        if self.measurements.is_empty() {
            return Ok(());
        }

        let request = EstimateRequest {
            measurements: self.measurements.clone(),
            queries: self.queries.clone(),
            threshold: self.config.confidence_threshold,
            time: now,
        };
        let uncertain = self.estimator.estimate(&request)?;
        let targets: IndexSet<Location> = uncertain.into_iter().collect();
        self.interest_map = rebuild_interest_map(&self.catalog, &targets);
        debug!(
            campaign = %self.id,
            flagged = targets.len(),
            tasks = self.interest_map.len(),
            "rebuilt interest map from estimator"
        );
        Ok(())
    }
}

impl fmt::Debug for EstimatorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EstimatorPolicy")
            .field("id", &self.id)
            .field("queries", &self.queries.len())
            .field("measurements", &self.measurements.len())
            .field("config", &self.config)
            .field("interest_map", &self.interest_map.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_test_utils::{
        grid_locations, staged_catalog, CannedEstimator, FailingEstimator, MockGroundTruth,
        RecordingEstimator,
    };

    const APP: CampaignId = CampaignId(4);

    fn policy_with(
        estimator: Box<dyn UncertaintyEstimator>,
        n: usize,
    ) -> (EstimatorPolicy, Vec<Location>) {
        let locs = grid_locations(n);
        let p = EstimatorPolicy::new(
            APP,
            staged_catalog(APP, &locs),
            Arc::new(MockGroundTruth::constant(50.0)),
            estimator,
            EstimatorConfig {
                confidence_threshold: 0.1,
            },
        );
        (p, locs)
    }

    #[test]
    fn no_measurements_skips_estimator() {
        let (mut p, locs) = policy_with(Box::new(FailingEstimator::exit_code(1)), 3);
        p.update(&[], 10).unwrap();
        assert_eq!(p.interest_map().len(), locs.len());
    }

    #[test]
    fn flagged_locations_become_interest_map() {
        let locs = grid_locations(4);
        let (mut p, _) = policy_with(Box::new(CannedEstimator::new(vec![locs[2], locs[0]])), 4);
        p.update(&[TaskData::new(APP, locs[1]).fulfilled_at(5)], 10)
            .unwrap();
        let got: Vec<Location> = p.interest_map().tasks().map(|t| t.location).collect();
        assert_eq!(got, vec![locs[0], locs[2]]);
    }

    #[test]
    fn request_carries_all_measurements_and_queries() {
        let est = RecordingEstimator::new(vec![]);
        let log = est.requests();
        let (mut p, locs) = policy_with(Box::new(est), 3);
        p.update(&[TaskData::new(APP, locs[0]).fulfilled_at(1)], 60).unwrap();
        p.update(&[TaskData::new(APP, locs[1]).fulfilled_at(61)], 120).unwrap();

        let requests = log.lock().unwrap();
        assert_eq!(requests.len(), 2);
        let last = &requests[1];
        assert_eq!(last.measurements.len(), 2);
        assert_eq!(last.queries, locs);
        assert_eq!(last.threshold, 0.1);
        assert_eq!(last.time, 120);
        assert_eq!(last.measurements[1].value, 50.0);
        // An empty response empties the map; that is not an error here.
        assert!(p.interest_map().is_empty());
    }

    #[test]
    fn estimator_failure_is_fatal() {
        let (mut p, locs) = policy_with(Box::new(FailingEstimator::exit_code(2)), 2);
        match p.update(&[TaskData::new(APP, locs[0])], 1) {
            Err(PolicyError::EstimatorFailure(_)) => {}
            other => panic!("expected EstimatorFailure, got {other:?}"),
        }
    }

    #[test]
    fn ground_truth_miss_is_fatal() {
        let locs = grid_locations(2);
        let mut p = EstimatorPolicy::new(
            APP,
            staged_catalog(APP, &locs),
            Arc::new(MockGroundTruth::new()),
            Box::new(CannedEstimator::new(vec![])),
            EstimatorConfig::default(),
        );
        match p.update(&[TaskData::new(APP, locs[0])], 1) {
            Err(PolicyError::NotFound { .. }) => {}
            other => panic!("expected NotFound, got {other:?}"),
        }
    }
}
