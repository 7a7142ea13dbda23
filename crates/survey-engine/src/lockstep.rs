//! Lockstep (synchronous) campaign driver.
//!
//! [`LockstepCampaign`] is the host-side wrapper around a policy. Each call
//! to [`step()`](LockstepCampaign::step) folds one batch of completions
//! into the policy and returns the resulting interest map.
//!
//! # Ownership model
//!
//! `LockstepCampaign` is [`Send`] but not [`Sync`]. [`step()`] takes
//! `&mut self` and returns a [`CycleResult`] that borrows the interest
//! map from `self`, so a caller cannot start the next cycle while still
//! holding the previous snapshot.
//!
//! # Failure
//!
//! A policy error is fatal for the campaign. The driver records it and
//! refuses every later cycle with [`CycleError::Halted`].
//!
//! [`step()`]: LockstepCampaign::step

use std::error::Error;
use std::fmt;
use std::time::Instant;

use survey_core::{CampaignId, InterestMap, PolicyError, TaskData};
use survey_policy::CampaignPolicy;
use tracing::{debug, error};

use crate::config::{CampaignConfig, ConfigError};
use crate::metrics::CycleMetrics;

const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<LockstepCampaign>();
    }
};

// ── CycleError ──────────────────────────────────────────────────

/// Errors returned by [`LockstepCampaign::step()`].
#[derive(Clone, Debug, PartialEq)]
pub enum CycleError {
    /// The cycle time did not advance past the previous cycle.
    NonMonotonicTime {
        /// Time of the last accepted cycle.
        previous: i64,
        /// The rejected time.
        now: i64,
    },
    /// The policy reported a fatal condition during this cycle.
    Policy(PolicyError),
    /// An earlier cycle failed; the campaign accepts no more cycles.
    Halted {
        /// The cycle that failed.
        failed_cycle: u64,
    },
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonMonotonicTime { previous, now } => {
                write!(f, "cycle time {now} does not advance past {previous}")
            }
            Self::Policy(e) => write!(f, "policy: {e}"),
            Self::Halted { failed_cycle } => {
                write!(f, "campaign halted after cycle {failed_cycle} failed")
            }
        }
    }
}

impl Error for CycleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Policy(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PolicyError> for CycleError {
    fn from(e: PolicyError) -> Self {
        Self::Policy(e)
    }
}

// ── CycleResult ─────────────────────────────────────────────────

/// Result of a successful [`LockstepCampaign::step()`] call.
#[derive(Debug)]
pub struct CycleResult<'c> {
    /// The policy's interest map after this cycle.
    pub interest_map: &'c InterestMap,
    /// Counters and timing for this cycle.
    pub metrics: CycleMetrics,
}

// ── LockstepCampaign ────────────────────────────────────────────

/// Single-threaded driver for one campaign policy.
///
/// # Examples
///
/// ```
/// use survey_engine::{CampaignConfig, LockstepCampaign};
///
/// let config = CampaignConfig::from_json_str(
///     r#"{ "campaign_id": 7, "policy": {
///         "kind": "scatter", "corner": [42.35, -71.1], "spread": 0.01, "num": 4 } }"#,
/// )
/// .unwrap();
/// let mut campaign = LockstepCampaign::from_config(&config).unwrap();
/// for now in [60, 120, 180] {
///     let result = campaign.step(&[], now).unwrap();
///     assert_eq!(result.interest_map.len(), 4);
/// }
/// assert!(campaign.step(&[], 180).is_err());
/// ```
pub struct LockstepCampaign {
    policy: Box<dyn CampaignPolicy>,
    last_time: Option<i64>,
    cycles: u64,
    failed_cycle: Option<u64>,
    last_metrics: CycleMetrics,
}

impl LockstepCampaign {
    /// Wrap an already-constructed policy.
    pub fn new(policy: Box<dyn CampaignPolicy>) -> Self {
        Self {
            policy,
            last_time: None,
            cycles: 0,
            failed_cycle: None,
            last_metrics: CycleMetrics::default(),
        }
    }

    /// Build the policy described by `config` and wrap it.
    pub fn from_config(config: &CampaignConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.build()?))
    }

    /// Run one scheduling cycle.
    ///
    /// `now` must be strictly greater than the previous cycle's time.
    /// The returned [`CycleResult`] borrows the interest map from `self`.
    ///
    /// # Errors
    ///
    /// [`CycleError::NonMonotonicTime`] leaves the campaign untouched.
    /// [`CycleError::Policy`] halts the campaign; every later call
    /// returns [`CycleError::Halted`].
    pub fn step(
        &mut self,
        completed: &[TaskData],
        now: i64,
    ) -> Result<CycleResult<'_>, CycleError> {
        if let Some(failed_cycle) = self.failed_cycle {
            return Err(CycleError::Halted { failed_cycle });
        }
        if let Some(previous) = self.last_time {
            if now <= previous {
                return Err(CycleError::NonMonotonicTime { previous, now });
            }
        }

        let cycle = self.cycles + 1;
        let tasks_before = self.policy.interest_map().len();
        let start = Instant::now();
        let outcome = self.policy.update(completed, now);
        let update_us = start.elapsed().as_micros() as u64;
        self.cycles = cycle;
        self.last_time = Some(now);

        if let Err(e) = outcome {
            error!(
                campaign = %self.policy.id(),
                policy = self.policy.name(),
                cycle,
                now,
                error = %e,
                "policy failed; halting campaign"
            );
            self.failed_cycle = Some(cycle);
            return Err(e.into());
        }

        let metrics = CycleMetrics {
            cycle,
            now,
            completions: completed.len(),
            tasks_before,
            tasks_after: self.policy.interest_map().len(),
            update_us,
        };
        debug!(
            campaign = %self.policy.id(),
            cycle,
            now,
            completions = metrics.completions,
            tasks = metrics.tasks_after,
            update_us,
            "cycle complete"
        );
        self.last_metrics = metrics.clone();
        Ok(CycleResult {
            interest_map: self.policy.interest_map(),
            metrics,
        })
    }

    /// The interest map as of the last successful cycle (or construction).
    pub fn interest_map(&self) -> &InterestMap {
        self.policy.interest_map()
    }

    /// The campaign served by the wrapped policy.
    pub fn id(&self) -> CampaignId {
        self.policy.id()
    }

    /// The wrapped policy.
    pub fn policy(&self) -> &dyn CampaignPolicy {
        self.policy.as_ref()
    }

    /// Number of cycles run, including a failed one.
    pub fn cycle_count(&self) -> u64 {
        self.cycles
    }

    /// Time of the last cycle run, if any.
    pub fn last_time(&self) -> Option<i64> {
        self.last_time
    }

    /// Whether a policy error has halted the campaign.
    pub fn is_halted(&self) -> bool {
        self.failed_cycle.is_some()
    }

    /// Metrics from the most recent successful cycle.
    pub fn last_metrics(&self) -> &CycleMetrics {
        &self.last_metrics
    }
}

impl fmt::Debug for LockstepCampaign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockstepCampaign")
            .field("campaign", &self.policy.id())
            .field("policy", &self.policy.name())
            .field("cycles", &self.cycles)
            .field("last_time", &self.last_time)
            .field("halted", &self.is_halted())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use survey_policies::{DemandDecayPolicy, EstimatorConfig, EstimatorPolicy, ReplenishPolicy};
    use survey_test_utils::{
        completion, grid_locations, staged_catalog, timed_catalog, FailingEstimator,
        MockGroundTruth,
    };

    const APP: CampaignId = CampaignId(11);

    fn replenish(n: usize) -> LockstepCampaign {
        let locs = grid_locations(n);
        LockstepCampaign::new(Box::new(ReplenishPolicy::new(
            APP,
            staged_catalog(APP, &locs),
        )))
    }

    #[test]
    fn metrics_track_map_size() {
        let mut c = replenish(3);
        let first = c.interest_map().tasks().next().copied().unwrap();
        let done = TaskData::new(APP, first.location);
        let result = c.step(&[done], 10).unwrap();
        assert_eq!(result.interest_map.len(), 2);
        assert_eq!(result.metrics.cycle, 1);
        assert_eq!(result.metrics.completions, 1);
        assert_eq!(result.metrics.tasks_before, 3);
        assert_eq!(result.metrics.tasks_after, 2);
        assert_eq!(c.last_metrics().task_delta(), -1);
    }

    #[test]
    fn time_must_advance() {
        let mut c = replenish(1);
        c.step(&[], 10).unwrap();
        assert_eq!(
            c.step(&[], 10).unwrap_err(),
            CycleError::NonMonotonicTime {
                previous: 10,
                now: 10
            }
        );
        assert!(!c.is_halted());
        assert_eq!(c.cycle_count(), 1);
        c.step(&[], 11).unwrap();
    }

    #[test]
    fn policy_error_halts_campaign() {
        let locs = grid_locations(2);
        let policy = EstimatorPolicy::new(
            APP,
            staged_catalog(APP, &locs),
            Arc::new(MockGroundTruth::constant(1.0)),
            Box::new(FailingEstimator::exit_code(3)),
            EstimatorConfig::default(),
        );
        let mut c = LockstepCampaign::new(Box::new(policy));
        let err = c.step(&[TaskData::new(APP, locs[0])], 5).unwrap_err();
        assert!(matches!(
            err,
            CycleError::Policy(PolicyError::EstimatorFailure(_))
        ));
        assert!(err.source().is_some());
        assert!(c.is_halted());
        assert_eq!(
            c.step(&[], 6).unwrap_err(),
            CycleError::Halted { failed_cycle: 1 }
        );
    }

    #[test]
    fn drives_demand_decay_through_expiry() {
        let l = grid_locations(2);
        let catalog = timed_catalog(APP, &[(l[0], 60, 2.0, 20.0), (l[1], 120, 1.0, 10.0)]);
        let first = catalog.tasks()[0].clone();
        let policy = DemandDecayPolicy::new(APP, catalog, 60, 0);
        let mut c = LockstepCampaign::new(Box::new(policy));
        assert_eq!(c.interest_map().len(), 1);

        let r = c.step(&[completion(&first, 30, 1.0, 10.0)], 59).unwrap();
        assert_eq!(r.interest_map.len(), 1);

        // t=120: the first request has expired and the second is admitted.
        let r = c.step(&[], 120).unwrap();
        let locs: Vec<_> = r.interest_map.tasks().map(|t| t.location).collect();
        assert_eq!(locs, vec![l[1]]);
    }

    proptest::proptest! {
        #[test]
        fn rejected_times_never_count_as_cycles(
            steps in proptest::collection::vec(-50i64..50, 1..40),
        ) {
            let mut c = replenish(2);
            let mut accepted = 0u64;
            let mut last = None;
            for now in steps {
                let ok = c.step(&[], now).is_ok();
                let expected = last.is_none_or(|prev| now > prev);
                proptest::prop_assert_eq!(ok, expected);
                if ok {
                    accepted += 1;
                    last = Some(now);
                }
            }
            proptest::prop_assert_eq!(c.cycle_count(), accepted);
            proptest::prop_assert_eq!(c.last_time(), last);
            proptest::prop_assert!(!c.is_halted());
        }
    }
}
