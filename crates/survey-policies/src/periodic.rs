//! Fixed-interval re-survey.

use survey_catalog::TaskCatalog;
use survey_core::{CampaignId, InterestMap, PolicyError, TaskData};
use survey_policy::CampaignPolicy;
use tracing::debug;

/// Requests every catalog location, and requests them all again whenever
/// the clock lands on a multiple of the interval.
///
/// Identities drop the request time, so a location is requested at most
/// once at a time. Completions are removed before the refill check.
#[derive(Debug)]
pub struct PeriodicPolicy {
    id: CampaignId,
    catalog: TaskCatalog,
    interval_secs: i64,
    interest_map: InterestMap,
}

impl PeriodicPolicy {
    /// Create a policy with the whole catalog requested.
    ///
    /// An `interval_secs` below 1 is treated as 1.
    pub fn new(id: CampaignId, catalog: TaskCatalog, interval_secs: i64) -> Self {
        let mut policy = Self {
            id,
            catalog,
            interval_secs: interval_secs.max(1),
            interest_map: InterestMap::new(),
        };
        policy.refill();
        policy
    }

    /// Refill period in seconds.
    pub fn interval_secs(&self) -> i64 {
        self.interval_secs
    }

    fn refill(&mut self) {
        for t in &self.catalog {
            self.interest_map.insert(t.untimed_task(), t.clone());
        }
    }
}

impl CampaignPolicy for PeriodicPolicy {
    fn id(&self) -> CampaignId {
        self.id
    }

    fn name(&self) -> &str {
        "periodic"
    }

    fn interest_map(&self) -> &InterestMap {
        &self.interest_map
    }

    fn update(&mut self, completed: &[TaskData], now: i64) -> Result<(), PolicyError> {
        for done in completed {
            self.interest_map.remove(&done.untimed_task());
        }
        if now.rem_euclid(self.interval_secs) == 0 {
            self.refill();
            debug!(campaign = %self.id, now, tasks = self.interest_map.len(), "periodic refill");
        }
        Ok(())
    }
}
