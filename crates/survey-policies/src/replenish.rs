//! Round-robin coverage: drain, then start over.

use survey_catalog::TaskCatalog;
use survey_core::{CampaignId, InterestMap, PolicyError, TaskData};
use survey_policy::CampaignPolicy;
use tracing::debug;

/// Requests every catalog location until each has been visited, then
/// requests them all again.
///
/// Identities drop the request time. The refill happens in the same cycle
/// that drains the map, so the map is never observed empty unless the
/// catalog is.
#[derive(Debug)]
pub struct ReplenishPolicy {
    id: CampaignId,
    catalog: TaskCatalog,
    rounds: u64,
    interest_map: InterestMap,
}

impl ReplenishPolicy {
    /// Create a policy with the whole catalog requested.
    pub fn new(id: CampaignId, catalog: TaskCatalog) -> Self {
        let mut policy = Self {
            id,
            catalog,
            rounds: 0,
            interest_map: InterestMap::new(),
        };
        policy.refill();
        policy
    }

    /// Number of times the catalog has been (re)requested, construction
    /// included.
    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    fn refill(&mut self) {
        for t in &self.catalog {
            self.interest_map.insert(t.untimed_task(), t.clone());
        }
        self.rounds += 1;
    }
}

impl CampaignPolicy for ReplenishPolicy {
    fn id(&self) -> CampaignId {
        self.id
    }

    fn name(&self) -> &str {
        "replenish"
    }

    fn interest_map(&self) -> &InterestMap {
        &self.interest_map
    }

    fn update(&mut self, completed: &[TaskData], now: i64) -> Result<(), PolicyError> {
        for done in completed {
            self.interest_map.remove(&done.untimed_task());
        }
        if self.interest_map.is_empty() {
            self.refill();
            debug!(campaign = %self.id, now, round = self.rounds, "catalog replenished");
        }
        Ok(())
    }
}
