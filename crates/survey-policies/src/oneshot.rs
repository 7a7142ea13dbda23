//! Single-release campaign.

use survey_catalog::TaskCatalog;
use survey_core::{CampaignId, InterestMap, PolicyError, TaskData};
use survey_policy::CampaignPolicy;
use tracing::debug;

/// Releases the whole catalog once, at `start_secs`, then drains it.
///
/// Before the release the interest map is empty. Completed tasks are
/// removed by full identity (request time included) and never return.
#[derive(Debug)]
pub struct OneShotPolicy {
    id: CampaignId,
    catalog: TaskCatalog,
    start_secs: i64,
    interest_map: InterestMap,
}

impl OneShotPolicy {
    /// Create a policy that releases `catalog` at `start_secs`.
    pub fn new(id: CampaignId, catalog: TaskCatalog, start_secs: i64) -> Self {
        Self {
            id,
            catalog,
            start_secs,
            interest_map: InterestMap::new(),
        }
    }
}

impl CampaignPolicy for OneShotPolicy {
    fn id(&self) -> CampaignId {
        self.id
    }

    fn name(&self) -> &str {
        "one-shot"
    }

    fn interest_map(&self) -> &InterestMap {
        &self.interest_map
    }

    fn update(&mut self, completed: &[TaskData], now: i64) -> Result<(), PolicyError> {
        if now == self.start_secs {
            for t in &self.catalog {
                self.interest_map.insert(t.task(), t.clone());
            }
            debug!(campaign = %self.id, tasks = self.interest_map.len(), "released catalog");
        }
        for done in completed {
            self.interest_map.remove(&done.task());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_test_utils::{grid_locations, timed_catalog};

    const APP: CampaignId = CampaignId(5);

    #[test]
    fn releases_only_at_start() {
        let l = grid_locations(2);
        let catalog = timed_catalog(APP, &[(l[0], 10, 1.0, 5.0), (l[1], 10, 1.0, 5.0)]);
        let mut p = OneShotPolicy::new(APP, catalog, 60);
        assert!(p.interest_map().is_empty());
        p.update(&[], 30).unwrap();
        assert!(p.interest_map().is_empty());
        p.update(&[], 60).unwrap();
        assert_eq!(p.interest_map().len(), 2);
    }

    #[test]
    fn completions_drain_without_refill() {
        let l = grid_locations(2);
        let catalog = timed_catalog(APP, &[(l[0], 10, 1.0, 5.0), (l[1], 10, 1.0, 5.0)]);
        let first = catalog.tasks()[0].clone();
        let mut p = OneShotPolicy::new(APP, catalog, 0);
        p.update(&[], 0).unwrap();
        p.update(&[first.clone().fulfilled_at(20)], 30).unwrap();
        assert_eq!(p.interest_map().len(), 1);
        assert!(!p.interest_map().contains(&first.task()));
        p.update(&[], 90).unwrap();
        assert_eq!(p.interest_map().len(), 1);
    }
}
