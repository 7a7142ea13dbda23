//! Reusable catalog fixtures.
//!
//! - [`grid_locations`]: `n` distinct locations on a 1e-3 degree line.
//! - [`staged_catalog`]: one untimed task per location.
//! - [`timed_catalog`]: tasks with explicit request time, interest and duration.
//! - [`completion`]: a completion report for a catalog task.

use survey_catalog::TaskCatalog;
use survey_core::{CampaignId, Location, TaskData};

/// `n` distinct locations, spaced 1e-3 degrees apart in latitude.
pub fn grid_locations(n: usize) -> Vec<Location> {
    (0..n)
        .map(|i| Location::from_micro_degrees(42_000_000 + 1_000 * i as i64, -71_000_000))
        .collect()
}

/// One untimed task per location, with unit interest and a 25 s duration.
pub fn staged_catalog(campaign: CampaignId, locations: &[Location]) -> TaskCatalog {
    TaskCatalog::from_tasks(
        locations
            .iter()
            .map(|&loc| TaskData::new(campaign, loc).with_duration(25.0))
            .collect(),
    )
}

/// Timed tasks from `(location, request_time, interest, duration_secs)` tuples.
pub fn timed_catalog(campaign: CampaignId, specs: &[(Location, i64, f64, f64)]) -> TaskCatalog {
    TaskCatalog::from_tasks(
        specs
            .iter()
            .map(|&(loc, rt, interest, duration)| {
                TaskData::new(campaign, loc)
                    .with_request_time(rt)
                    .with_interest(interest)
                    .with_duration(duration)
            })
            .collect(),
    )
}

/// A completion report for `task`, fulfilled at `time`, consuming the
/// given interest and duration.
pub fn completion(task: &TaskData, time: i64, interest: f64, duration_secs: f64) -> TaskData {
    let mut done = task.clone().fulfilled_at(time);
    done.interest = interest;
    done.duration_secs = duration_secs;
    done
}
