//! Residual-demand accumulator.
//!
//! Demand enters the interest map when its request time comes due, is
//! worn down by completions, and expires once its request time is past.
//! Unlike the rebuild-style policies, the map is patched in place and
//! carries state between cycles.

use std::fmt;

use survey_catalog::TaskCatalog;
use survey_core::{CampaignId, InterestMap, PolicyError, TaskData};
use survey_policy::CampaignPolicy;
use tracing::{debug, warn};

/// Tracks outstanding interest and work per task, with expiry.
///
/// Each [`update`](CampaignPolicy::update) runs three phases in order:
///
/// 1. **Consume** each completion: subtract its `interest` and
///    `duration_secs` from the matching entry. Interest reaching zero,
///    up to rounding error, removes the entry; a negative remainder is a
///    [`PolicyError::ConsistencyViolation`] and leaves the entry
///    untouched. Completions with no matching entry are logged and
///    skipped.
/// 2. **Expire** every entry whose request time is before `now`. Entries
///    without a request time never expire.
/// 3. **Admit** catalog demand requested in `(now - interval, now]`,
///    summing interest and duration into any existing entry.
///
/// Construction admits `(start, start + interval]`.
///
/// Admission windows are anchored on `now`, so cycles closer together than
/// the interval overlap and admit still-live demand a second time.
pub struct DemandDecayPolicy {
    id: CampaignId,
    catalog: TaskCatalog,
    interval_secs: i64,
    interest_map: InterestMap,
}

/// Residuals within this distance of zero are treated as zero.
const RESIDUAL_EPSILON: f64 = 1e-9;

/// Snap a residual that is zero up to rounding error to exactly zero.
fn settle(residual: f64) -> f64 {
    if residual.abs() <= RESIDUAL_EPSILON {
        0.0
    } else {
        residual
    }
}

/// Per-cycle counters, logged at debug level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct CycleCounts {
    consumed: usize,
    skipped: usize,
    expired: usize,
    admitted: usize,
}

impl DemandDecayPolicy {
    /// Create a policy and admit the first window of demand.
    pub fn new(id: CampaignId, catalog: TaskCatalog, interval_secs: i64, start_secs: i64) -> Self {
        let mut policy = Self {
            id,
            catalog,
            interval_secs,
            interest_map: InterestMap::new(),
        };
        let admitted = policy.admit(start_secs, start_secs + interval_secs);
        debug!(campaign = %id, admitted, "initial demand admitted");
        policy
    }

    /// Length of the admission window in seconds.
    pub fn interval_secs(&self) -> i64 {
        self.interval_secs
    }

    fn consume(&mut self, done: &TaskData) -> Result<bool, PolicyError> {
        let task = done.task();
        let Some(entry) = self.interest_map.get_mut(&task) else {
            warn!(
                campaign = %self.id,
                ?task,
                "completion for a task not in the interest map; skipping"
            );
            return Ok(false);
        };
        let interest = settle(entry.interest - done.interest);
        let duration_secs = settle(entry.duration_secs - done.duration_secs);
        if interest < 0.0 || duration_secs < 0.0 {
            return Err(PolicyError::ConsistencyViolation {
                reason: format!(
                    "residual demand went negative at {} (interest {}, duration {}s)",
                    task.location, interest, duration_secs
                ),
            });
        }
        if interest == 0.0 {
            self.interest_map.remove(&task);
        } else {
            entry.interest = interest;
            entry.duration_secs = duration_secs;
        }
        Ok(true)
    }

    fn expire(&mut self, now: i64) -> usize {
        let before = self.interest_map.len();
        self.interest_map
            .retain(|task, _| !matches!(task.request_time, Some(rt) if rt < now));
        before - self.interest_map.len()
    }

    fn admit(&mut self, start: i64, end: i64) -> usize {
        let mut admitted = 0;
        for t in self.catalog.requested_within(start, end) {
            let task = t.task();
            match self.interest_map.get_mut(&task) {
                Some(entry) => {
                    entry.interest += t.interest;
                    entry.duration_secs += t.duration_secs;
                }
                None => {
                    self.interest_map.insert(task, t.clone());
                }
            }
            admitted += 1;
        }
        admitted
    }
}

impl CampaignPolicy for DemandDecayPolicy {
    fn id(&self) -> CampaignId {
        self.id
    }

    fn name(&self) -> &str {
        "demand-decay"
    }

    fn interest_map(&self) -> &InterestMap {
        &self.interest_map
    }

    fn update(&mut self, completed: &[TaskData], now: i64) -> Result<(), PolicyError> {
        let mut counts = CycleCounts::default();
        for done in completed {
            if self.consume(done)? {
                counts.consumed += 1;
            } else {
                counts.skipped += 1;
            }
        }
        counts.expired = self.expire(now);
        counts.admitted = self.admit(now - self.interval_secs, now);
        debug!(
            campaign = %self.id,
            consumed = counts.consumed,
            skipped = counts.skipped,
            expired = counts.expired,
            admitted = counts.admitted,
            outstanding = self.interest_map.len(),
            "demand cycle"
        );
        Ok(())
    }
}

impl fmt::Debug for DemandDecayPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DemandDecayPolicy")
            .field("id", &self.id)
            .field("interval_secs", &self.interval_secs)
            .field("catalog", &self.catalog.len())
            .field("interest_map", &self.interest_map.len())
            .finish()
    }
}
