//! The [`CampaignPolicy`] trait.
//!
//! A policy turns a stream of completed tasks into the set of tasks the
//! campaign wants sampled next. The host scheduler drives it once per
//! scheduling cycle.

use survey_core::{CampaignId, InterestMap, PolicyError, TaskData};

/// Host-facing contract implemented by every policy variant.
///
/// # Contract
///
/// - `update()` is called exactly once per distinct `now`, with strictly
///   increasing times. Calling it twice for the same time double-counts
///   completions.
/// - `interest_map()` returns the snapshot produced by the most recent
///   `update()` (or by construction). Because `update()` takes
///   `&mut self`, a borrowed snapshot cannot be interleaved with a
///   rebuild; two reads between updates are identical.
/// - An `Err` from `update()` is fatal for the campaign: the policy
///   performs no local recovery and its state is unspecified afterwards.
///
/// # Object safety
///
/// This trait is object-safe; hosts hold policies as
/// `Box<dyn CampaignPolicy>`.
///
/// # Examples
///
/// ```
/// use survey_core::{CampaignId, InterestMap, Location, PolicyError, TaskData};
/// use survey_policy::CampaignPolicy;
///
/// /// Requests one fixed location forever.
/// struct Beacon {
///     map: InterestMap,
/// }
///
/// impl CampaignPolicy for Beacon {
///     fn id(&self) -> CampaignId { CampaignId(9) }
///     fn name(&self) -> &str { "beacon" }
///     fn interest_map(&self) -> &InterestMap { &self.map }
///     fn update(&mut self, _completed: &[TaskData], _now: i64) -> Result<(), PolicyError> {
///         Ok(())
///     }
/// }
///
/// let task = TaskData::new(CampaignId(9), Location::new(0.0, 0.0));
/// let map = [(task.task(), task)].into_iter().collect();
/// let beacon = Beacon { map };
/// assert_eq!(beacon.interest_map().len(), 1);
/// ```
pub trait CampaignPolicy: Send {
    /// The campaign this policy serves.
    fn id(&self) -> CampaignId;

    /// Short name of the policy variant, for logs and metrics.
    fn name(&self) -> &str;

    /// Tasks currently requested, as of the last `update()`.
    fn interest_map(&self) -> &InterestMap;

    /// Fold `completed` into the policy's state and refresh the interest
    /// map for the cycle ending at `now` (campaign seconds).
    fn update(&mut self, completed: &[TaskData], now: i64) -> Result<(), PolicyError>;
}
