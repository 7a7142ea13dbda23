//! Task identities and their mutable payloads.

use serde::{Deserialize, Serialize};

use crate::id::CampaignId;
use crate::location::Location;

/// Identity of a sampling task: `(campaign, location, request time)`.
///
/// Identity alone determines interest-map key equality. Everything the
/// policy mutates (residual interest, remaining duration) lives in the
/// [`TaskData`] payload.
///
/// # Examples
///
/// ```
/// use survey_core::{CampaignId, Location, Task};
///
/// let a = Task::new(CampaignId(1), Location::new(1.0, 2.0), Some(60));
/// let b = Task::new(CampaignId(1), Location::new(1.0, 2.0), None);
/// assert_ne!(a, b);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Task {
    /// Owning campaign.
    pub campaign: CampaignId,
    /// Where the sample must be taken.
    pub location: Location,
    /// When the task was requested, in campaign seconds, if timed.
    pub request_time: Option<i64>,
}

impl Task {
    /// Construct a task identity.
    pub fn new(campaign: CampaignId, location: Location, request_time: Option<i64>) -> Self {
        Self {
            campaign,
            location,
            request_time,
        }
    }
}

/// Payload attached to a [`Task`] identity.
///
/// Catalog entries, interest-map values and completion reports all use
/// this type. On completion reports, `interest` and `duration_secs` are
/// the amounts the worker consumed, and `fulfill_time` is set by the host.
///
/// The serialized field names follow the catalog file format
/// (`app_id`, `task_time_seconds`, ...).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskData {
    /// Owning campaign.
    #[serde(rename = "app_id")]
    pub campaign: CampaignId,
    /// Sampling location.
    pub location: Location,
    /// Optional second location (e.g. a drop-off point).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<Location>,
    /// Request time in campaign seconds, if the task is timed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_time: Option<i64>,
    /// Time at which a worker fulfilled the task. Set by the host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fulfill_time: Option<i64>,
    /// Residual interest weight.
    #[serde(default)]
    pub interest: f64,
    /// Remaining required sampling duration, in seconds.
    #[serde(default, rename = "task_time_seconds")]
    pub duration_secs: f64,
    /// Completion deadline in campaign seconds, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<i64>,
}

impl TaskData {
    /// A task at `location` with unit interest and no timing information.
    pub fn new(campaign: CampaignId, location: Location) -> Self {
        Self {
            campaign,
            location,
            destination: None,
            request_time: None,
            fulfill_time: None,
            interest: 1.0,
            duration_secs: 0.0,
            deadline: None,
        }
    }

    /// Set the request time.
    pub fn with_request_time(mut self, time: i64) -> Self {
        self.request_time = Some(time);
        self
    }

    /// Set the residual interest weight.
    pub fn with_interest(mut self, interest: f64) -> Self {
        self.interest = interest;
        self
    }

    /// Set the required sampling duration.
    pub fn with_duration(mut self, secs: f64) -> Self {
        self.duration_secs = secs;
        self
    }

    /// Mark the task as fulfilled at `time`.
    pub fn fulfilled_at(mut self, time: i64) -> Self {
        self.fulfill_time = Some(time);
        self
    }

    /// The identity of this task, including its request time.
    pub fn task(&self) -> Task {
        Task::new(self.campaign, self.location, self.request_time)
    }

    /// The identity of this task with the request time dropped.
    ///
    /// Used by policies whose tasks recur at a location regardless of
    /// when they were requested.
    pub fn untimed_task(&self) -> Task {
        Task::new(self.campaign, self.location, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_ignores_payload() {
        let loc = Location::new(3.0, 4.0);
        let a = TaskData::new(CampaignId(2), loc)
            .with_request_time(10)
            .with_interest(5.0);
        let b = TaskData::new(CampaignId(2), loc)
            .with_request_time(10)
            .with_duration(99.0);
        assert_eq!(a.task(), b.task());
        assert_ne!(a, b);
    }

    #[test]
    fn untimed_identity_drops_request_time() {
        let t = TaskData::new(CampaignId(1), Location::new(0.0, 0.0)).with_request_time(5);
        assert_eq!(t.untimed_task().request_time, None);
        assert_eq!(t.task().request_time, Some(5));
    }

    #[test]
    fn parses_catalog_record() {
        let json = r#"{
            "app_id": 4,
            "location": {"latitude": 42.1234567, "longitude": -71.0},
            "request_time": 120,
            "interest": 2.0,
            "task_time_seconds": 15.0
        }"#;
        let t: TaskData = serde_json::from_str(json).unwrap();
        assert_eq!(t.campaign, CampaignId(4));
        assert_eq!(t.location, Location::new(42.123457, -71.0));
        assert_eq!(t.request_time, Some(120));
        assert_eq!(t.fulfill_time, None);
        assert_eq!(t.interest, 2.0);
        assert_eq!(t.duration_secs, 15.0);
    }
}
