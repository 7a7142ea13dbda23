//! Estimator request document.

use serde::{Deserialize, Serialize};
use survey_core::Location;

/// A value observed at a location, as sent to the estimator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeasuredValue {
    /// Where the value was observed.
    pub location: Location,
    /// The observed value.
    pub value: f64,
}

/// Everything an estimator needs for one sampling round.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EstimateRequest {
    /// All measurements accumulated so far, in arrival order.
    pub measurements: Vec<MeasuredValue>,
    /// Candidate locations to score.
    pub queries: Vec<Location>,
    /// Confidence threshold; queries scoring below it are returned.
    pub threshold: f64,
    /// Campaign time of the round, in seconds.
    pub time: i64,
}

impl EstimateRequest {
    /// Encode as the JSON document written to the estimator.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
