//! Test utilities and mock collaborators for survey development.
//!
//! Provides a mock [`GroundTruthSource`], canned and failing
//! [`UncertaintyEstimator`]s, and small catalog fixtures for building
//! test scenarios.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{completion, grid_locations, staged_catalog, timed_catalog};

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use survey_core::{EstimatorError, GroundTruthSource, Location, MeasurementKey};
use survey_estimator::{EstimateRequest, UncertaintyEstimator};

/// Mock implementation of [`GroundTruthSource`].
///
/// Backed by a `HashMap<MeasurementKey, f64>`. Pre-populate entries with
/// [`set`](MockGroundTruth::set), or use [`constant`](MockGroundTruth::constant)
/// to answer every lookup with the same value.
#[derive(Clone, Debug, Default)]
pub struct MockGroundTruth {
    values: HashMap<MeasurementKey, f64>,
    fallback: Option<f64>,
}

impl MockGroundTruth {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table that returns `value` for every key.
    pub fn constant(value: f64) -> Self {
        Self {
            values: HashMap::new(),
            fallback: Some(value),
        }
    }

    /// Pre-populate the value at `location` and `time`.
    pub fn set(&mut self, location: Location, time: i64, value: f64) {
        self.values.insert(MeasurementKey::new(location, time), value);
    }

    /// Builder form of [`set`](MockGroundTruth::set).
    pub fn with(mut self, location: Location, time: i64, value: f64) -> Self {
        self.set(location, time, value);
        self
    }
}

impl GroundTruthSource for MockGroundTruth {
    fn lookup(&self, key: &MeasurementKey) -> Option<f64> {
        self.values.get(key).copied().or(self.fallback)
    }
}

/// Returns a fixed location list on every call.
pub struct CannedEstimator {
    response: Vec<Location>,
}

impl CannedEstimator {
    pub fn new(response: Vec<Location>) -> Self {
        Self { response }
    }
}

impl UncertaintyEstimator for CannedEstimator {
    fn estimate(&self, _request: &EstimateRequest) -> Result<Vec<Location>, EstimatorError> {
        Ok(self.response.clone())
    }
}

/// Fails every call with a fixed error.
pub struct FailingEstimator {
    error: EstimatorError,
}

impl FailingEstimator {
    pub fn new(error: EstimatorError) -> Self {
        Self { error }
    }

    /// Fails as if the estimator process exited with `code`.
    pub fn exit_code(code: i32) -> Self {
        Self::new(EstimatorError::ExitStatus {
            code: Some(code),
            stderr: String::new(),
        })
    }
}

impl UncertaintyEstimator for FailingEstimator {
    fn estimate(&self, _request: &EstimateRequest) -> Result<Vec<Location>, EstimatorError> {
        Err(self.error.clone())
    }
}

/// Records every request and answers with a canned response.
///
/// The request log is shared: keep the handle from
/// [`requests`](RecordingEstimator::requests) before moving the estimator
/// into a policy, then inspect it after driving the policy.
pub struct RecordingEstimator {
    response: Vec<Location>,
    log: Arc<Mutex<Vec<EstimateRequest>>>,
}

impl RecordingEstimator {
    pub fn new(response: Vec<Location>) -> Self {
        Self {
            response,
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared handle to the request log.
    pub fn requests(&self) -> Arc<Mutex<Vec<EstimateRequest>>> {
        Arc::clone(&self.log)
    }
}

impl UncertaintyEstimator for RecordingEstimator {
    fn estimate(&self, request: &EstimateRequest) -> Result<Vec<Location>, EstimatorError> {
        self.log
            .lock()
            .map_err(|_| EstimatorError::Io {
                reason: "request log poisoned".to_string(),
            })?
            .push(request.clone());
        Ok(self.response.clone())
    }
}
