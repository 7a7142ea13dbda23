//! Error types shared by campaign policies.
//!
//! Every variant here is fatal to the current cycle: the policy makes no
//! attempt at local recovery and the host decides whether to abort the
//! campaign run. Recoverable conditions (stale completion reports) are
//! logged by the policies and never surface as errors.

use std::error::Error;
use std::fmt;

/// Errors returned by a policy's `update()`.
#[derive(Clone, Debug, PartialEq)]
pub enum PolicyError {
    /// Runtime behavior contradicts the static inputs: more work was
    /// reported than was ever requested, or a rebuilt interest map came
    /// out empty.
    ConsistencyViolation {
        /// Description of the violated invariant.
        reason: String,
    },
    /// A completed task could not be resolved against the ground truth.
    NotFound {
        /// What was looked up.
        what: String,
    },
    /// The external uncertainty estimator failed.
    EstimatorFailure(EstimatorError),
}

impl fmt::Display for PolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConsistencyViolation { reason } => {
                write!(f, "consistency violation: {reason}")
            }
            Self::NotFound { what } => write!(f, "not found: {what}"),
            Self::EstimatorFailure(e) => write!(f, "estimator failure: {e}"),
        }
    }
}

impl Error for PolicyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EstimatorFailure(e) => Some(e),
            _ => None,
        }
    }
}

impl From<EstimatorError> for PolicyError {
    fn from(e: EstimatorError) -> Self {
        Self::EstimatorFailure(e)
    }
}

/// Errors from an uncertainty estimator invocation.
///
/// None of these are retried; a malformed or crashing estimator
/// invalidates the sampling round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EstimatorError {
    /// The request could not be encoded.
    Encode {
        /// Encoder error message.
        reason: String,
    },
    /// The estimator process could not be started.
    Spawn {
        /// Program that failed to start.
        program: String,
        /// OS error message.
        reason: String,
    },
    /// Writing the request or reading the response failed.
    Io {
        /// Description of the failed transfer.
        reason: String,
    },
    /// The estimator exited unsuccessfully.
    ExitStatus {
        /// Exit code, or `None` if killed by a signal.
        code: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },
    /// The estimator's output was not a list of locations.
    MalformedResponse {
        /// Decoder error message.
        reason: String,
    },
}

impl fmt::Display for EstimatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode { reason } => write!(f, "cannot encode request: {reason}"),
            Self::Spawn { program, reason } => {
                write!(f, "cannot start '{program}': {reason}")
            }
            Self::Io { reason } => write!(f, "i/o error: {reason}"),
            Self::ExitStatus { code, stderr } => {
                match code {
                    Some(c) => write!(f, "exited with status {c}")?,
                    None => write!(f, "terminated by signal")?,
                }
                if !stderr.is_empty() {
                    write!(f, ": {}", stderr.trim_end())?;
                }
                Ok(())
            }
            Self::MalformedResponse { reason } => write!(f, "malformed response: {reason}"),
        }
    }
}

impl Error for EstimatorError {}
