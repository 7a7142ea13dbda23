//! Bridge to external uncertainty estimators.
//!
//! Policies that delegate uncertainty estimation (rather than computing
//! dispersion locally) package their measurements and candidate query
//! points into an [`EstimateRequest`] and hand it to an
//! [`UncertaintyEstimator`]. The production implementation,
//! [`SubprocessEstimator`], runs a statistical model (typically a
//! Gaussian-process regressor) as a separate process and exchanges JSON
//! over its standard streams.
//!
//! # Wire protocol
//!
//! Request, written to the estimator's stdin:
//!
//! ```json
//! {
//!   "measurements": [{"location": {"latitude": 1.0, "longitude": 2.0}, "value": 17.5}],
//!   "queries": [{"latitude": 1.0, "longitude": 2.0}],
//!   "threshold": 0.05,
//!   "time": 600
//! }
//! ```
//!
//! Response, read from stdout: a JSON array of locations whose estimated
//! confidence is below `threshold`. A non-zero exit status or any other
//! output is an error.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod estimator;
pub mod request;
pub mod subprocess;

pub use estimator::UncertaintyEstimator;
pub use request::{EstimateRequest, MeasuredValue};
pub use subprocess::SubprocessEstimator;
