//! The [`UncertaintyEstimator`] trait.

use survey_core::{EstimatorError, Location};

use crate::request::EstimateRequest;

/// Scores candidate locations and returns the ones that need sampling.
///
/// Implementations must not retry internally: any failure is reported to
/// the policy, which surfaces it to the host as fatal.
///
/// # Examples
///
/// ```
/// use survey_core::{EstimatorError, Location};
/// use survey_estimator::{EstimateRequest, UncertaintyEstimator};
///
/// /// Flags every query.
/// struct Everything;
///
/// impl UncertaintyEstimator for Everything {
///     fn estimate(&self, request: &EstimateRequest) -> Result<Vec<Location>, EstimatorError> {
///         Ok(request.queries.clone())
///     }
/// }
///
/// let req = EstimateRequest { queries: vec![Location::new(0.0, 0.0)], ..Default::default() };
/// assert_eq!(Everything.estimate(&req).unwrap().len(), 1);
/// ```
pub trait UncertaintyEstimator: Send {
    /// Return the query locations whose estimated confidence is below
    /// `request.threshold`.
    fn estimate(&self, request: &EstimateRequest) -> Result<Vec<Location>, EstimatorError>;
}

impl<E: UncertaintyEstimator + ?Sized> UncertaintyEstimator for Box<E> {
    fn estimate(&self, request: &EstimateRequest) -> Result<Vec<Location>, EstimatorError> {
        (**self).estimate(request)
    }
}
