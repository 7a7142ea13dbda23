//! Campaign configuration and the lockstep cycle driver.
//!
//! A [`CampaignConfig`] names a campaign and the policy variant that serves
//! it; [`build()`](CampaignConfig::build) loads the catalog and ground
//! truth and returns a ready policy. [`LockstepCampaign`] wraps any
//! policy and drives it one scheduling cycle at a time.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod lockstep;
pub mod metrics;

pub use config::{CampaignConfig, ConfigError, EstimatorCommand, PolicyOptions};
pub use lockstep::{CycleError, CycleResult, LockstepCampaign};
pub use metrics::CycleMetrics;
