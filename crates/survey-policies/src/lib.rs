//! Task-selection policies for adaptive sampling campaigns.
//!
//! Each policy implements [`CampaignPolicy`](survey_policy::CampaignPolicy)
//! for one campaign type:
//!
//! | Policy | Interest map | Driven by |
//! |--------|--------------|-----------|
//! | [`StagedPolicy`] | rebuilt each cycle | coverage → staleness → local dispersion |
//! | [`EstimatorPolicy`] | rebuilt each cycle | external uncertainty estimator |
//! | [`DemandDecayPolicy`] | patched each cycle | residual demand with expiry |
//! | [`OneShotPolicy`] | filled once, drained | completions |
//! | [`PeriodicPolicy`] | refilled on an interval | completions + clock |
//! | [`ReplenishPolicy`] | refilled when drained | completions |
//! | [`ScatterPolicy`] | regenerated each cycle | seeded random placement |

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod demand;
pub mod estimator;
pub mod oneshot;
pub mod periodic;
pub mod replenish;
pub mod scatter;
pub mod staged;

pub use demand::DemandDecayPolicy;
pub use estimator::{EstimatorConfig, EstimatorPolicy};
pub use oneshot::OneShotPolicy;
pub use periodic::PeriodicPolicy;
pub use replenish::ReplenishPolicy;
pub use scatter::{ScatterConfig, ScatterPolicy};
pub use staged::{Stage, StagedConfig, StagedPolicy};
