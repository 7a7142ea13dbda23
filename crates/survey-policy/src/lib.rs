//! Campaign policy trait, measurement store, and selection helpers.
//!
//! The [`CampaignPolicy`] trait is the host-facing contract every policy
//! variant implements. [`MeasurementStore`] keeps per-location sample
//! histories, and the [`select`] module holds the pure functions that turn
//! a set of target locations back into an [`InterestMap`](survey_core::InterestMap).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod policy;
pub mod select;
pub mod stats;
pub mod store;

pub use policy::CampaignPolicy;
pub use select::{rank_by_dispersion, rebuild_interest_map, undersampled};
pub use stats::RunningStats;
pub use store::{Measurement, MeasurementStore};
