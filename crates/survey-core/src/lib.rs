//! Core types and traits for adaptive sampling campaigns.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the workspace:
//! locations, task identities and payloads, the interest map,
//! error types, and the ground-truth lookup trait.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod interest;
pub mod location;
pub mod task;
pub mod traits;

pub use error::{EstimatorError, PolicyError};
pub use id::CampaignId;
pub use interest::InterestMap;
pub use location::{Location, COORD_SCALE};
pub use task::{Task, TaskData};
pub use traits::{GroundTruthSource, MeasurementKey};
