//! Survey: adaptive task-selection policies for spatiotemporal sampling
//! campaigns.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all survey sub-crates. For most users, adding `survey` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use survey::prelude::*;
//!
//! // Three candidate locations, each requested as an untimed task.
//! let app = CampaignId(1);
//! let tasks: Vec<TaskData> = [(42.36, -71.09), (42.37, -71.08), (42.38, -71.07)]
//!     .into_iter()
//!     .map(|(lat, lon)| TaskData::new(app, Location::new(lat, lon)))
//!     .collect();
//! let catalog = TaskCatalog::from_tasks(tasks.clone());
//!
//! // Every location reads 7.5 at t=60.
//! let truth = GroundTruth::from_entries(
//!     tasks.iter().map(|t| (MeasurementKey::new(t.location, 60), 7.5)),
//! );
//!
//! let policy = StagedPolicy::new(
//!     app,
//!     catalog,
//!     Arc::new(truth),
//!     StagedConfig { num_samples_init: 1, sample_valid_secs: 600, num_samples_uncertain: 2 },
//! );
//! let mut campaign = LockstepCampaign::new(Box::new(policy));
//!
//! // Two of three locations report back; only the third is still wanted.
//! let done: Vec<TaskData> = tasks[..2].iter().map(|t| t.clone().fulfilled_at(60)).collect();
//! let result = campaign.step(&done, 60).unwrap();
//! assert_eq!(result.interest_map.len(), 1);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `survey-core` | Locations, tasks, interest maps, errors |
//! | [`policy`] | `survey-policy` | Policy trait, measurement store, selection helpers |
//! | [`policies`] | `survey-policies` | The policy variants |
//! | [`estimator`] | `survey-estimator` | Uncertainty estimator bridge |
//! | [`catalog`] | `survey-catalog` | Task catalog and ground-truth loaders |
//! | [`engine`] | `survey-engine` | Configuration and the lockstep driver |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core value types and errors (`survey-core`).
pub use survey_core as types;

/// The policy contract and shared selection machinery (`survey-policy`).
///
/// Implement [`policy::CampaignPolicy`] to add a new campaign type.
pub use survey_policy as policy;

/// Policy variants (`survey-policies`).
pub use survey_policies as policies;

/// External uncertainty estimator bridge (`survey-estimator`).
///
/// [`estimator::SubprocessEstimator`] runs an estimator program over
/// stdin/stdout JSON.
pub use survey_estimator as estimator;

/// Task catalog and ground-truth loaders (`survey-catalog`).
pub use survey_catalog as catalog;

/// Campaign configuration and the lockstep driver (`survey-engine`).
pub use survey_engine as engine;

/// Common imports for typical survey usage.
///
/// ```rust
/// use survey::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use survey_core::{
        CampaignId, GroundTruthSource, InterestMap, Location, MeasurementKey, Task, TaskData,
    };

    // Errors
    pub use survey_core::{EstimatorError, PolicyError};

    // Policy contract
    pub use survey_policy::{CampaignPolicy, MeasurementStore};

    // Policies
    pub use survey_policies::{
        DemandDecayPolicy, EstimatorConfig, EstimatorPolicy, OneShotPolicy, PeriodicPolicy,
        ReplenishPolicy, ScatterConfig, ScatterPolicy, Stage, StagedConfig, StagedPolicy,
    };

    // Estimator
    pub use survey_estimator::{EstimateRequest, SubprocessEstimator, UncertaintyEstimator};

    // Loaders
    pub use survey_catalog::{GroundTruth, TaskCatalog};

    // Engine
    pub use survey_engine::{
        CampaignConfig, ConfigError, CycleError, CycleMetrics, CycleResult, LockstepCampaign,
    };
}
