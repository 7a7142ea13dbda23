//! Campaign configuration, validation, and error types.
//!
//! [`CampaignConfig`] is the deserialized form of a campaign's JSON
//! configuration. [`validate()`](CampaignConfig::validate) checks
//! structural invariants without touching the filesystem;
//! [`build()`](CampaignConfig::build) validates, loads the catalog and
//! ground truth, and constructs the policy.

use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use survey_catalog::{CatalogError, GroundTruth, TaskCatalog};
use survey_core::CampaignId;
use survey_estimator::SubprocessEstimator;
use survey_policies::{
    DemandDecayPolicy, EstimatorConfig, EstimatorPolicy, OneShotPolicy, PeriodicPolicy,
    ReplenishPolicy, ScatterConfig, ScatterPolicy, StagedConfig, StagedPolicy,
};
use survey_policy::CampaignPolicy;
use tracing::info;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while loading, validating, or building a campaign.
#[derive(Debug)]
pub enum ConfigError {
    /// The configuration document could not be decoded.
    Parse {
        /// Decoder error message.
        reason: String,
    },
    /// The configuration file could not be read.
    Io {
        /// The file being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },
    /// An interval or validity window is zero or negative.
    InvalidInterval {
        /// The offending option.
        field: &'static str,
        /// The configured value.
        value: i64,
    },
    /// A selection size is zero, so every cycle would request nothing.
    ZeroSelection {
        /// The offending option.
        field: &'static str,
    },
    /// The estimator confidence threshold is not a positive finite number.
    InvalidThreshold {
        /// The configured value.
        value: f64,
    },
    /// A task duration is not a positive finite number.
    InvalidDuration {
        /// The configured value.
        value: f64,
    },
    /// The scatter square is malformed.
    InvalidScatter {
        /// Description of the problem.
        reason: String,
    },
    /// The estimator command has no program.
    EmptyProgram,
    /// A policy that rebuilds from its catalog was given an empty one.
    EmptyCatalog {
        /// The catalog file.
        path: PathBuf,
    },
    /// The catalog or ground truth failed to load.
    Catalog(CatalogError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse { reason } => write!(f, "invalid campaign config: {reason}"),
            Self::Io { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            Self::InvalidInterval { field, value } => {
                write!(f, "{field} must be at least 1 second, got {value}")
            }
            Self::ZeroSelection { field } => write!(f, "{field} must be at least 1"),
            Self::InvalidThreshold { value } => {
                write!(f, "confidence_threshold must be positive and finite, got {value}")
            }
            Self::InvalidDuration { value } => {
                write!(f, "task_time_seconds must be positive and finite, got {value}")
            }
            Self::InvalidScatter { reason } => write!(f, "invalid scatter square: {reason}"),
            Self::EmptyProgram => write!(f, "estimator program is empty"),
            Self::EmptyCatalog { path } => write!(f, "task catalog {} is empty", path.display()),
            Self::Catalog(e) => write!(f, "catalog: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Catalog(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CatalogError> for ConfigError {
    fn from(e: CatalogError) -> Self {
        Self::Catalog(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse {
            reason: e.to_string(),
        }
    }
}

// ── EstimatorCommand ───────────────────────────────────────────────

/// How to launch the external uncertainty estimator.
///
/// Defaults to `python3 gp.py` in the current directory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EstimatorCommand {
    /// Program to execute.
    pub program: String,
    /// Arguments passed to the program.
    #[serde(default)]
    pub args: Vec<String>,
    /// Working directory for the child process.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

impl Default for EstimatorCommand {
    fn default() -> Self {
        Self {
            program: "python3".to_string(),
            args: vec!["gp.py".to_string()],
            working_dir: None,
        }
    }
}

impl EstimatorCommand {
    fn to_estimator(&self) -> SubprocessEstimator {
        let estimator =
            SubprocessEstimator::new(self.program.as_str()).args(self.args.iter().cloned());
        match &self.working_dir {
            Some(dir) => estimator.working_dir(dir.clone()),
            None => estimator,
        }
    }
}

// ── PolicyOptions ──────────────────────────────────────────────────

fn default_staged_task_time() -> f64 {
    25.0
}

fn default_estimator_task_time() -> f64 {
    20.0
}

/// Variant-specific options, tagged by `"kind"`.
///
/// ```json
/// { "kind": "demand_decay", "task_path": "rides.json", "update_interval": 300 }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicyOptions {
    /// [`StagedPolicy`]: coverage, renewal, then local dispersion.
    Staged {
        /// Task catalog file.
        task_path: PathBuf,
        /// Ground-truth file.
        ground_truth_path: PathBuf,
        /// Number of cold-start coverage rounds.
        num_samples_init: usize,
        /// Seconds a sample stays fresh.
        sample_valid_sec: i64,
        /// Locations requested per refinement cycle.
        num_samples_uncertain: usize,
        /// Duration applied to every catalog task. Default: 25.
        #[serde(default = "default_staged_task_time")]
        task_time_seconds: f64,
    },
    /// [`EstimatorPolicy`]: locations flagged by an external estimator.
    Estimator {
        /// Task catalog file.
        task_path: PathBuf,
        /// Ground-truth file, read as time-invariant.
        ground_truth_path: PathBuf,
        /// Threshold passed to the estimator.
        confidence_threshold: f64,
        /// Duration applied to every catalog task. Default: 20.
        #[serde(default = "default_estimator_task_time")]
        task_time_seconds: f64,
        /// Estimator process to launch.
        #[serde(default)]
        estimator: EstimatorCommand,
    },
    /// [`DemandDecayPolicy`]: residual demand with expiry.
    DemandDecay {
        /// Task catalog file.
        task_path: PathBuf,
        /// Admission window length in seconds.
        update_interval: i64,
        /// Start of the first admission window. Default: 0.
        #[serde(default)]
        start_sec: i64,
    },
    /// [`OneShotPolicy`]: whole catalog released once.
    OneShot {
        /// Task catalog file.
        task_path: PathBuf,
        /// Cycle time at which the catalog is released. Default: 0.
        #[serde(default)]
        start_sec: i64,
    },
    /// [`PeriodicPolicy`]: whole catalog re-requested on an interval.
    Periodic {
        /// Task catalog file.
        task_path: PathBuf,
        /// Refill period in seconds.
        interval_sec: i64,
    },
    /// [`ReplenishPolicy`]: whole catalog re-requested once drained.
    Replenish {
        /// Task catalog file.
        task_path: PathBuf,
    },
    /// [`ScatterPolicy`]: random tasks redrawn every cycle.
    Scatter {
        /// South-west corner as `[latitude, longitude]`.
        corner: [f64; 2],
        /// Side length of the square, in degrees.
        spread: f64,
        /// Tasks drawn per cycle.
        num: usize,
        /// Base RNG seed. Default: 0.
        #[serde(default)]
        seed: u64,
    },
}

impl PolicyOptions {
    /// The `"kind"` tag of this variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Staged { .. } => "staged",
            Self::Estimator { .. } => "estimator",
            Self::DemandDecay { .. } => "demand_decay",
            Self::OneShot { .. } => "one_shot",
            Self::Periodic { .. } => "periodic",
            Self::Replenish { .. } => "replenish",
            Self::Scatter { .. } => "scatter",
        }
    }
}

// ── CampaignConfig ─────────────────────────────────────────────────

/// Complete configuration for one campaign.
///
/// # Examples
///
/// ```
/// use survey_engine::{CampaignConfig, PolicyOptions};
///
/// let config = CampaignConfig::from_json_str(
///     r#"{ "campaign_id": 4, "policy": { "kind": "replenish", "task_path": "iperf.json" } }"#,
/// )
/// .unwrap();
/// assert_eq!(config.policy.kind(), "replenish");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CampaignConfig {
    /// The campaign served by the policy.
    pub campaign_id: CampaignId,
    /// Which policy to run, and its options.
    pub policy: PolicyOptions,
}

impl CampaignConfig {
    /// Decode a configuration from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and decode a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Check structural invariants. Performs no I/O.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.policy {
            PolicyOptions::Staged {
                sample_valid_sec,
                num_samples_uncertain,
                task_time_seconds,
                ..
            } => {
                if *sample_valid_sec < 1 {
                    return Err(ConfigError::InvalidInterval {
                        field: "sample_valid_sec",
                        value: *sample_valid_sec,
                    });
                }
                if *num_samples_uncertain == 0 {
                    return Err(ConfigError::ZeroSelection {
                        field: "num_samples_uncertain",
                    });
                }
                check_duration(*task_time_seconds)
            }
            PolicyOptions::Estimator {
                confidence_threshold,
                task_time_seconds,
                estimator,
                ..
            } => {
                if !confidence_threshold.is_finite() || *confidence_threshold <= 0.0 {
                    return Err(ConfigError::InvalidThreshold {
                        value: *confidence_threshold,
                    });
                }
                if estimator.program.trim().is_empty() {
                    return Err(ConfigError::EmptyProgram);
                }
                check_duration(*task_time_seconds)
            }
            PolicyOptions::DemandDecay {
                update_interval, ..
            } => check_interval("update_interval", *update_interval),
            PolicyOptions::Periodic { interval_sec, .. } => {
                check_interval("interval_sec", *interval_sec)
            }
            PolicyOptions::OneShot { .. } | PolicyOptions::Replenish { .. } => Ok(()),
            PolicyOptions::Scatter {
                corner,
                spread,
                num,
                ..
            } => {
                if *num == 0 {
                    return Err(ConfigError::ZeroSelection { field: "num" });
                }
                if !spread.is_finite() || *spread <= 0.0 {
                    return Err(ConfigError::InvalidScatter {
                        reason: format!("spread must be finite and positive, got {spread}"),
                    });
                }
                if !corner.iter().all(|c| c.is_finite()) {
                    return Err(ConfigError::InvalidScatter {
                        reason: format!("corner must be finite, got {corner:?}"),
                    });
                }
                Ok(())
            }
        }
    }

    /// Validate, load collaborators, and construct the policy.
    pub fn build(&self) -> Result<Box<dyn CampaignPolicy>, ConfigError> {
        self.validate()?;
        let id = self.campaign_id;
        let policy: Box<dyn CampaignPolicy> = match &self.policy {
            PolicyOptions::Staged {
                task_path,
                ground_truth_path,
                num_samples_init,
                sample_valid_sec,
                num_samples_uncertain,
                task_time_seconds,
            } => {
                let catalog = non_empty_catalog(task_path)?.with_duration(*task_time_seconds);
                let ground_truth = GroundTruth::from_path(ground_truth_path)?;
                Box::new(StagedPolicy::new(
                    id,
                    catalog,
                    Arc::new(ground_truth),
                    StagedConfig {
                        num_samples_init: *num_samples_init,
                        sample_valid_secs: *sample_valid_sec,
                        num_samples_uncertain: *num_samples_uncertain,
                    },
                ))
            }
            PolicyOptions::Estimator {
                task_path,
                ground_truth_path,
                confidence_threshold,
                task_time_seconds,
                estimator,
            } => {
                let catalog = non_empty_catalog(task_path)?.with_duration(*task_time_seconds);
                let ground_truth = GroundTruth::from_path(ground_truth_path)?;
                Box::new(EstimatorPolicy::new(
                    id,
                    catalog,
                    Arc::new(ground_truth),
                    Box::new(estimator.to_estimator()),
                    EstimatorConfig {
                        confidence_threshold: *confidence_threshold,
                    },
                ))
            }
            PolicyOptions::DemandDecay {
                task_path,
                update_interval,
                start_sec,
            } => Box::new(DemandDecayPolicy::new(
                id,
                TaskCatalog::from_path(task_path)?,
                *update_interval,
                *start_sec,
            )),
            PolicyOptions::OneShot {
                task_path,
                start_sec,
            } => Box::new(OneShotPolicy::new(
                id,
                TaskCatalog::from_path(task_path)?,
                *start_sec,
            )),
            PolicyOptions::Periodic {
                task_path,
                interval_sec,
            } => Box::new(PeriodicPolicy::new(
                id,
                TaskCatalog::from_path(task_path)?,
                *interval_sec,
            )),
            PolicyOptions::Replenish { task_path } => Box::new(ReplenishPolicy::new(
                id,
                TaskCatalog::from_path(task_path)?,
            )),
            PolicyOptions::Scatter {
                corner,
                spread,
                num,
                seed,
            } => Box::new(ScatterPolicy::new(
                id,
                ScatterConfig {
                    corner: *corner,
                    spread: *spread,
                    count: *num,
                    seed: *seed,
                },
            )),
        };
        info!(
            campaign = %id,
            policy = policy.name(),
            tasks = policy.interest_map().len(),
            "campaign policy built"
        );
        Ok(policy)
    }
}

fn check_interval(field: &'static str, value: i64) -> Result<(), ConfigError> {
    if value < 1 {
        return Err(ConfigError::InvalidInterval { field, value });
    }
    Ok(())
}

fn check_duration(value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::InvalidDuration { value });
    }
    Ok(())
}

fn non_empty_catalog(path: &Path) -> Result<TaskCatalog, ConfigError> {
    let catalog = TaskCatalog::from_path(path)?;
    if catalog.is_empty() {
        return Err(ConfigError::EmptyCatalog {
            path: path.to_path_buf(),
        });
    }
    Ok(catalog)
}
