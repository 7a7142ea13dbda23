//! The static list of candidate sampling tasks for a campaign.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use indexmap::IndexSet;
use survey_core::{Location, TaskData};
use tracing::debug;

use crate::error::CatalogError;

/// Candidate tasks for one campaign, in file order.
///
/// Coordinates are normalized to 1e-6 degrees as they are parsed, so
/// catalog locations compare equal to locations reported by workers.
///
/// # Examples
///
/// ```
/// use survey_catalog::TaskCatalog;
///
/// let json = r#"[
///     {"app_id": 1, "location": {"latitude": 42.0, "longitude": -71.0}, "request_time": 30,
///      "interest": 1.0, "task_time_seconds": 10.0},
///     {"app_id": 1, "location": {"latitude": 42.1, "longitude": -71.1}, "request_time": 90,
///      "interest": 2.0, "task_time_seconds": 10.0}
/// ]"#;
/// let catalog = TaskCatalog::from_reader(json.as_bytes()).unwrap();
/// assert_eq!(catalog.len(), 2);
/// assert_eq!(catalog.requested_within(0, 60).count(), 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskCatalog {
    tasks: Vec<TaskData>,
}

impl TaskCatalog {
    /// Wrap an in-memory task list.
    pub fn from_tasks(tasks: Vec<TaskData>) -> Self {
        Self { tasks }
    }

    /// Parse a JSON array of task records.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let tasks: Vec<TaskData> = serde_json::from_reader(reader)?;
        Ok(Self { tasks })
    }

    /// Load a JSON task file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| CatalogError::Io {
            path: Some(path.to_path_buf()),
            source,
        })?;
        let catalog = Self::from_reader(BufReader::new(file))?;
        debug!(path = %path.display(), tasks = catalog.len(), "loaded task catalog");
        Ok(catalog)
    }

    /// Override every task's required sampling duration.
    pub fn with_duration(mut self, secs: f64) -> Self {
        for task in &mut self.tasks {
            task.duration_secs = secs;
        }
        self
    }

    /// All tasks in file order.
    pub fn tasks(&self) -> &[TaskData] {
        &self.tasks
    }

    /// Iterate over tasks in file order.
    pub fn iter(&self) -> std::slice::Iter<'_, TaskData> {
        self.tasks.iter()
    }

    /// Number of tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the catalog has no tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Distinct task locations, in order of first appearance.
    pub fn locations(&self) -> IndexSet<Location> {
        self.tasks.iter().map(|t| t.location).collect()
    }

    /// Tasks whose request time falls in `(start, end]`.
    ///
    /// Tasks without a request time are never in a window.
    pub fn requested_within(&self, start: i64, end: i64) -> impl Iterator<Item = &TaskData> + '_ {
        self.tasks
            .iter()
            .filter(move |t| matches!(t.request_time, Some(rt) if rt > start && rt <= end))
    }
}

impl<'a> IntoIterator for &'a TaskCatalog {
    type Item = &'a TaskData;
    type IntoIter = std::slice::Iter<'a, TaskData>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}
