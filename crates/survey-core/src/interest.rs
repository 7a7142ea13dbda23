//! The [`InterestMap`]: the set of tasks a policy wants sampled next.

use indexmap::IndexMap;

use crate::task::{Task, TaskData};

/// Mapping from task identity to payload, in insertion order.
///
/// At most one entry exists per identity; absence means "not currently
/// requested". Iteration order is the order entries were first inserted,
/// which keeps snapshots reproducible across runs. Removal preserves the
/// relative order of the remaining entries.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InterestMap {
    entries: IndexMap<Task, TaskData>,
}

impl InterestMap {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty map with room for `n` entries.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(n),
        }
    }

    /// Insert or replace the payload for `task`, returning the old payload.
    pub fn insert(&mut self, task: Task, data: TaskData) -> Option<TaskData> {
        self.entries.insert(task, data)
    }

    /// Payload for `task`, if requested.
    pub fn get(&self, task: &Task) -> Option<&TaskData> {
        self.entries.get(task)
    }

    /// Mutable payload for `task`, if requested.
    pub fn get_mut(&mut self, task: &Task) -> Option<&mut TaskData> {
        self.entries.get_mut(task)
    }

    /// Remove `task`, returning its payload.
    pub fn remove(&mut self, task: &Task) -> Option<TaskData> {
        self.entries.shift_remove(task)
    }

    /// Whether `task` is currently requested.
    pub fn contains(&self, task: &Task) -> bool {
        self.entries.contains_key(task)
    }

    /// Number of requested tasks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is requested.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keep only the entries for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&Task, &TaskData) -> bool) {
        self.entries.retain(|task, data| keep(task, data));
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterate over `(identity, payload)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Task, &TaskData)> + '_ {
        self.entries.iter()
    }

    /// Iterate over identities in insertion order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> + '_ {
        self.entries.keys()
    }
}

impl FromIterator<(Task, TaskData)> for InterestMap {
    fn from_iter<I: IntoIterator<Item = (Task, TaskData)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a InterestMap {
    type Item = (&'a Task, &'a TaskData);
    type IntoIter = indexmap::map::Iter<'a, Task, TaskData>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
