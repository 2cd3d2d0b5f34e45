//! Clone outcome types.
//!
//! Every task produces exactly one [`CloneOutcome`]; a batch collects them
//! into a [`BatchResult`].

use std::collections::BTreeMap;

use super::task::CloneTask;

/// Terminal result of one clone task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloneOutcome {
    /// Clone finished; `attempts` counts the successful one
    Success { attempts: u32 },
    /// No attempt succeeded, or the task never ran
    Failure { reason: String, attempts_made: u32 },
}

impl CloneOutcome {
    pub fn failure(reason: impl Into<String>, attempts_made: u32) -> Self {
        CloneOutcome::Failure {
            reason: reason.into(),
            attempts_made,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CloneOutcome::Success { .. })
    }

    /// Number of clone attempts that were actually made.
    pub fn attempts(&self) -> u32 {
        match self {
            CloneOutcome::Success { attempts } => *attempts,
            CloneOutcome::Failure { attempts_made, .. } => *attempts_made,
        }
    }
}

/// A task paired with its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    pub task: CloneTask,
    pub outcome: CloneOutcome,
}

/// Outcomes of one batch, keyed by task submission index.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    reports: BTreeMap<usize, TaskReport>,
}

impl BatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of a task. Returns false if the task already had one.
    pub fn record(&mut self, task: CloneTask, outcome: CloneOutcome) -> bool {
        let index = task.index();
        if self.reports.contains_key(&index) {
            log::error!("Duplicate outcome for task {} ({}), keeping the first", index, task.source());
            return false;
        }
        self.reports.insert(index, TaskReport { task, outcome });
        true
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Look up the first task cloned into `local_name`.
    pub fn get(&self, local_name: &str) -> Option<&TaskReport> {
        self.reports.values().find(|r| r.task.local_name() == local_name)
    }

    pub fn by_index(&self, index: usize) -> Option<&TaskReport> {
        self.reports.get(&index)
    }

    /// Reports in submission order.
    pub fn iter(&self) -> impl Iterator<Item = &TaskReport> {
        self.reports.values()
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &TaskReport> {
        self.iter().filter(|r| r.outcome.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &TaskReport> {
        self.iter().filter(|r| !r.outcome.is_success())
    }

    pub fn success_count(&self) -> usize {
        self.succeeded().count()
    }

    pub fn failure_count(&self) -> usize {
        self.failed().count()
    }
}
