//! Batch clone orchestrator.
//!
//! Runs one retrying clone per source on a pool of at most `max_workers`
//! concurrent workers and collects exactly one outcome per source. A failing
//! or panicking worker only affects its own entry in the [`BatchResult`].

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::{Id, JoinError, JoinSet};

use super::git::CloneOperation;
use super::outcome::{BatchResult, CloneOutcome};
use super::retry::clone_with_retry;
use super::task::{CloneTask, CollisionPolicy, PlannedTask, plan_tasks};
use crate::error::{ClonehubError, Result};
use crate::progress::{NoopProgress, ProgressReporter};

/// Configuration for a batch clone.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Maximum clone sequences in flight at once
    pub max_workers: usize,
    /// Total attempts per task (0 = never attempt)
    pub max_retries: u32,
    /// Fixed wait between attempts of one task
    pub retry_delay: Duration,
    /// How duplicate local names are handled
    pub collision_policy: CollisionPolicy,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_workers: 5,
            max_retries: 5,
            retry_delay: Duration::from_secs(5),
            collision_policy: CollisionPolicy::default(),
        }
    }
}

impl BatchConfig {
    pub fn with_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    pub fn with_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }
}

/// Clones a list of sources into a fresh target directory.
pub struct BatchCloner {
    config: BatchConfig,
    op: Arc<dyn CloneOperation>,
    progress: Arc<dyn ProgressReporter>,
}

impl BatchCloner {
    /// Create a cloner with no progress display.
    pub fn new(op: Arc<dyn CloneOperation>, config: BatchConfig) -> Self {
        Self {
            config,
            op,
            progress: Arc::new(NoopProgress),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Clone every source into its own subdirectory of `target_dir`.
    ///
    /// Fails before any clone is attempted if `target_dir` already exists or
    /// the configuration is unusable. Individual clone failures never fail
    /// the batch; they are recorded in the returned result.
    pub async fn run(&self, sources: &[String], target_dir: &Path) -> Result<BatchResult> {
        if self.config.max_workers == 0 {
            return Err(ClonehubError::InvalidConfig("max_workers must be at least 1".to_string()));
        }
        create_target_dir(target_dir).await?;
        log::info!("Created {}", target_dir.display());

        let total = sources.len();
        let mut result = BatchResult::new();
        if total == 0 {
            log::info!("Nothing to clone");
            return Ok(result);
        }

        self.progress.start(total);
        let mut completed = 0;

        let semaphore = Arc::new(Semaphore::new(self.config.max_workers));
        let mut workers: JoinSet<CloneOutcome> = JoinSet::new();
        let mut in_flight: HashMap<Id, CloneTask> = HashMap::new();

        for planned in plan_tasks(sources, target_dir, self.config.collision_policy) {
            let task = match planned {
                PlannedTask::Ready(task) => task,
                PlannedTask::Rejected(task, reason) => {
                    log::warn!("Skipping {}: {}", task.source(), reason);
                    result.record(task, CloneOutcome::failure(reason, 0));
                    completed += 1;
                    self.progress.advance(completed, total);
                    continue;
                }
            };

            // Tasks start in submission order; keep collecting while the pool is full
            let permit = loop {
                tokio::select! {
                    permit = semaphore.clone().acquire_owned() => break permit,
                    Some(joined) = workers.join_next_with_id() => {
                        self.collect(joined, &mut in_flight, &mut result, &mut completed, total);
                    }
                }
            };
            let permit = match permit {
                Ok(permit) => permit,
                Err(e) => {
                    result.record(task, CloneOutcome::failure(format!("worker pool closed: {}", e), 0));
                    completed += 1;
                    self.progress.advance(completed, total);
                    continue;
                }
            };

            log::debug!("Dispatching {} to {}", task.source(), task.destination().display());
            let handle = workers.spawn(run_worker(
                self.op.clone(),
                task.clone(),
                permit,
                self.config.max_retries,
                self.config.retry_delay,
            ));
            in_flight.insert(handle.id(), task);
        }

        while let Some(joined) = workers.join_next_with_id().await {
            self.collect(joined, &mut in_flight, &mut result, &mut completed, total);
        }

        self.progress.finish();
        log::info!(
            "Batch finished: {} cloned, {} failed",
            result.success_count(),
            result.failure_count()
        );
        Ok(result)
    }

    /// Record one joined worker, turning a panic into a failure.
    fn collect(
        &self,
        joined: std::result::Result<(Id, CloneOutcome), JoinError>,
        in_flight: &mut HashMap<Id, CloneTask>,
        result: &mut BatchResult,
        completed: &mut usize,
        total: usize,
    ) {
        let (id, outcome) = match joined {
            Ok((id, outcome)) => (id, outcome),
            Err(e) => {
                log::error!("Clone worker {} panicked: {}", e.id(), e);
                (e.id(), CloneOutcome::failure(format!("clone worker panicked: {}", e), 0))
            }
        };

        let Some(task) = in_flight.remove(&id) else {
            log::error!("Outcome for unknown clone worker {}", id);
            return;
        };

        match &outcome {
            CloneOutcome::Success { attempts } => {
                log::info!("Cloned {} into {} ({} attempts)", task.source(), task.destination().display(), attempts)
            }
            CloneOutcome::Failure { reason, .. } => log::error!("Failed to clone {}: {}", task.source(), reason),
        }

        result.record(task, outcome);
        *completed += 1;
        self.progress.advance(*completed, total);
    }
}

/// Create `target_dir` and its parents, failing if the final directory is already there.
///
/// A symlink (even a dangling one) counts as existing.
async fn create_target_dir(target_dir: &Path) -> Result<()> {
    match tokio::fs::symlink_metadata(target_dir).await {
        Ok(_) => return Err(ClonehubError::DirectoryExists(target_dir.to_path_buf())),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    if let Some(parent) = target_dir.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    match tokio::fs::create_dir(target_dir).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(ClonehubError::DirectoryExists(target_dir.to_path_buf())),
        Err(e) => Err(e.into()),
    }
}

/// One pool slot: run the retrying clone while holding a permit.
async fn run_worker(
    op: Arc<dyn CloneOperation>,
    task: CloneTask,
    _permit: OwnedSemaphorePermit,
    max_retries: u32,
    retry_delay: Duration,
) -> CloneOutcome {
    clone_with_retry(op.as_ref(), &task, max_retries, retry_delay).await
}
