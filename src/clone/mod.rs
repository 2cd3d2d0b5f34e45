//! Parallel, retrying batch clone.
//!
//! This module provides:
//! - CloneTask derivation from source locations, with collision handling
//! - The CloneOperation seam and its `git` implementation
//! - The retry loop around a single clone
//! - BatchCloner, the bounded worker pool that runs a whole batch

mod git;
mod orchestrator;
mod outcome;
mod retry;
mod task;

pub use git::{CloneOperation, GitCloner};
pub use orchestrator::{BatchCloner, BatchConfig};
pub use outcome::{BatchResult, CloneOutcome, TaskReport};
pub use retry::clone_with_retry;
pub use task::{CloneTask, CollisionPolicy, PlannedTask, local_name_for, plan_tasks};
