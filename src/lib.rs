//! Clonehub - clone every public repository of a GitHub user
//!
//! Lists a user's repositories through the GitHub REST API and clones them
//! in parallel on a bounded worker pool, retrying failed clones with a fixed
//! delay and reporting one outcome per repository.

pub mod clone;
pub mod error;
pub mod listing;
pub mod progress;

pub use error::{ClonehubError, Result};
