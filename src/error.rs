//! Error types for clonehub
//!
//! Centralized error handling using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// All batch-level error types that can occur in clonehub.
///
/// Failures of a single clone never show up here; they are folded into a
/// [`CloneOutcome`](crate::clone::CloneOutcome) instead.
#[derive(Debug, Error)]
pub enum ClonehubError {
    /// Target directory already exists before the batch started
    #[error("Directory already exists: {}", .0.display())]
    DirectoryExists(PathBuf),

    /// Token file given on the command line does not exist
    #[error("Token file not found: {}", .0.display())]
    TokenFileMissing(PathBuf),

    /// Invalid batch or client configuration
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// The git binary could not be run
    #[error("Git unavailable: {0}")]
    GitUnavailable(String),

    /// Repository listing service error
    #[error("Listing error: {0}")]
    Listing(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for clonehub operations
pub type Result<T> = std::result::Result<T, ClonehubError>;
