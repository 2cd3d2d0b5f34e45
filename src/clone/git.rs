//! The clone operation seam and its `git` implementation.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{ClonehubError, Result};

/// Copies one remote source into a local destination directory.
///
/// Implementations report failure as a plain reason string; the retry loop
/// decides what to do with it.
#[async_trait]
pub trait CloneOperation: Send + Sync {
    async fn clone_repo(&self, source: &str, destination: &Path) -> std::result::Result<(), String>;
}

/// Clones by running `git clone <source> <destination>`.
#[derive(Debug, Clone)]
pub struct GitCloner {
    program: String,
    timeout: Option<Duration>,
}

impl Default for GitCloner {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
            timeout: None,
        }
    }
}

impl GitCloner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different git executable
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Kill an attempt that runs longer than `timeout`
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Verify the git binary can be run at all.
    pub async fn check_installed(&self) -> Result<String> {
        let output = Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ClonehubError::GitUnavailable(format!("Failed to execute {}: {}", self.program, e)))?;

        if !output.status.success() {
            return Err(ClonehubError::GitUnavailable(format!(
                "{} --version exited with {}",
                self.program, output.status
            )));
        }

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        log::debug!("Found {}", version);
        Ok(version)
    }

    async fn run(&self, source: &str, destination: &Path) -> std::result::Result<(), String> {
        let mut child = Command::new(&self.program)
            .arg("clone")
            .arg("--quiet")
            .arg(source)
            .arg(destination)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| format!("Failed to execute {}: {}", self.program, e))?;

        let waited = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait()).await.ok(),
            None => Some(child.wait().await),
        };

        let status = match waited {
            Some(status) => status.map_err(|e| format!("Failed to wait for git: {}", e))?,
            None => {
                let _ = child.kill().await;
                let secs = self.timeout.map(|t| t.as_secs()).unwrap_or_default();
                return Err(format!("git clone timed out after {}s", secs));
            }
        };

        if status.success() {
            Ok(())
        } else {
            Err(match status.code() {
                Some(code) => format!("git clone exited with code {}", code),
                None => "git clone terminated by signal".to_string(),
            })
        }
    }
}

#[async_trait]
impl CloneOperation for GitCloner {
    async fn clone_repo(&self, source: &str, destination: &Path) -> std::result::Result<(), String> {
        let existed = destination.exists();
        let result = self.run(source, destination).await;

        // A half-written checkout would make the next attempt fail on a non-empty directory
        if result.is_err() && !existed && destination.exists() {
            if let Err(e) = tokio::fs::remove_dir_all(destination).await {
                log::warn!("Failed to clean up {}: {}", destination.display(), e);
            }
        }

        result
    }
}
