//! Batch clone integration tests
//!
//! Drives the public API end to end: a lister feeding the batch cloner, with
//! fake clone operations and with the real git binary against local bare
//! repositories.

use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use clonehub::clone::{BatchCloner, BatchConfig, CloneOperation, CloneOutcome, GitCloner};
use clonehub::error::{ClonehubError, Result};
use clonehub::listing::SourceLister;
use tempfile::TempDir;

/// Lister that returns a fixed list.
struct StaticLister(Vec<String>);

#[async_trait]
impl SourceLister for StaticLister {
    async fn list_sources(&self, _owner: &str, _token: Option<&str>) -> Result<Vec<String>> {
        Ok(self.0.clone())
    }
}

/// Clone operation that creates the destination unless the source contains `fail`.
#[derive(Default)]
struct ScriptedClone {
    calls: AtomicUsize,
}

#[async_trait]
impl CloneOperation for ScriptedClone {
    async fn clone_repo(&self, source: &str, destination: &Path) -> std::result::Result<(), String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if source.contains("fail") {
            return Err("exit status 128".to_string());
        }
        std::fs::create_dir_all(destination).map_err(|e| e.to_string())
    }
}

fn config() -> BatchConfig {
    BatchConfig::default()
        .with_workers(2)
        .with_retry_delay(Duration::ZERO)
}

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Integration test: listed sources all cloned into their own directories
#[tokio::test]
async fn test_listed_sources_are_cloned() -> Result<()> {
    let temp = TempDir::new()?;
    let target = temp.path().join("out");
    let lister = StaticLister(vec![
        "https://host/a.git".to_string(),
        "https://host/b.git".to_string(),
    ]);

    let sources = lister.list_sources("someone", None).await?;
    let result = BatchCloner::new(Arc::new(ScriptedClone::default()), config())
        .run(&sources, &target)
        .await?;

    assert_eq!(result.len(), sources.len());
    assert_eq!(result.get("a").unwrap().outcome, CloneOutcome::Success { attempts: 1 });
    assert_eq!(result.get("b").unwrap().outcome, CloneOutcome::Success { attempts: 1 });
    assert!(target.join("a").is_dir());
    assert!(target.join("b").is_dir());
    Ok(())
}

/// Integration test: a permanently failing source exhausts its budget alone
#[tokio::test]
async fn test_failing_source_reports_attempts() -> Result<()> {
    let temp = TempDir::new()?;
    let op = Arc::new(ScriptedClone::default());
    let sources = vec!["https://host/a.git".to_string(), "https://host/fail.git".to_string()];

    let result = BatchCloner::new(op.clone(), config())
        .run(&sources, &temp.path().join("out"))
        .await?;

    assert_eq!(result.len(), 2);
    assert!(result.get("a").unwrap().outcome.is_success());
    match &result.get("fail").unwrap().outcome {
        CloneOutcome::Failure { attempts_made, reason } => {
            assert_eq!(*attempts_made, 5);
            assert!(reason.contains("exit status 128"));
        }
        other => panic!("Expected failure, got {:?}", other),
    }
    assert_eq!(op.calls.load(Ordering::SeqCst), 6);
    Ok(())
}

/// Integration test: an existing target directory stops the batch before any clone
#[tokio::test]
async fn test_existing_target_directory() -> Result<()> {
    let temp = TempDir::new()?;
    let op = Arc::new(ScriptedClone::default());

    let err = BatchCloner::new(op.clone(), config())
        .run(&["https://host/a.git".to_string()], temp.path())
        .await
        .unwrap_err();

    assert!(matches!(err, ClonehubError::DirectoryExists(_)));
    assert_eq!(op.calls.load(Ordering::SeqCst), 0);
    Ok(())
}

/// Integration test: clone local bare repositories with the real git binary
#[tokio::test]
async fn test_git_clones_local_repositories() -> Result<()> {
    if !git_available() {
        eprintln!("git not available, skipping");
        return Ok(());
    }

    let temp = TempDir::new()?;
    let remotes = temp.path().join("remotes");
    std::fs::create_dir_all(&remotes)?;
    for name in ["alpha.git", "beta.git"] {
        let status = Command::new("git")
            .args(["init", "--bare", "--quiet"])
            .arg(remotes.join(name))
            .status()?;
        assert!(status.success());
    }

    let sources = vec![
        remotes.join("alpha.git").to_string_lossy().to_string(),
        remotes.join("beta.git").to_string_lossy().to_string(),
        remotes.join("missing.git").to_string_lossy().to_string(),
    ];
    let target = temp.path().join("clones");
    let git = GitCloner::new();
    git.check_installed().await?;

    let result = BatchCloner::new(Arc::new(git), config().with_retries(2))
        .run(&sources, &target)
        .await?;

    assert_eq!(result.len(), 3);
    assert!(result.get("alpha").unwrap().outcome.is_success());
    assert!(result.get("beta").unwrap().outcome.is_success());
    assert!(target.join("alpha").join(".git").is_dir());
    assert!(target.join("beta").join(".git").is_dir());
    assert_eq!(result.get("missing").unwrap().outcome.attempts(), 2);
    assert!(!result.get("missing").unwrap().outcome.is_success());
    assert!(!target.join("missing").exists());
    Ok(())
}
