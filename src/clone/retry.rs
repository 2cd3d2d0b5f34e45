//! Retrying single-item clone.
//!
//! The retry budget counts total attempts: a budget of `n` runs the clone at
//! most `n` times, and a budget of zero never runs it.

use std::time::Duration;

use super::git::CloneOperation;
use super::outcome::CloneOutcome;
use super::task::CloneTask;

/// Clone one task, retrying with a fixed delay until success or the budget runs out.
pub async fn clone_with_retry<C>(op: &C, task: &CloneTask, max_retries: u32, retry_delay: Duration) -> CloneOutcome
where
    C: CloneOperation + ?Sized,
{
    if max_retries == 0 {
        log::warn!("Retry budget is 0, not cloning {}", task.source());
        return CloneOutcome::failure("no clone attempt made: retry budget is 0", 0);
    }

    let destination = task.destination();
    let mut last_error = String::new();

    for attempt in 1..=max_retries {
        log::debug!("Cloning {} into {} (attempt {}/{})", task.source(), destination.display(), attempt, max_retries);

        match op.clone_repo(task.source(), &destination).await {
            Ok(()) => return CloneOutcome::Success { attempts: attempt },
            Err(reason) => {
                log::warn!("Error cloning {} (attempt {}/{}): {}", task.local_name(), attempt, max_retries, reason);
                last_error = reason;
            }
        }

        if attempt < max_retries {
            tokio::time::sleep(retry_delay).await;
        }
    }

    CloneOutcome::failure(
        format!("failed after {} attempts: {}", max_retries, last_error),
        max_retries,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `failures` calls, then succeeds.
    struct FlakyClone {
        failures: u32,
        calls: AtomicU32,
    }

    impl FlakyClone {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CloneOperation for FlakyClone {
        async fn clone_repo(&self, _source: &str, _destination: &Path) -> std::result::Result<(), String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                Err(format!("exit 128 on call {}", call))
            } else {
                Ok(())
            }
        }
    }

    fn task() -> CloneTask {
        CloneTask::new(0, "https://host/a.git", "out")
    }

    #[tokio::test]
    async fn test_success_first_try() {
        let op = FlakyClone::new(0);
        let outcome = clone_with_retry(&op, &task(), 5, Duration::ZERO).await;
        assert_eq!(outcome, CloneOutcome::Success { attempts: 1 });
        assert_eq!(op.calls(), 1);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failures() {
        let op = FlakyClone::new(3);
        let outcome = clone_with_retry(&op, &task(), 5, Duration::ZERO).await;
        assert_eq!(outcome, CloneOutcome::Success { attempts: 4 });
        assert_eq!(op.calls(), 4);
    }

    #[tokio::test]
    async fn test_always_failing_uses_whole_budget() {
        let op = FlakyClone::new(u32::MAX);
        let outcome = clone_with_retry(&op, &task(), 5, Duration::ZERO).await;
        match outcome {
            CloneOutcome::Failure { reason, attempts_made } => {
                assert_eq!(attempts_made, 5);
                assert!(reason.contains("exit 128 on call 5"));
            }
            other => panic!("Expected failure, got {:?}", other),
        }
        assert_eq!(op.calls(), 5);
    }

    #[tokio::test]
    async fn test_zero_budget_makes_no_attempt() {
        let op = FlakyClone::new(0);
        let outcome = clone_with_retry(&op, &task(), 0, Duration::ZERO).await;
        assert_eq!(outcome.attempts(), 0);
        assert!(!outcome.is_success());
        assert_eq!(op.calls(), 0);
    }

    #[tokio::test]
    async fn test_budget_of_one_is_single_attempt() {
        let op = FlakyClone::new(1);
        let outcome = clone_with_retry(&op, &task(), 1, Duration::ZERO).await;
        assert_eq!(outcome.attempts(), 1);
        assert!(!outcome.is_success());
        assert_eq!(op.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_between_attempts() {
        let op = FlakyClone::new(2);
        let start = tokio::time::Instant::now();
        let outcome = clone_with_retry(&op, &task(), 5, Duration::from_secs(5)).await;
        assert!(outcome.is_success());
        // Two failures, two waits of the same length
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(10));
        assert!(elapsed < Duration::from_secs(15));
    }
}
