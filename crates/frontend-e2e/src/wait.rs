//! Bounded polling
//!
//! Every wait in the harness goes through [`poll_until`]: an explicit
//! predicate, timeout, and poll interval, returning `Timeout` when the
//! deadline passes. There is no unbounded wait and no retry on top of it.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::{HarnessError, Result};

/// Default spacing between probe attempts.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Default bound for a single UI condition (matches the field-lookup bound).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Poll `probe` until it yields `Some(value)` or `timeout` elapses.
///
/// The probe runs immediately, then every `interval` until the deadline.
/// A probe error aborts the wait; expiry yields `Timeout` naming `what`.
pub async fn poll_until<F, Fut, T>(
    what: &str,
    timeout: Duration,
    interval: Duration,
    mut probe: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let deadline = Instant::now() + timeout;
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        if let Some(value) = probe().await? {
            debug!(what, attempts, "condition met");
            return Ok(value);
        }
        if Instant::now() + interval > deadline {
            return Err(HarnessError::timeout(what, timeout));
        }
        sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn resolves_when_probe_succeeds() {
        let mut remaining = 3u32;
        let value = poll_until(
            "third attempt",
            Duration::from_secs(5),
            Duration::from_millis(100),
            || {
                remaining = remaining.saturating_sub(1);
                let hit = remaining == 0;
                async move { Ok(if hit { Some(42) } else { None }) }
            },
        )
        .await
        .expect("should resolve before the bound");
        assert_eq!(value, 42);
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_is_a_timeout_error() {
        let result: Result<()> = poll_until(
            "never",
            Duration::from_secs(1),
            Duration::from_millis(100),
            || async { Ok(None) },
        )
        .await;
        match result {
            Err(HarnessError::Timeout { what, timeout }) => {
                assert_eq!(what, "never");
                assert_eq!(timeout, Duration::from_secs(1));
            }
            other => panic!("expected Timeout, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn probe_error_aborts_immediately() {
        let result: Result<()> = poll_until(
            "broken probe",
            Duration::from_secs(10),
            Duration::from_millis(100),
            || async {
                Err(HarnessError::AssertionFailed("probe blew up".into()))
            },
        )
        .await;
        assert!(matches!(result, Err(HarnessError::AssertionFailed(_))));
    }
}
