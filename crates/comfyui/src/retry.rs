//! Bounded retry-with-sleep primitive.
//!
//! The backend readiness probe and the completion poller are the same
//! pattern: try an idempotent operation, sleep a fixed interval, try
//! again, give up once a budget (attempt count or wall-clock deadline)
//! is exhausted. [`retry_until`] implements that loop once, with
//! cancellation support via a [`CancellationToken`].

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Budget limiting how long [`retry_until`] keeps retrying.
#[derive(Debug, Clone, Copy)]
pub enum RetryLimit {
    /// Stop after this many attempts.
    Attempts(u32),
    /// Stop once this much wall-clock time has elapsed. The deadline is
    /// advisory: the loop stops retrying once it observes the elapsed
    /// time past the deadline, overshooting by at most one sleep
    /// interval.
    Deadline(Duration),
}

/// Tunable parameters for one retry loop.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Fixed delay between attempts.
    pub interval: Duration,
    /// Attempt or deadline budget.
    pub limit: RetryLimit,
}

/// Why a retry loop gave up.
#[derive(Debug, thiserror::Error)]
pub enum RetryError {
    /// The attempt or deadline budget ran out without a success.
    #[error("retry budget exhausted")]
    Exhausted,

    /// The cancellation token was triggered.
    #[error("operation cancelled")]
    Cancelled,
}

/// Retry `operation` until it yields `Some`, the budget runs out, or
/// `cancel` is triggered.
///
/// Each call to `operation` is a fresh attempt; no state is kept between
/// iterations besides the start time. Cancellation is observed both
/// while an attempt is in flight and during the inter-attempt sleep, so
/// a triggered token aborts promptly rather than waiting out the next
/// interval.
pub async fn retry_until<T, F, Fut>(
    mut operation: F,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> Result<T, RetryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let start = Instant::now();
    let mut attempt = 0u32;

    loop {
        match policy.limit {
            RetryLimit::Attempts(max) if attempt >= max => return Err(RetryError::Exhausted),
            RetryLimit::Deadline(deadline) if start.elapsed() >= deadline => {
                return Err(RetryError::Exhausted)
            }
            _ => {}
        }
        attempt += 1;

        tokio::select! {
            // Check cancellation first so an already-triggered token wins
            // over an instantly-ready attempt.
            biased;
            _ = cancel.cancelled() => return Err(RetryError::Cancelled),
            result = operation() => {
                if let Some(value) = result {
                    return Ok(value);
                }
                tracing::debug!(attempt, "Retry attempt unsuccessful");
            }
        }

        // Wait before the next attempt, respecting cancellation.
        tokio::select! {
            _ = cancel.cancelled() => return Err(RetryError::Cancelled),
            _ = tokio::time::sleep(policy.interval) => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
