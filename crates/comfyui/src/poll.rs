//! Backend readiness probe and completion poller.
//!
//! Both are drivers over [`retry_until`](crate::retry::retry_until):
//! the readiness probe retries `GET /system_stats` a fixed number of
//! times at process startup, and the completion poller re-reads
//! `GET /history/{prompt_id}` until the prompt ID appears as a key or a
//! wall-clock deadline passes.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::api::{ComfyUIApi, ComfyUIApiError};
use crate::history::HistoryEntry;
use crate::retry::{retry_until, RetryError, RetryLimit, RetryPolicy};

/// Delay between history reads while waiting for completion.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Default wall-clock budget for one prompt to complete.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(300);
/// Default number of readiness probe attempts at startup.
pub const DEFAULT_READY_ATTEMPTS: u32 = 30;
/// Default delay between readiness probe attempts.
pub const DEFAULT_READY_INTERVAL: Duration = Duration::from_secs(2);

/// Fatal startup failures. The process must not accept jobs after one
/// of these.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The readiness budget ran out without a single 2xx response.
    #[error("ComfyUI failed to start")]
    NeverReady,

    /// Startup was cancelled before the backend became reachable.
    #[error("Startup wait cancelled")]
    Cancelled,
}

/// Failures while waiting for a prompt to complete.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    /// The prompt never appeared in history within the timeout.
    #[error("Timeout waiting for prompt {prompt_id}")]
    Timeout { prompt_id: String },

    /// The caller cancelled the wait.
    #[error("Cancelled while waiting for prompt {prompt_id}")]
    Cancelled { prompt_id: String },

    /// A history read failed outright. Polling does not retry transport
    /// errors; each read is expected to succeed while the backend is up.
    #[error("History query failed for prompt {prompt_id}: {source}")]
    Api {
        prompt_id: String,
        #[source]
        source: ComfyUIApiError,
    },
}

/// Block until the backend answers its stats endpoint, retrying up to
/// `max_attempts` times with `interval` between attempts.
///
/// Runs once at process startup, before any job is accepted. Exhausting
/// the budget is process-fatal.
pub async fn wait_until_ready(
    api: &ComfyUIApi,
    max_attempts: u32,
    interval: Duration,
    cancel: &CancellationToken,
) -> Result<(), StartupError> {
    let policy = RetryPolicy {
        interval,
        limit: RetryLimit::Attempts(max_attempts),
    };

    tracing::info!(api_url = api.api_url(), "Waiting for ComfyUI to start");

    match retry_until(|| async { api.system_stats().await.ok() }, &policy, cancel).await {
        Ok(()) => {
            tracing::info!(api_url = api.api_url(), "ComfyUI is ready");
            Ok(())
        }
        Err(RetryError::Exhausted) => Err(StartupError::NeverReady),
        Err(RetryError::Cancelled) => Err(StartupError::Cancelled),
    }
}

/// Block until `prompt_id` appears in the backend's history, polling at
/// [`POLL_INTERVAL`] under the given wall-clock `timeout`.
///
/// Presence of the key is the terminal signal: the history store only
/// materializes an entry once processing has recorded results, so no
/// particular status value is inspected. Each read is a fresh idempotent
/// query; a transport failure aborts the wait immediately rather than
/// being retried.
pub async fn wait_for_completion(
    api: &ComfyUIApi,
    prompt_id: &str,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<HistoryEntry, PollError> {
    let policy = RetryPolicy {
        interval: POLL_INTERVAL,
        limit: RetryLimit::Deadline(timeout),
    };

    let outcome = retry_until(
        || async {
            match api.get_history(prompt_id).await {
                Ok(mut history) => history.remove(prompt_id).map(Ok),
                Err(e) => Some(Err(e)),
            }
        },
        &policy,
        cancel,
    )
    .await;

    match outcome {
        Ok(Ok(entry)) => {
            tracing::info!(prompt_id, "Prompt completed");
            Ok(entry)
        }
        Ok(Err(source)) => Err(PollError::Api {
            prompt_id: prompt_id.to_string(),
            source,
        }),
        Err(RetryError::Exhausted) => Err(PollError::Timeout {
            prompt_id: prompt_id.to_string(),
        }),
        Err(RetryError::Cancelled) => Err(PollError::Cancelled {
            prompt_id: prompt_id.to_string(),
        }),
    }
}
