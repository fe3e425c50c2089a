//! Progress notification seam toward the invocation host.
//!
//! The host offers a push channel for informational progress updates;
//! the orchestrator emits exactly two, at submission and while waiting
//! for generation. The updates are not part of the job's data contract.

use async_trait::async_trait;

/// The two notification points of one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    /// The workflow is being queued on the backend.
    Queuing,
    /// The backend is generating; completion is being polled.
    Generating,
}

impl JobPhase {
    /// Human-readable progress message for the host channel.
    pub fn message(&self) -> &'static str {
        match self {
            JobPhase::Queuing => "Queuing prompt...",
            JobPhase::Generating => "Generating image...",
        }
    }
}

/// Collaborator-provided progress channel.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    /// Push one informational update. Failures are the sink's problem;
    /// the orchestrator never aborts a job over a progress update.
    async fn notify(&self, phase: JobPhase);
}

/// Default sink that reports progress through the log stream.
pub struct LogProgress;

#[async_trait]
impl ProgressSink for LogProgress {
    async fn notify(&self, phase: JobPhase) {
        tracing::info!(message = phase.message(), "Job progress");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_messages_match_the_host_contract() {
        assert_eq!(JobPhase::Queuing.message(), "Queuing prompt...");
        assert_eq!(JobPhase::Generating.message(), "Generating image...");
    }
}
