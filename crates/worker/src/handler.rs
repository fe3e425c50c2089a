//! The generation job orchestrator.
//!
//! Composes validation, template binding, submission, completion
//! polling, artifact resolution, and artifact download into one
//! end-to-end flow per job, and maps every downstream failure into the
//! `{error}` result shape. A job invocation always succeeds at the
//! transport layer; callers inspect the payload to detect failure.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use renderpod_comfyui::api::ComfyUIApiError;
use renderpod_comfyui::history::OutputError;
use renderpod_comfyui::poll::{wait_for_completion, PollError};
use renderpod_comfyui::workflow::{WorkflowError, OUTPUT_NODE_ID};
use renderpod_core::error::CoreError;
use renderpod_core::generation::{GenerationInput, GenerationRequest};

use crate::progress::JobPhase;
use crate::state::AppState;

/// The job result payload: exactly one of the success shape or the
/// error shape, never both, never a partial image.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum JobOutput {
    Success {
        /// Base64-encoded image bytes.
        image: String,
        seed: i64,
        prompt: String,
        width: u32,
        height: u32,
        steps: u32,
    },
    Error {
        error: String,
    },
}

/// Everything that can go wrong after validation. Each variant's
/// message becomes the `error` field of the job result.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error("Failed to queue prompt: {0}")]
    Submit(#[source] ComfyUIApiError),

    #[error(transparent)]
    Poll(#[from] PollError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("Failed to fetch image: {0}")]
    Fetch(#[source] ComfyUIApiError),
}

/// Run one generation job end to end.
///
/// Validation happens before any network activity; a validation failure
/// short-circuits into the error shape carrying the rule's message.
pub async fn run_generation(
    state: &AppState,
    input: GenerationInput,
    cancel: &CancellationToken,
) -> JobOutput {
    let request = match input.validate() {
        Ok(request) => request,
        Err(CoreError::Validation(message)) => {
            tracing::warn!(error = %message, "Rejected job input");
            return JobOutput::Error { error: message };
        }
    };

    tracing::debug!(
        prompt = %request.prompt,
        width = request.width,
        height = request.height,
        steps = request.steps,
        seed = request.seed,
        "Job input validated",
    );

    match generate(state, &request, cancel).await {
        Ok(image) => JobOutput::Success {
            image,
            seed: request.seed,
            prompt: request.prompt,
            width: request.width,
            height: request.height,
            steps: request.steps,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Generation job failed");
            JobOutput::Error {
                error: e.to_string(),
            }
        }
    }
}

/// The happy path: bind -> submit -> poll -> resolve -> fetch -> encode.
async fn generate(
    state: &AppState,
    request: &GenerationRequest,
    cancel: &CancellationToken,
) -> Result<String, GenerationError> {
    let workflow = state.template.bind(request)?;

    state.progress.notify(JobPhase::Queuing).await;
    let client_id = uuid::Uuid::new_v4().to_string();
    let submitted = state
        .api
        .submit_workflow(&workflow, &client_id)
        .await
        .map_err(GenerationError::Submit)?;
    tracing::info!(
        prompt_id = %submitted.prompt_id,
        queue_position = submitted.number,
        seed = request.seed,
        "Prompt queued",
    );

    state.progress.notify(JobPhase::Generating).await;
    let entry = wait_for_completion(
        &state.api,
        &submitted.prompt_id,
        state.config.poll_timeout(),
        cancel,
    )
    .await?;

    let images = entry.resolve_images(OUTPUT_NODE_ID)?;
    let bytes = state
        .api
        .get_image(&images[0])
        .await
        .map_err(GenerationError::Fetch)?;
    tracing::info!(
        prompt_id = %submitted.prompt_id,
        filename = %images[0].filename,
        bytes = bytes.len(),
        "Image fetched",
    );

    Ok(STANDARD.encode(bytes))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
