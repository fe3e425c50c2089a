use std::sync::Arc;

use renderpod_comfyui::api::ComfyUIApi;
use renderpod_comfyui::workflow::Workflow;

use crate::config::WorkerConfig;
use crate::progress::ProgressSink;

/// Shared application state for the worker's RPC surface.
///
/// The backend client and the workflow template prototype are created
/// once at startup and shared read-only across invocations; the binder
/// copies the template per job, so no lock is held while a job polls.
#[derive(Clone)]
pub struct AppState {
    /// Client for the ComfyUI instance this worker drives.
    pub api: Arc<ComfyUIApi>,
    /// Loaded workflow template prototype. Never mutated after startup.
    pub template: Arc<Workflow>,
    pub config: Arc<WorkerConfig>,
    /// Progress channel toward the invocation host.
    pub progress: Arc<dyn ProgressSink>,
}
