use std::time::Duration;

use renderpod_comfyui::poll;

/// Worker configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// ComfyUI base HTTP URL (default: `http://127.0.0.1:8188`).
    pub comfyui_url: String,
    /// Path to the workflow template JSON.
    pub workflow_path: String,
    /// Wall-clock budget for one prompt to complete, in seconds.
    pub poll_timeout_secs: u64,
    /// Startup readiness probe attempt budget.
    pub ready_max_attempts: u32,
    /// Delay between readiness probe attempts, in seconds.
    pub ready_interval_secs: u64,
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default                                        |
    /// |-----------------------|------------------------------------------------|
    /// | `HOST`                | `0.0.0.0`                                      |
    /// | `PORT`                | `3000`                                         |
    /// | `COMFYUI_URL`         | `http://127.0.0.1:8188`                        |
    /// | `WORKFLOW_PATH`       | `/ComfyUI/workflows/qwen_sfw_workflow_api.json`|
    /// | `POLL_TIMEOUT_SECS`   | `300`                                          |
    /// | `READY_MAX_ATTEMPTS`  | `30`                                           |
    /// | `READY_INTERVAL_SECS` | `2`                                            |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let comfyui_url =
            std::env::var("COMFYUI_URL").unwrap_or_else(|_| "http://127.0.0.1:8188".into());

        let workflow_path = std::env::var("WORKFLOW_PATH")
            .unwrap_or_else(|_| "/ComfyUI/workflows/qwen_sfw_workflow_api.json".into());

        let poll_timeout_secs: u64 = std::env::var("POLL_TIMEOUT_SECS")
            .unwrap_or_else(|_| poll::DEFAULT_POLL_TIMEOUT.as_secs().to_string())
            .parse()
            .expect("POLL_TIMEOUT_SECS must be a valid u64");

        let ready_max_attempts: u32 = std::env::var("READY_MAX_ATTEMPTS")
            .unwrap_or_else(|_| poll::DEFAULT_READY_ATTEMPTS.to_string())
            .parse()
            .expect("READY_MAX_ATTEMPTS must be a valid u32");

        let ready_interval_secs: u64 = std::env::var("READY_INTERVAL_SECS")
            .unwrap_or_else(|_| poll::DEFAULT_READY_INTERVAL.as_secs().to_string())
            .parse()
            .expect("READY_INTERVAL_SECS must be a valid u64");

        Self {
            host,
            port,
            comfyui_url,
            workflow_path,
            poll_timeout_secs,
            ready_max_attempts,
            ready_interval_secs,
        }
    }

    /// Completion poll budget as a [`Duration`].
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    /// Readiness probe interval as a [`Duration`].
    pub fn ready_interval(&self) -> Duration {
        Duration::from_secs(self.ready_interval_secs)
    }
}
