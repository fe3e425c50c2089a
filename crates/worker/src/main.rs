use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use renderpod_comfyui::api::ComfyUIApi;
use renderpod_comfyui::poll::wait_until_ready;
use renderpod_comfyui::workflow::Workflow;
use renderpod_worker::config::WorkerConfig;
use renderpod_worker::progress::LogProgress;
use renderpod_worker::routes;
use renderpod_worker::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "renderpod_worker=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = WorkerConfig::from_env();

    let template_json = std::fs::read_to_string(&config.workflow_path)
        .expect("Failed to read workflow template file");
    let template = Workflow::parse(&template_json).expect("Failed to parse workflow template");
    tracing::info!(path = %config.workflow_path, "Workflow template loaded");

    let api = ComfyUIApi::new(config.comfyui_url.clone());

    // The backend must be reachable before any job is accepted.
    wait_until_ready(
        &api,
        config.ready_max_attempts,
        config.ready_interval(),
        &CancellationToken::new(),
    )
    .await
    .expect("ComfyUI backend never became ready");

    let state = AppState {
        api: Arc::new(api),
        template: Arc::new(template),
        config: Arc::new(config.clone()),
        progress: Arc::new(LogProgress),
    };

    let app = routes::router()
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::new(config.host.parse().expect("Invalid HOST"), config.port);
    tracing::info!("Starting worker on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");
    axum::serve(listener, app).await.expect("Server error");
}
