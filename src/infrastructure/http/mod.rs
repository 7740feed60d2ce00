pub mod json;
pub mod request_id;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    controllers::{health, jobs::JobController, text, tts::TtsController, voices},
    domain::{job::JobService, tts::SpeechDispatcher, voice::VoiceCatalog},
    infrastructure::config::Config,
};

pub use json::ApiJson;
pub use request_id::{request_id_middleware, RequestId, X_REQUEST_ID};

/// Everything the router hands to handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<VoiceCatalog>,
    pub dispatcher: Arc<SpeechDispatcher>,
    pub job_controller: Arc<JobController>,
    pub tts_controller: Arc<TtsController>,
}

/// Build the application router with all routes and layers
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    let health_routes = Router::new()
        .route("/", get(health::index))
        .route("/health", get(health::health))
        .route("/api/health", get(health::api_health))
        .route("/health/ready", get(health::health_ready))
        .with_state(state.dispatcher.clone());

    let voice_routes = Router::new()
        .route("/api/voices", get(voices::list_voices))
        .with_state(state.catalog.clone());

    let text_routes = Router::new()
        .route("/api/extract", post(text::extract))
        .route("/api/estimate", post(text::estimate_time));

    let tts_routes = Router::new()
        .route("/api/generate", post(TtsController::generate))
        .route("/api/preview", post(TtsController::preview_body))
        .route("/api/preview/:voice_id", get(TtsController::preview))
        .with_state(state.tts_controller.clone());

    let job_routes = Router::new()
        .route("/api/jobs", post(JobController::submit))
        .route("/api/jobs/:job_id", get(JobController::status))
        .route("/api/jobs/:job_id/download", get(JobController::download))
        .with_state(state.job_controller.clone());

    Router::new()
        .merge(health_routes)
        .merge(voice_routes)
        .merge(text_routes)
        .merge(tts_routes)
        .merge(job_routes)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Serve `app` on `listener` until `shutdown` resolves, then drain running jobs
pub async fn serve<F>(
    listener: TcpListener,
    app: Router,
    job_service: Arc<JobService>,
    grace: std::time::Duration,
    shutdown: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    F: Future<Output = ()> + Send + 'static,
{
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("HTTP server stopped, draining jobs");
    job_service.shutdown(grace).await;

    Ok(())
}

/// Start the HTTP server with all routes configured
pub async fn start_http_server(
    config: Arc<Config>,
    state: AppState,
    job_service: Arc<JobService>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(state, config.max_text_bytes);

    let listener = TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    serve(listener, app, job_service, config.shutdown_grace(), shutdown_signal()).await
}

/// Wait for Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
