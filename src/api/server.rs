//! HTTP server implementation for the API

use anyhow::Result;
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, Method, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use super::handlers;
use super::models::{ApiResponse, Download};
use crate::config::Config;
use crate::error::AppError;
use crate::pipeline::TranscriptionPipeline;
use crate::scratch::ScratchStore;
use crate::session::{SessionId, SessionStore};
use crate::transcription::{Transcriber, WhisperApiClient};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub pipeline: TranscriptionPipeline,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire the session store and pipeline around a transcriber
    pub fn new(config: Arc<Config>, transcriber: Arc<dyn Transcriber>) -> Self {
        let sessions = SessionStore::new(Duration::from_secs(config.session.idle_timeout_secs));
        let pipeline = TranscriptionPipeline::new(ScratchStore::from_config(&config.scratch), transcriber);
        Self {
            sessions,
            pipeline,
            config,
        }
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let max_upload_bytes = state.config.server.max_upload_bytes;
    let enable_cors = state.config.server.enable_cors;

    let app = Router::new()
        // Health check endpoints (both paths for compatibility)
        .route("/health", get(health_handler))
        .route("/api/health", get(health_handler))

        // Session lifecycle
        .route("/api/sessions", post(create_session_handler))
        .route("/api/sessions/:id", delete(end_session_handler))

        // Transcription and downloads
        .route("/api/sessions/:id/transcriptions", post(transcribe_handler))
        .route("/api/sessions/:id/transcript", get(transcript_handler))
        .route("/api/sessions/:id/transcript.txt", get(download_text_handler))
        .route("/api/sessions/:id/transcript.vtt", get(download_subtitle_handler))

        .route("/", get(serve_ui))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        );

    if enable_cors {
        // Configure CORS to allow browser access
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE]);
        app.layer(cors)
    } else {
        app
    }
}

/// Configure and start the HTTP server
pub async fn start_http_server(config: Arc<Config>) -> Result<()> {
    let transcriber: Arc<dyn Transcriber> = Arc::new(WhisperApiClient::new(&config.transcription));
    let state = AppState::new(config.clone(), transcriber);

    let sweeper = state
        .sessions
        .spawn_sweeper(Duration::from_secs(config.session.sweep_interval_secs.max(1)));

    let app = build_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("🌐 Transcritor listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("🛑 Shutdown requested");
}

fn parse_session(id: &str) -> Result<SessionId, AppError> {
    id.parse()
}

/// Health check handler
async fn health_handler() -> impl IntoResponse {
    Json(handlers::health_check())
}

async fn create_session_handler(State(state): State<AppState>) -> impl IntoResponse {
    let created = handlers::create_session(&state.sessions).await;
    (StatusCode::CREATED, Json(ApiResponse::success(created)))
}

async fn end_session_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    handlers::end_session(&state.sessions, parse_session(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Start transcription handler. Blocks until the API answers.
async fn transcribe_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let session = parse_session(&id)?;
    let (credential, media) =
        handlers::read_upload(multipart, state.config.server.max_upload_bytes).await?;
    let summary = handlers::transcribe(&state.pipeline, &state.sessions, session, credential, media).await?;
    Ok(Json(ApiResponse::success(summary)))
}

async fn transcript_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let summary = handlers::transcript_summary(&state.sessions, parse_session(&id)?).await?;
    Ok(Json(ApiResponse::success(summary)))
}

async fn download_text_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let download = handlers::download_text(&state.sessions, parse_session(&id)?).await?;
    Ok(attachment(download))
}

async fn download_subtitle_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let download = handlers::download_subtitle(&state.sessions, parse_session(&id)?).await?;
    Ok(attachment(download))
}

fn attachment(download: Download) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, download.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                handlers::content_disposition(&download.filename),
            ),
        ],
        download.body,
    )
        .into_response()
}

/// Serve the upload page
async fn serve_ui() -> Html<&'static str> {
    Html(include_str!("index.html"))
}
