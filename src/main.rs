//! Creative Studio Service - Main Entry Point
//!
//! Turns a short text prompt into a poem or song lyric, a music clip and a
//! short animation, stores every generation in SQLite and serves the files.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod models;
mod store;
mod generators;
mod services;
mod handlers;

use config::Config;
use generators::FfmpegRenderer;
use handlers::AppState;
use services::{AsrClient, StubTranscriber, Studio, Transcriber};
use store::ContentStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "creative_studio=info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    info!("🎨 Starting Creative Studio Service v{}", env!("CARGO_PKG_VERSION"));
    info!("Port: {}", config.port);

    tokio::fs::create_dir_all(&config.output_dir).await?;
    info!("Generated files: {}", config.output_dir.display());

    // Initialize SQLite
    let store = ContentStore::connect(&config.sqlite_url()).await?;
    store.init_schema().await?;

    let transcriber: Arc<dyn Transcriber> = match &config.asr_service_url {
        Some(url) => {
            info!("✅ Using ASR service at {}", url);
            Arc::new(AsrClient::new(url))
        }
        None => {
            tracing::warn!("⚠️ ASR_SERVICE_URL not set. /asr will return stub transcripts.");
            Arc::new(StubTranscriber)
        }
    };

    let renderer = Arc::new(FfmpegRenderer::new(&config.ffmpeg_path, config.font_file.clone()));
    let studio = Studio::new(&config, store.clone(), renderer);

    // Build application state
    let state = Arc::new(AppState {
        config: config.clone(),
        store,
        studio,
        transcriber,
    });

    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!("🚀 Creative Studio Service listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

/// HTTP routes for the service
fn build_router(state: Arc<AppState>) -> Router {
    let files = ServeDir::new(&state.config.output_dir);
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))

        // Generation
        .route("/generate", post(handlers::generate))

        // Speech recognition
        .route("/asr", post(handlers::asr))

        // Stored generations
        .route("/content", get(handlers::list_content))
        .route("/content/:id", get(handlers::get_content))

        // Statistics
        .route("/stats", get(handlers::get_statistics))

        // Generated files
        .nest_service("/files", files)

        // State
        .with_state(state)
        // Middleware
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
