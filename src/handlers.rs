//! HTTP handlers module

use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{BytesRejection, QueryRejection},
        Multipart, Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{StudioError, StudioResult};
use crate::models::*;
use crate::services::{Studio, Transcriber};
use crate::store::ContentStore;

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub store: ContentStore,
    pub studio: Studio,
    pub transcriber: Arc<dyn Transcriber>,
}

impl AppState {
    /// Record one call in `usage_stats`; failures are only logged
    async fn track(&self, usage: UsageRecord) {
        if let Err(e) = self.store.record_usage(&usage).await {
            tracing::warn!("⚠️ Failed to record usage for {}: {}", usage.endpoint, e);
        }
    }
}

fn elapsed_ms(start: Instant) -> i64 {
    i64::try_from(start.elapsed().as_millis()).unwrap_or(i64::MAX)
}

/// 413 when the body hit the upload limit, 400 otherwise
fn body_error(config: &Config, status: StatusCode, message: String) -> StudioError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        StudioError::PayloadTooLarge(format!(
            "Request body exceeds {} bytes",
            config.max_upload_bytes
        ))
    } else {
        StudioError::Validation(message)
    }
}

fn multipart_error(config: &Config, context: &str, e: MultipartError) -> StudioError {
    body_error(config, e.status(), format!("{}: {}", context, e.body_text()))
}

/// Health check endpoint
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> Json<serde_json::Value> {
    let database = state.store.ping().await;
    let status = if database { "healthy" } else { "degraded" };

    Json(serde_json::json!({
        "status": status,
        "service": "creative-studio",
        "version": env!("CARGO_PKG_VERSION"),
        "components": {
            "database": database,
            "renderer": state.config.ffmpeg_path,
            "asr": state.transcriber.name(),
        }
    }))
}

/// Generate poem/song + music + video from a short prompt
///
/// A missing or malformed JSON body is treated as `{}`.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> StudioResult<Json<GenerateResponse>> {
    let start = Instant::now();
    let mut usage = UsageRecord {
        endpoint: "/generate".to_string(),
        ..Default::default()
    };

    let result = match body {
        Ok(body) => {
            let request: GenerateRequest = serde_json::from_slice(&body).unwrap_or_default();
            usage.user_id = request.user_id.clone();
            usage.session_id = request.session_id.clone();
            usage.prompt = request.prompt.clone();
            state.studio.generate(request).await
        }
        Err(rejection) => Err(body_error(
            &state.config,
            rejection.status(),
            rejection.body_text(),
        )),
    };

    usage.success = result.is_ok();
    usage.error_message = result.as_ref().err().map(|e| e.to_string());
    usage.response_time_ms = elapsed_ms(start);
    state.track(usage).await;

    result.map(Json)
}

/// Accept an audio upload (multipart field `audio`) and return a transcript
pub async fn asr(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> StudioResult<Json<AsrResponse>> {
    let start = Instant::now();
    let result = transcribe_upload(&state, multipart).await;

    state
        .track(UsageRecord {
            endpoint: "/asr".to_string(),
            success: result.is_ok(),
            error_message: result.as_ref().err().map(|e| e.to_string()),
            response_time_ms: elapsed_ms(start),
            ..Default::default()
        })
        .await;

    result.map(|transcript| Json(AsrResponse { transcript }))
}

async fn transcribe_upload(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> StudioResult<String> {
    let config = &state.config;
    let missing = || StudioError::Validation("audio file required (key=audio)".to_string());
    let mut multipart = multipart.map_err(|_| missing())?;

    let mut audio = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(config, "Invalid multipart body", e))?
    {
        if field.name() == Some("audio") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| multipart_error(config, "Invalid audio upload", e))?;
            audio = Some(bytes);
            break;
        }
    }
    let audio = audio.ok_or_else(missing)?;

    let path = config
        .output_dir
        .join(format!("asr_{}.wav", Uuid::new_v4().simple()));
    tokio::fs::write(&path, &audio).await?;
    tracing::info!("🎙️ Saved {} bytes of audio to {}", audio.len(), path.display());

    state.transcriber.transcribe(&path).await
}

/// List recent generations, newest first
pub async fn list_content(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ContentListQuery>, QueryRejection>,
) -> StudioResult<Json<serde_json::Value>> {
    let Query(query) = query.map_err(|e| StudioError::Validation(e.body_text()))?;
    let (limit, offset) = query.clamped();
    let records = state.store.list_content(limit, offset).await?;
    let total = state.store.count_content().await?;

    let items: Vec<ContentDetail> = records.into_iter().map(ContentDetail::from).collect();

    Ok(Json(serde_json::json!({
        "items": items,
        "total": total,
        "limit": limit,
        "offset": offset,
    })))
}

/// Get one generation by id
pub async fn get_content(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> StudioResult<Json<ContentDetail>> {
    let record = state
        .store
        .get_content(&id)
        .await?
        .ok_or(StudioError::NotFound(id))?;

    Ok(Json(record.into()))
}

/// Usage statistics per endpoint
pub async fn get_statistics(
    State(state): State<Arc<AppState>>,
) -> StudioResult<Json<UsageSummaryResponse>> {
    let endpoints = state.store.usage_summary().await?;
    let total_calls = endpoints.iter().map(|e| e.calls).sum();

    Ok(Json(UsageSummaryResponse {
        total_calls,
        endpoints,
    }))
}
