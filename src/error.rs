//! Error types for creative-studio service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StudioError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("Content not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("ASR error: {0}")]
    Asr(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type StudioResult<T> = Result<T, StudioError>;

impl StudioError {
    pub fn status(&self) -> StatusCode {
        match self {
            StudioError::Validation(_) => StatusCode::BAD_REQUEST,
            StudioError::NotFound(_) => StatusCode::NOT_FOUND,
            StudioError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            StudioError::Asr(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for StudioError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let body = Json(serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
