//! Speech recognition for uploaded audio

use crate::error::{StudioError, StudioResult};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;

/// Produces a transcript for a saved audio file
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio_path: &Path) -> StudioResult<String>;

    fn name(&self) -> &'static str;
}

/// Placeholder used when no ASR service is configured
pub struct StubTranscriber;

#[async_trait]
impl Transcriber for StubTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> StudioResult<String> {
        let file_name = audio_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(format!("[ASR_STUB] saved to {} - implement ASR integration", file_name))
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

#[derive(Debug, Deserialize)]
struct TranscribeResponse {
    transcript: String,
}

/// Client for an external speech recognition service
pub struct AsrClient {
    client: Client,
    base_url: String,
}

impl AsrClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn transcribe_url(&self) -> String {
        format!("{}/transcribe", self.base_url)
    }
}

#[async_trait]
impl Transcriber for AsrClient {
    async fn transcribe(&self, audio_path: &Path) -> StudioResult<String> {
        let bytes = tokio::fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio.wav".to_string());

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("audio/wav")
            .map_err(|e| StudioError::Asr(format!("Invalid upload: {}", e)))?;

        let response = self
            .client
            .post(self.transcribe_url())
            .multipart(Form::new().part("audio", part))
            .send()
            .await
            .map_err(|e| StudioError::Asr(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StudioError::Asr(format!("Transcription failed: {} - {}", status, body)));
        }

        let result: TranscribeResponse = response
            .json()
            .await
            .map_err(|e| StudioError::Asr(format!("Parse failed: {}", e)))?;

        Ok(result.transcript)
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}
