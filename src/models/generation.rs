//! Generation request and response models

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Lyric layout requested by the client
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Poem,
    Song,
    #[default]
    Both,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Poem => "poem",
            Mode::Song => "song",
            Mode::Both => "both",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "poem" => Some(Mode::Poem),
            "song" => Some(Mode::Song),
            "both" => Some(Mode::Both),
            _ => None,
        }
    }
}

/// Body of `POST /generate`
#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    pub prompt: Option<String>,
    pub mode: Option<String>,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
}

/// Structured result of a generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub id: String,
    pub prompt: String,
    pub poem: PoemSection,
    pub music: MusicSection,
    pub video: VideoSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoemSection {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MusicSection {
    pub file: String,
    pub duration: f32,
    pub bpm: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoSection {
    pub file: String,
    pub duration: f32,
}

/// Audio clip written by the music generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MusicMeta {
    #[serde(skip)]
    pub path: PathBuf,
    pub file: String,
    pub bpm: u32,
    pub duration: f32,
    pub sample_rate: u32,
}

/// Video clip written by the animation generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMeta {
    #[serde(skip)]
    pub path: PathBuf,
    pub file: String,
    pub duration: f32,
    pub has_audio: bool,
}

/// URL under which a generated file is served
pub fn file_url(file_name: &str) -> String {
    format!("/files/{}", file_name)
}
