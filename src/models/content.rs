//! Persisted generation records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{MusicMeta, VideoMeta};

/// Row of the `content` table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContentRecord {
    pub id: i64,
    pub content_id: String,
    pub prompt: String,
    pub style: Option<String>,
    pub poem_data: Option<String>,
    pub music_data: Option<String>,
    pub animation_data: Option<String>,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values for a new `content` row
#[derive(Debug, Clone)]
pub struct NewContent {
    pub content_id: String,
    pub prompt: String,
    pub style: String,
    pub poem_text: String,
    pub music: MusicMeta,
    pub video: VideoMeta,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
}

/// API view of a stored generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentDetail {
    pub id: String,
    pub prompt: String,
    pub style: Option<String>,
    pub poem: Option<String>,
    pub music: serde_json::Value,
    pub video: serde_json::Value,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ContentRecord> for ContentDetail {
    fn from(record: ContentRecord) -> Self {
        Self {
            id: record.content_id,
            prompt: record.prompt,
            style: record.style,
            poem: record.poem_data,
            music: parse_media(record.music_data.as_deref()),
            video: parse_media(record.animation_data.as_deref()),
            user_id: record.user_id,
            session_id: record.session_id,
            created_at: record.created_at,
        }
    }
}

/// Stored media metadata gets its `/files/` URL back
fn parse_media(raw: Option<&str>) -> serde_json::Value {
    let mut value = raw
        .and_then(|s| serde_json::from_str::<serde_json::Value>(s).ok())
        .unwrap_or(serde_json::Value::Null);

    if let Some(file) = value.get("file").and_then(|f| f.as_str()).map(super::file_url) {
        value["url"] = serde_json::json!(file);
    }

    value
}

/// Query string for `GET /content`
#[derive(Debug, Deserialize)]
pub struct ContentListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 { 20 }

pub const MAX_CONTENT_LIMIT: i64 = 100;

impl ContentListQuery {
    pub fn clamped(&self) -> (i64, i64) {
        (self.limit.clamp(1, MAX_CONTENT_LIMIT), self.offset.max(0))
    }
}
