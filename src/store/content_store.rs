//! SQLite store for generated content and usage statistics

use crate::error::StudioResult;
use crate::models::{ContentRecord, EndpointUsage, NewContent, UsageRecord};
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS content (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        content_id TEXT UNIQUE NOT NULL,
        prompt TEXT NOT NULL,
        style TEXT,
        poem_data TEXT,
        music_data TEXT,
        animation_data TEXT,
        user_id TEXT,
        session_id TEXT,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS usage_stats (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        endpoint TEXT NOT NULL,
        user_id TEXT,
        session_id TEXT,
        prompt TEXT,
        success BOOLEAN DEFAULT TRUE,
        error_message TEXT,
        response_time_ms INTEGER,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_content_user_id ON content(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_content_session_id ON content(session_id)",
    "CREATE INDEX IF NOT EXISTS idx_content_created_at ON content(created_at)",
    "CREATE INDEX IF NOT EXISTS idx_usage_stats_endpoint ON usage_stats(endpoint)",
    "CREATE INDEX IF NOT EXISTS idx_usage_stats_created_at ON usage_stats(created_at)",
];

/// Store for the `content` and `usage_stats` tables
#[derive(Clone)]
pub struct ContentStore {
    pool: SqlitePool,
}

impl ContentStore {
    /// Open (creating if needed) the database at `url`
    ///
    /// Accepts `sqlite://path/to.db` and `sqlite::memory:`.
    pub async fn connect(url: &str) -> StudioResult<Self> {
        tracing::info!("🗄️ Opening SQLite database at: {}", url);

        let in_memory = url.contains(":memory:");
        if !in_memory {
            let path = url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }

        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        // Every connection to `:memory:` is its own database
        let max_connections = if in_memory { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Create tables and indexes if they do not exist yet
    pub async fn init_schema(&self) -> StudioResult<()> {
        let mut tx = self.pool.begin().await?;
        for statement in SCHEMA {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;

        tracing::info!("✅ Database initialized successfully");
        Ok(())
    }

    /// Cheap connectivity check for the health endpoint
    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    /// Insert a generation result
    pub async fn save_content(&self, content: &NewContent) -> StudioResult<i64> {
        let music_data = serde_json::to_string(&content.music)?;
        let animation_data = serde_json::to_string(&content.video)?;
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO content (
                content_id, prompt, style, poem_data, music_data, animation_data,
                user_id, session_id, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&content.content_id)
        .bind(&content.prompt)
        .bind(&content.style)
        .bind(&content.poem_text)
        .bind(music_data)
        .bind(animation_data)
        .bind(&content.user_id)
        .bind(&content.session_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Look up a generation by its public id
    pub async fn get_content(&self, content_id: &str) -> StudioResult<Option<ContentRecord>> {
        let record = sqlx::query_as::<_, ContentRecord>(
            r#"
            SELECT id, content_id, prompt, style, poem_data, music_data, animation_data,
                   user_id, session_id, created_at, updated_at
            FROM content
            WHERE content_id = ?
            "#,
        )
        .bind(content_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Newest generations first
    pub async fn list_content(&self, limit: i64, offset: i64) -> StudioResult<Vec<ContentRecord>> {
        let records = sqlx::query_as::<_, ContentRecord>(
            r#"
            SELECT id, content_id, prompt, style, poem_data, music_data, animation_data,
                   user_id, session_id, created_at, updated_at
            FROM content
            ORDER BY created_at DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn count_content(&self) -> StudioResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM content")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Append one row to `usage_stats`
    pub async fn record_usage(&self, usage: &UsageRecord) -> StudioResult<()> {
        sqlx::query(
            r#"
            INSERT INTO usage_stats (
                endpoint, user_id, session_id, prompt, success,
                error_message, response_time_ms, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&usage.endpoint)
        .bind(&usage.user_id)
        .bind(&usage.session_id)
        .bind(&usage.prompt)
        .bind(usage.success)
        .bind(&usage.error_message)
        .bind(usage.response_time_ms)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Per-endpoint call counts and mean latency
    pub async fn usage_summary(&self) -> StudioResult<Vec<EndpointUsage>> {
        let rows = sqlx::query_as::<_, EndpointUsage>(
            r#"
            SELECT endpoint,
                   COUNT(*) AS calls,
                   SUM(CASE WHEN success THEN 1 ELSE 0 END) AS successes,
                   SUM(CASE WHEN success THEN 0 ELSE 1 END) AS failures,
                   COALESCE(AVG(response_time_ms), 0.0) AS avg_response_time_ms
            FROM usage_stats
            GROUP BY endpoint
            ORDER BY endpoint
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StudioError;
    use crate::models::{MusicMeta, VideoMeta};
    use std::path::PathBuf;

    async fn memory_store() -> ContentStore {
        let store = ContentStore::connect("sqlite::memory:").await.unwrap();
        store.init_schema().await.unwrap();
        store
    }

    fn sample_content(content_id: &str) -> NewContent {
        NewContent {
            content_id: content_id.to_string(),
            prompt: "a night of rhythm and colors".to_string(),
            style: "both".to_string(),
            poem_text: "A night of rhythm and colors".to_string(),
            music: MusicMeta {
                path: PathBuf::from("generated_files/music_x.wav"),
                file: format!("music_{}.wav", content_id),
                bpm: 120,
                duration: 3.0,
                sample_rate: 22050,
            },
            video: VideoMeta {
                path: PathBuf::from("generated_files/video_x.mp4"),
                file: format!("video_{}.mp4", content_id),
                duration: 3.0,
                has_audio: true,
            },
            user_id: Some("user-1".to_string()),
            session_id: None,
        }
    }

    #[tokio::test]
    async fn test_init_schema_is_idempotent() {
        let store = memory_store().await;
        store.init_schema().await.unwrap();
        assert!(store.ping().await);
    }

    #[tokio::test]
    async fn test_save_and_get_content() {
        let store = memory_store().await;
        store.save_content(&sample_content("abc")).await.unwrap();

        let record = store.get_content("abc").await.unwrap().unwrap();
        assert_eq!(record.prompt, "a night of rhythm and colors");
        assert_eq!(record.style.as_deref(), Some("both"));
        assert_eq!(record.user_id.as_deref(), Some("user-1"));

        let music: serde_json::Value =
            serde_json::from_str(record.music_data.as_deref().unwrap()).unwrap();
        assert_eq!(music["bpm"], 120);
        assert_eq!(music["file"], "music_abc.wav");

        assert!(store.get_content("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_content_id_is_unique() {
        let store = memory_store().await;
        store.save_content(&sample_content("dup")).await.unwrap();
        let second = store.save_content(&sample_content("dup")).await;
        assert!(matches!(second, Err(StudioError::Database(_))));
    }

    #[tokio::test]
    async fn test_list_content_newest_first() {
        let store = memory_store().await;
        for id in ["first", "second", "third"] {
            store.save_content(&sample_content(id)).await.unwrap();
        }

        let records = store.list_content(2, 0).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].content_id, "third");
        assert_eq!(records[1].content_id, "second");

        let rest = store.list_content(2, 2).await.unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].content_id, "first");
        assert_eq!(store.count_content().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_usage_summary() {
        let store = memory_store().await;
        let ok = UsageRecord {
            endpoint: "/generate".to_string(),
            success: true,
            response_time_ms: 10,
            ..Default::default()
        };
        let failed = UsageRecord {
            endpoint: "/generate".to_string(),
            success: false,
            error_message: Some("prompt is required".to_string()),
            response_time_ms: 30,
            ..Default::default()
        };
        let asr = UsageRecord {
            endpoint: "/asr".to_string(),
            success: true,
            response_time_ms: 5,
            ..Default::default()
        };
        for usage in [&ok, &failed, &asr] {
            store.record_usage(usage).await.unwrap();
        }

        let summary = store.usage_summary().await.unwrap();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].endpoint, "/asr");
        assert_eq!(summary[1].endpoint, "/generate");
        assert_eq!(summary[1].calls, 2);
        assert_eq!(summary[1].successes, 1);
        assert_eq!(summary[1].failures, 1);
        assert!((summary[1].avg_response_time_ms - 20.0).abs() < 0.001);
    }
}
