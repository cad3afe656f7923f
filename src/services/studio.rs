//! Generation pipeline
//!
//! Prompt → lyrics → music → animation, then persists the result.

use crate::config::Config;
use crate::error::{StudioError, StudioResult};
use crate::generators::{AnimationGenerator, MusicGenerator, PoemGenerator, VideoRenderer};
use crate::models::{
    file_url, GenerateRequest, GenerateResponse, Mode, MusicSection, NewContent, PoemSection,
    VideoSection,
};
use crate::store::ContentStore;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Validated generation input
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationInput {
    pub prompt: String,
    pub mode: Mode,
}

impl GenerationInput {
    pub fn from_request(request: &GenerateRequest) -> StudioResult<Self> {
        let prompt = request.prompt.as_deref().unwrap_or_default().trim();
        if prompt.is_empty() {
            return Err(StudioError::Validation("prompt is required".to_string()));
        }

        let mode = match request.mode.as_deref() {
            None => Mode::default(),
            Some(raw) => Mode::from_str(raw).ok_or_else(|| {
                StudioError::Validation(format!("mode must be one of poem, song, both (got {:?})", raw))
            })?,
        };

        Ok(Self {
            prompt: prompt.to_string(),
            mode,
        })
    }
}

/// Orchestrates the generators and the content store
pub struct Studio {
    store: ContentStore,
    poem: PoemGenerator,
    music: MusicGenerator,
    animation: AnimationGenerator,
}

impl Studio {
    pub fn new(config: &Config, store: ContentStore, renderer: Arc<dyn VideoRenderer>) -> Self {
        Self {
            store,
            poem: PoemGenerator::new(),
            music: MusicGenerator::new(config.output_dir.clone(), config.sample_rate, config.clip_seconds),
            animation: AnimationGenerator::new(config.output_dir.clone(), renderer),
        }
    }

    /// Generate lyrics, music and video for one prompt
    pub async fn generate(&self, request: GenerateRequest) -> StudioResult<GenerateResponse> {
        let input = GenerationInput::from_request(&request)?;
        let task_id = Uuid::new_v4().simple().to_string();

        tracing::info!("🎨 Generating {} for prompt {:?} (id {})", input.mode.as_str(), input.prompt, task_id);

        // 1) Lyrics
        let poem_text = self.poem.generate(&input.prompt, input.mode);

        // 2) Music, seeded by the lyrics
        let music = self
            .music
            .generate(&input.prompt, Some(poem_text.as_str()), &task_id)
            .await?;

        // 3) Animation with the music attached, 4) persist
        let saved = async {
            let video = self
                .animation
                .generate(
                    &input.prompt,
                    Some(poem_text.as_str()),
                    Some(music.path.as_path()),
                    Some(task_id.as_str()),
                )
                .await?;

            self.store
                .save_content(&NewContent {
                    content_id: task_id.clone(),
                    prompt: input.prompt.clone(),
                    style: input.mode.as_str().to_string(),
                    poem_text: poem_text.clone(),
                    music: music.clone(),
                    video: video.clone(),
                    user_id: request.user_id.clone(),
                    session_id: request.session_id.clone(),
                })
                .await?;

            Ok::<_, StudioError>(video)
        }
        .await;

        let video = match saved {
            Ok(video) => video,
            Err(e) => {
                let video_path = self.animation.output_path(Some(task_id.as_str()));
                discard(&[music.path.as_path(), video_path.as_path()]).await;
                return Err(e);
            }
        };

        tracing::info!("✅ Generation {} complete ({} bpm, {:.2}s video)", task_id, music.bpm, video.duration);

        Ok(GenerateResponse {
            id: task_id,
            prompt: input.prompt,
            poem: PoemSection { text: poem_text },
            music: MusicSection {
                file: file_url(&music.file),
                duration: music.duration,
                bpm: music.bpm,
            },
            video: VideoSection {
                file: file_url(&video.file),
                duration: video.duration,
            },
        })
    }
}

/// Remove files left behind by a failed generation
async fn discard(paths: &[&Path]) {
    for path in paths {
        match tokio::fs::remove_file(path).await {
            Ok(()) => tracing::warn!("🧹 Removed orphaned {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("⚠️ Failed to remove {}: {}", path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::RenderPlan;
    use async_trait::async_trait;
    use std::path::PathBuf;

    /// Writes a partial clip, then fails like a crashed ffmpeg
    struct FailingRenderer;

    #[async_trait]
    impl VideoRenderer for FailingRenderer {
        async fn render(&self, plan: &RenderPlan) -> StudioResult<()> {
            tokio::fs::write(&plan.output, b"partial").await?;
            Err(StudioError::Generation("ffmpeg exited with 1".to_string()))
        }
    }

    struct PlaceholderRenderer;

    #[async_trait]
    impl VideoRenderer for PlaceholderRenderer {
        async fn render(&self, plan: &RenderPlan) -> StudioResult<()> {
            tokio::fs::write(&plan.output, b"mp4").await?;
            Ok(())
        }
    }

    fn config(output_dir: &Path) -> Config {
        Config {
            port: 0,
            host: "127.0.0.1".to_string(),
            database_url: "sqlite::memory:".to_string(),
            output_dir: PathBuf::from(output_dir),
            ffmpeg_path: "ffmpeg".to_string(),
            font_file: None,
            sample_rate: 8000,
            clip_seconds: 1.0,
            asr_service_url: None,
            max_upload_bytes: 1024 * 1024,
        }
    }

    fn files_in(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect()
    }

    fn request(prompt: Option<&str>, mode: Option<&str>) -> GenerateRequest {
        GenerateRequest {
            prompt: prompt.map(String::from),
            mode: mode.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_input_requires_prompt() {
        for prompt in [None, Some(""), Some("   \n")] {
            let err = GenerationInput::from_request(&request(prompt, None)).unwrap_err();
            assert_eq!(err.to_string(), "prompt is required");
        }
    }

    #[test]
    fn test_input_trims_and_defaults_mode() {
        let input = GenerationInput::from_request(&request(Some("  drums "), None)).unwrap();
        assert_eq!(input.prompt, "drums");
        assert_eq!(input.mode, Mode::Both);
    }

    #[test]
    fn test_input_parses_mode() {
        let input = GenerationInput::from_request(&request(Some("drums"), Some("Song"))).unwrap();
        assert_eq!(input.mode, Mode::Song);

        let err = GenerationInput::from_request(&request(Some("drums"), Some("opera"))).unwrap_err();
        assert!(matches!(err, StudioError::Validation(_)));
    }

    #[tokio::test]
    async fn test_generate_persists_result() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let store = ContentStore::connect(&config.sqlite_url()).await.unwrap();
        store.init_schema().await.unwrap();
        let studio = Studio::new(&config, store.clone(), Arc::new(PlaceholderRenderer));

        let response = studio.generate(request(Some("drums"), Some("poem"))).await.unwrap();
        let record = store.get_content(&response.id).await.unwrap().unwrap();
        assert_eq!(record.prompt, "drums");

        let mut files = files_in(dir.path());
        files.sort();
        assert_eq!(
            files,
            vec![
                format!("music_{}.wav", response.id),
                format!("video_{}.mp4", response.id),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_render_removes_music() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let store = ContentStore::connect(&config.sqlite_url()).await.unwrap();
        store.init_schema().await.unwrap();
        let studio = Studio::new(&config, store.clone(), Arc::new(FailingRenderer));

        let err = studio.generate(request(Some("drums"), None)).await.unwrap_err();
        assert!(matches!(err, StudioError::Generation(_)));
        assert!(files_in(dir.path()).is_empty());
        assert_eq!(store.count_content().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_save_removes_media() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        // No schema, so the insert fails
        let store = ContentStore::connect(&config.sqlite_url()).await.unwrap();
        let studio = Studio::new(&config, store, Arc::new(PlaceholderRenderer));

        let err = studio.generate(request(Some("drums"), None)).await.unwrap_err();
        assert!(matches!(err, StudioError::Database(_)));
        assert!(files_in(dir.path()).is_empty());
    }
}
