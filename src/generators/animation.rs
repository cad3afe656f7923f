//! Animation generator
//!
//! Lays out a short clip of coloured text frames and hands it to a
//! [`VideoRenderer`]. The production renderer drives `ffmpeg`.

use super::poem::headline;
use super::text::wrap;
use crate::error::{StudioError, StudioResult};
use crate::models::VideoMeta;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::process::Command;

/// Frame background colours, in order
pub const PALETTES: [(u8, u8, u8); 4] = [(20, 160, 255), (200, 50, 120), (60, 180, 75), (255, 150, 20)];

pub const FRAME_COUNT: usize = 3;
pub const FRAME_SIZE: u32 = 720;
pub const FRAME_SECONDS: f32 = 1.0;
pub const FPS: u32 = 24;
pub const WRAP_WIDTH: usize = 30;
pub const TEXT_MARGIN: u32 = 40;
pub const FONT_SIZE: u32 = 28;

/// One still frame of the clip
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub color: (u8, u8, u8),
    pub lines: Vec<String>,
    pub seconds: f32,
    /// Where the renderer may stage the frame text
    pub text_file: PathBuf,
}

impl Frame {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn hex_color(&self) -> String {
        let (r, g, b) = self.color;
        format!("0x{:02x}{:02x}{:02x}", r, g, b)
    }
}

/// Everything a renderer needs to produce the clip
#[derive(Debug, Clone)]
pub struct RenderPlan {
    pub frames: Vec<Frame>,
    pub audio: Option<PathBuf>,
    pub size: u32,
    pub fps: u32,
    pub output: PathBuf,
}

impl RenderPlan {
    pub fn duration(&self) -> f32 {
        self.frames.iter().map(|f| f.seconds).sum()
    }
}

/// Turns a render plan into a video file at `plan.output`
#[async_trait]
pub trait VideoRenderer: Send + Sync {
    async fn render(&self, plan: &RenderPlan) -> StudioResult<()>;
}

/// Renderer that shells out to ffmpeg (H.264 video, AAC audio)
pub struct FfmpegRenderer {
    binary: String,
    font_file: Option<PathBuf>,
}

impl FfmpegRenderer {
    pub fn new(binary: &str, font_file: Option<PathBuf>) -> Self {
        Self {
            binary: binary.to_string(),
            font_file,
        }
    }

    /// Command-line arguments for rendering `plan`
    pub fn command_args(&self, plan: &RenderPlan) -> Vec<String> {
        let mut args: Vec<String> = ["-y", "-hide_banner", "-loglevel", "error"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        for frame in &plan.frames {
            args.push("-f".into());
            args.push("lavfi".into());
            args.push("-i".into());
            args.push(format!(
                "color=c={}:s={}x{}:r={}:d={}",
                frame.hex_color(),
                plan.size,
                plan.size,
                plan.fps,
                frame.seconds
            ));
        }

        if let Some(audio) = &plan.audio {
            args.push("-i".into());
            args.push(audio.to_string_lossy().into_owned());
        }

        let mut graph = Vec::with_capacity(plan.frames.len() + 1);
        let mut labels = String::new();
        for (i, frame) in plan.frames.iter().enumerate() {
            let mut drawtext = format!(
                "[{i}:v]drawtext=textfile={}:fontcolor=white:fontsize={}:x={}:y={}:line_spacing=8:expansion=none",
                quote_filter_value(&frame.text_file.to_string_lossy()),
                FONT_SIZE,
                TEXT_MARGIN,
                TEXT_MARGIN,
            );
            if let Some(font) = &self.font_file {
                drawtext.push_str(&format!(":fontfile={}", quote_filter_value(&font.to_string_lossy())));
            }
            drawtext.push_str(&format!("[v{i}]"));
            graph.push(drawtext);
            labels.push_str(&format!("[v{i}]"));
        }
        graph.push(format!("{}concat=n={}:v=1:a=0[outv]", labels, plan.frames.len()));

        args.push("-filter_complex".into());
        args.push(graph.join(";"));
        args.push("-map".into());
        args.push("[outv]".into());

        if plan.audio.is_some() {
            args.push("-map".into());
            args.push(format!("{}:a", plan.frames.len()));
            args.push("-c:a".into());
            args.push("aac".into());
        }

        args.extend(
            ["-c:v", "libx264", "-pix_fmt", "yuv420p", "-r"]
                .iter()
                .map(|s| s.to_string()),
        );
        args.push(plan.fps.to_string());
        // Audio longer than the frames is cut at the video's end
        args.push("-t".into());
        args.push(format!("{:.2}", plan.duration()));
        args.push(plan.output.to_string_lossy().into_owned());

        args
    }
}

#[async_trait]
impl VideoRenderer for FfmpegRenderer {
    async fn render(&self, plan: &RenderPlan) -> StudioResult<()> {
        for frame in &plan.frames {
            tokio::fs::write(&frame.text_file, frame.text()).await?;
        }

        let args = self.command_args(plan);
        tracing::debug!("Running {} {}", self.binary, args.join(" "));

        let output = Command::new(&self.binary)
            .args(&args)
            .output()
            .await
            .map_err(|e| StudioError::Generation(format!("Failed to launch {}: {}", self.binary, e)));

        for frame in &plan.frames {
            if let Err(e) = tokio::fs::remove_file(&frame.text_file).await {
                tracing::debug!("Could not remove {}: {}", frame.text_file.display(), e);
            }
        }

        let output = output?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StudioError::Generation(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

/// Single-quote a filter option value for an ffmpeg filtergraph
fn quote_filter_value(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Animation generator
pub struct AnimationGenerator {
    output_dir: PathBuf,
    renderer: Arc<dyn VideoRenderer>,
}

impl AnimationGenerator {
    pub fn new(output_dir: PathBuf, renderer: Arc<dyn VideoRenderer>) -> Self {
        Self { output_dir, renderer }
    }

    /// Where the clip for `uid` is written
    pub fn output_path(&self, uid: Option<&str>) -> PathBuf {
        self.output_dir
            .join(format!("video_{}.mp4", uid.unwrap_or("anon")))
    }

    /// Lay out the clip without rendering it
    pub fn plan(
        &self,
        prompt: &str,
        poem_text: Option<&str>,
        music_path: Option<&Path>,
        uid: Option<&str>,
    ) -> RenderPlan {
        let texts = [prompt, poem_text.and_then(headline).unwrap_or_default()];
        let tag = uid.unwrap_or("anon");

        let frames = PALETTES
            .iter()
            .take(FRAME_COUNT)
            .enumerate()
            .map(|(i, color)| {
                let text = texts[i % texts.len()];
                let text = if text.trim().is_empty() { prompt } else { text };
                Frame {
                    color: *color,
                    lines: wrap(text, WRAP_WIDTH),
                    seconds: FRAME_SECONDS,
                    text_file: self.output_dir.join(format!("frame_{}_{}.txt", tag, i)),
                }
            })
            .collect();

        RenderPlan {
            frames,
            audio: music_path.filter(|p| p.exists()).map(Path::to_path_buf),
            size: FRAME_SIZE,
            fps: FPS,
            output: self.output_path(uid),
        }
    }

    /// Render `video_<uid>.mp4`, attaching the music when it exists
    pub async fn generate(
        &self,
        prompt: &str,
        poem_text: Option<&str>,
        music_path: Option<&Path>,
        uid: Option<&str>,
    ) -> StudioResult<VideoMeta> {
        let plan = self.plan(prompt, poem_text, music_path, uid);
        self.renderer.render(&plan).await?;

        let file = plan
            .output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| StudioError::Internal("video output has no file name".to_string()))?;

        Ok(VideoMeta {
            duration: round2(plan.duration()),
            has_audio: plan.audio.is_some(),
            path: plan.output,
            file,
        })
    }
}

fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}
