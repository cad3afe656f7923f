//! Content generators

pub mod text;
pub mod poem;
pub mod music;
pub mod animation;

pub use poem::PoemGenerator;
pub use music::MusicGenerator;
pub use animation::{AnimationGenerator, FfmpegRenderer, RenderPlan, VideoRenderer};
