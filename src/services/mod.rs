//! Services module

pub mod studio;
pub mod transcriber;

pub use studio::Studio;
pub use transcriber::{AsrClient, StubTranscriber, Transcriber};
