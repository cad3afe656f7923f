//! Models module

pub mod generation;
pub mod content;
pub mod usage;
pub mod asr;

pub use generation::*;
pub use content::*;
pub use usage::*;
pub use asr::*;
