//! Speech recognition models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsrResponse {
    pub transcript: String,
}
