use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::render::RenderStyle;

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub render: RenderStyle,
    pub transcription: TranscriptionConfig,
}

impl AppConfig {
    /// Loads configuration from a JSON file.
    pub fn load(path: &std::path::Path) -> crate::Result<Self> {
        Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
    }
}

/// Configuration for the external transcription collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// Model-size hint forwarded to the helper script.
    pub model_size: String,
    /// Path to the helper script; `None` means look next to the executable.
    pub script: Option<PathBuf>,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            model_size: "base".to_string(),
            script: None,
        }
    }
}
