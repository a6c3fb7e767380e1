//! Configuration loading and saving
//!
//! TOML file under the platform config directory, merged over compiled
//! defaults field by field. A missing or malformed file falls back to
//! defaults rather than failing startup; saving is explicit.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::playback::NarrationOptions;

/// Voice and delivery defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrationConfig {
    pub voice: String,
    /// Speech rate multiplier, 0.5–2.0
    pub rate: f64,
    /// Volume, 0–100
    pub volume: u8,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            voice: "en-US-JennyNeural".to_string(),
            rate: 1.0,
            volume: 100,
        }
    }
}

/// Highlight marker colors, injected into rendered markup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub sentence_color: String,
    pub word_color: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            sentence_color: "#fff3cd".to_string(),
            word_color: "#ffc107".to_string(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LectorConfig {
    pub narration: NarrationConfig,
    pub highlight: HighlightConfig,
}

impl LectorConfig {
    /// Load configuration from `path`, merging with defaults
    ///
    /// Absent or unreadable files yield the defaults; a malformed file is
    /// logged and ignored rather than treated as fatal.
    pub fn load(path: &Path) -> LectorConfig {
        let Ok(contents) = std::fs::read_to_string(path) else {
            return LectorConfig::default();
        };
        match toml::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                warn!("ignoring malformed config {}: {}", path.display(), e);
                LectorConfig::default()
            }
        }
    }

    /// Save configuration to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Narration options derived from this configuration
    pub fn narration_options(&self) -> NarrationOptions {
        NarrationOptions {
            voice: self.narration.voice.clone(),
            rate: self.narration.rate,
            volume: self.narration.volume,
        }
    }
}

/// Default configuration file path for the platform
pub fn default_config_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join("lector").join("config.toml"))
        .ok_or_else(|| Error::Config("could not determine config directory".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shipped_values() {
        let config = LectorConfig::default();
        assert_eq!(config.narration.voice, "en-US-JennyNeural");
        assert_eq!(config.narration.rate, 1.0);
        assert_eq!(config.narration.volume, 100);
        assert_eq!(config.highlight.sentence_color, "#fff3cd");
        assert_eq!(config.highlight.word_color, "#ffc107");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = LectorConfig::load(Path::new("/nonexistent/lector/config.toml"));
        assert_eq!(config.narration.voice, "en-US-JennyNeural");
    }

    #[test]
    fn partial_file_merges_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[narration]\nvoice = \"en-GB-SoniaNeural\"\n").unwrap();

        let config = LectorConfig::load(&path);
        assert_eq!(config.narration.voice, "en-GB-SoniaNeural");
        // Unspecified fields keep their defaults.
        assert_eq!(config.narration.rate, 1.0);
        assert_eq!(config.highlight.word_color, "#ffc107");
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "this is not toml [[[").unwrap();

        let config = LectorConfig::load(&path);
        assert_eq!(config.narration.voice, "en-US-JennyNeural");
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = LectorConfig::default();
        config.narration.rate = 1.5;
        config.highlight.sentence_color = "#abcdef".to_string();
        config.save(&path).unwrap();

        let loaded = LectorConfig::load(&path);
        assert_eq!(loaded.narration.rate, 1.5);
        assert_eq!(loaded.highlight.sentence_color, "#abcdef");
    }
}
