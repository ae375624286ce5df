//! Application settings and persistence.
//!
//! Settings are persisted to `~/.config/sift/settings.json` (or XDG
//! equivalent) and loaded at startup. API keys never live in the
//! settings file; they come from the environment.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::providers::ai::{Tone, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE};

/// Environment variable holding the generation API key.
pub const AI_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
/// Environment variable holding the store API key.
pub const STORE_API_KEY_ENV: &str = "SIFT_STORE_KEY";

/// Errors from loading or saving settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no config directory available on this platform")]
    NoConfigDir,
}

/// Top-level application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Name drafts are written on behalf of.
    #[serde(default)]
    pub user_name: Option<String>,
    /// Default tone for generated drafts.
    #[serde(default)]
    pub tone: Tone,
    /// Draft generation configuration.
    #[serde(default)]
    pub ai: AiSettings,
    /// Remote store configuration.
    #[serde(default)]
    pub store: StoreSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user_name: None,
            tone: Tone::default(),
            ai: AiSettings::default(),
            store: StoreSettings::default(),
        }
    }
}

/// Draft generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiSettings {
    /// Model identifier.
    pub model: String,
    /// Maximum tokens per draft.
    pub max_tokens: usize,
    /// Sampling temperature (0.0 to 1.0).
    pub temperature: f32,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Remote store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Base URL of the hosted store.
    pub url: String,
}

impl Settings {
    /// Path of the settings file in the platform config directory.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dirs = ProjectDirs::from("", "", "sift").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("settings.json"))
    }

    /// Loads settings from `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Loads settings from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path()?)
    }

    /// Writes settings to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Writes settings to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::default_path()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_provider_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.ai.model, DEFAULT_MODEL);
        assert_eq!(settings.ai.max_tokens, 500);
        assert_eq!(settings.tone, Tone::Professional);
        assert!(settings.user_name.is_none());
    }

    #[test]
    fn settings_roundtrip_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = Settings::default();
        settings.user_name = Some("Jonas".into());
        settings.tone = Tone::Concise;
        settings.store.url = "https://store.example.com".into();
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded.user_name.as_deref(), Some("Jonas"));
        assert_eq!(loaded.tone, Tone::Concise);
        assert_eq!(loaded.store.url, "https://store.example.com");
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Settings::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded.ai.model, DEFAULT_MODEL);
    }

    #[test]
    fn malformed_file_is_an_error_not_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            Settings::load_from(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"user_name":"Jonas"}"#).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded.user_name.as_deref(), Some("Jonas"));
        assert_eq!(loaded.ai.model, DEFAULT_MODEL);
        assert_eq!(loaded.store.url, "");
    }
}
