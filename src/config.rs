use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ResearchError, Result};

pub const ENV_BASE_URL: &str = "ARCH_RESEARCH_BASE_URL";
pub const ENV_MODEL: &str = "ARCH_RESEARCH_MODEL";
pub const ENV_API_KEY: &str = "ARCH_RESEARCH_API_KEY";

/// Connection settings for the chat-completions backend.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout_secs: u64,
    pub api_key: Option<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:1234".into(),
            model: "local-model".into(),
            temperature: 0.7,
            max_tokens: None,
            timeout_secs: 120,
            api_key: None,
        }
    }
}

impl EngineSettings {
    /// Missing file means defaults; a malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&raw).map_err(|e| {
            ResearchError::Config(format!("{}: {}", path.display(), e))
        })?;
        Ok(settings)
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&settings_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(model) = lookup(ENV_MODEL) {
            self.model = model;
        }
        if let Some(key) = lookup(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        self
    }
}

pub fn settings_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("arch_research");
    path.push("engine_settings.json");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = EngineSettings::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(settings, EngineSettings::default());
    }

    #[test]
    fn saved_settings_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("engine_settings.json");
        let settings = EngineSettings {
            model: "qwen2.5-coder".into(),
            max_tokens: Some(512),
            ..EngineSettings::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(EngineSettings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine_settings.json");
        fs::write(&path, r#"{ "model": "mistral" }"#).unwrap();
        let settings = EngineSettings::load_from(&path).unwrap();
        assert_eq!(settings.model, "mistral");
        assert_eq!(settings.base_url, "http://localhost:1234");
    }

    #[test]
    fn malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine_settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            EngineSettings::load_from(&path),
            Err(ResearchError::Config(_))
        ));
    }

    #[test]
    fn overrides_replace_only_present_keys() {
        let settings = EngineSettings::default().with_overrides(|key| match key {
            ENV_MODEL => Some("llama3".into()),
            ENV_API_KEY => Some("secret".into()),
            _ => None,
        });
        assert_eq!(settings.model, "llama3");
        assert_eq!(settings.api_key.as_deref(), Some("secret"));
        assert_eq!(settings.base_url, "http://localhost:1234");
    }
}
