//! Pipeline settings
//!
//! Stored as plain JSON next to nothing sensitive except an optional API key;
//! the key is normally taken from `OPENAI_API_KEY` instead.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{AgentError, AgentResult};

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Settings file version
    pub version: u32,
    /// OpenAPI spec to plan against
    pub spec_url: String,
    /// Chat model name
    pub model: String,
    /// Base URL of the OpenAI-compatible API
    pub api_base: String,
    /// API key, falls back to `OPENAI_API_KEY`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Timeout for model requests in seconds
    pub timeout_secs: u64,
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self {
            version: 1,
            spec_url: "https://raw.githubusercontent.com/open-meteo/open-meteo/refs/heads/main/openapi.yml"
                .to_string(),
            model: "gpt-4o-mini".to_string(),
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }

    /// API key from settings, else from `OPENAI_API_KEY`
    pub fn effective_api_key(&self) -> Option<String> {
        self.api_key_or(std::env::var("OPENAI_API_KEY").ok())
    }

    /// API key from settings, else `fallback`; empty keys count as unset
    pub fn api_key_or(&self, fallback: Option<String>) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.is_empty())
            .or_else(|| fallback.filter(|key| !key.is_empty()))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

/// Settings manager
pub struct SettingsManager {
    settings_file: PathBuf,
    settings: Settings,
}

impl SettingsManager {
    /// Create a settings manager rooted at `config_dir`
    pub fn new(config_dir: &Path) -> Self {
        let settings_file = config_dir.join("settings.json");
        let settings = Self::load_from_file(&settings_file).unwrap_or_else(|e| {
            debug!("Ignoring unreadable settings file {:?}: {}", settings_file, e);
            Settings::new()
        });

        Self {
            settings_file,
            settings,
        }
    }

    /// Default per-user configuration directory
    pub fn default_dir() -> AgentResult<PathBuf> {
        ProjectDirs::from("com", "symbia-labs", "openapi-pull")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or_else(|| AgentError::SettingsError("Could not determine config directory".to_string()))
    }

    /// Load settings from file
    fn load_from_file(path: &Path) -> AgentResult<Settings> {
        if !path.exists() {
            debug!("No settings file found, using defaults");
            return Ok(Settings::new());
        }

        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&contents)?;
        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Save settings to file
    pub async fn save(&self) -> AgentResult<()> {
        let contents = serde_json::to_string_pretty(&self.settings)?;

        if let Some(parent) = self.settings_file.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write atomically using temp file
        let temp_path = self.settings_file.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents).await?;
        tokio::fs::rename(&temp_path, &self.settings_file).await?;

        debug!("Saved settings to {:?}", self.settings_file);
        Ok(())
    }

    /// Get current settings
    pub fn get(&self) -> &Settings {
        &self.settings
    }

    /// Get mutable settings
    pub fn get_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Consume the manager, keeping the settings
    pub fn into_settings(self) -> Settings {
        self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_settings_default() {
        let temp_dir = TempDir::new().unwrap();
        let manager = SettingsManager::new(temp_dir.path());

        let settings = manager.get();
        assert_eq!(settings.model, "gpt-4o-mini");
        assert_eq!(settings.timeout_secs, 30);
        assert!(settings.spec_url.ends_with("openapi.yml"));
    }

    #[tokio::test]
    async fn test_settings_persistence() {
        let temp_dir = TempDir::new().unwrap();

        {
            let mut manager = SettingsManager::new(temp_dir.path());
            manager.get_mut().spec_url = "https://api.example.com/openapi.json".to_string();
            manager.get_mut().timeout_secs = 60;
            manager.save().await.unwrap();
        }

        let manager = SettingsManager::new(temp_dir.path());
        assert_eq!(manager.get().spec_url, "https://api.example.com/openapi.json");
        assert_eq!(manager.get().timeout_secs, 60);
        assert_eq!(manager.get().model, "gpt-4o-mini");
    }

    #[test]
    fn test_partial_file_uses_defaults_for_missing_fields() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("settings.json"),
            r#"{"specUrl": "https://petstore.example.com/openapi.yaml"}"#,
        )
        .unwrap();

        let settings = SettingsManager::new(temp_dir.path()).into_settings();
        assert_eq!(settings.spec_url, "https://petstore.example.com/openapi.yaml");
        assert_eq!(settings.api_base, "https://api.openai.com/v1");
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("settings.json"), "not json").unwrap();

        let settings = SettingsManager::new(temp_dir.path()).into_settings();
        assert_eq!(settings, Settings::new());
    }

    #[test]
    fn test_configured_api_key_wins() {
        let settings = Settings {
            api_key: Some("sk-configured".to_string()),
            ..Settings::new()
        };
        assert_eq!(settings.effective_api_key().as_deref(), Some("sk-configured"));
        assert_eq!(
            settings.api_key_or(Some("sk-env".to_string())).as_deref(),
            Some("sk-configured")
        );
    }

    #[test]
    fn test_api_key_fallback() {
        let settings = Settings {
            api_key: Some(String::new()),
            ..Settings::new()
        };
        assert_eq!(settings.api_key_or(Some("sk-env".to_string())).as_deref(), Some("sk-env"));
        assert_eq!(settings.api_key_or(Some(String::new())), None);
        assert_eq!(settings.api_key_or(None), None);
    }
}
