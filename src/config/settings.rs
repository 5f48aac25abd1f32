//! Configuration settings for Jarvis.

use super::prompts::AgentPrompts;
use crate::error::{JarvisError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub openai: OpenAISettings,
    pub model: ModelSettings,
    pub embedding: EmbeddingSettings,
    pub vector_store: VectorStoreSettings,
    pub retry: RetrySettings,
    pub agent: AgentSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level used when no -v flag is given (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.jarvis".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Connection settings shared by the chat and embedding clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAISettings {
    /// Base URL of the OpenAI-compatible API.
    pub api_base: String,
    /// API key. When unset, the key is read from `api_key_env`.
    pub api_key: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for OpenAISettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 300,
        }
    }
}

impl OpenAISettings {
    /// Resolve the API key from the config file or the environment.
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.is_empty()) {
            return Ok(key.clone());
        }

        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.is_empty() => Ok(key),
            _ => Err(JarvisError::Config(format!(
                "No API key configured. Set openai.api_key or export {}",
                self.api_key_env
            ))),
        }
    }

    /// Validate and return the API base URL.
    pub fn api_base_url(&self) -> Result<url::Url> {
        url::Url::parse(&self.api_base).map_err(|e| {
            JarvisError::Config(format!("Invalid openai.api_base '{}': {}", self.api_base, e))
        })
    }
}

/// Chat model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Model identifier sent with every chat request.
    pub name: String,
    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            name: "gpt-3.5-turbo".to_string(),
            temperature: 0.0,
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding model to use.
    pub model: String,
    /// Requested dimensions, for models that support shortening.
    pub dimensions: Option<u32>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "text-embedding-ada-002".to_string(),
            dimensions: None,
        }
    }
}

/// Vector store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreSettings {
    /// Vector store provider (sqlite, memory).
    pub provider: String,
    /// Path to the SQLite index. Empty means in-memory.
    pub sqlite_path: String,
    /// Collection the search tool binds to.
    pub collection: String,
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self {
            provider: "sqlite".to_string(),
            sqlite_path: "~/.jarvis/vectors.db".to_string(),
            collection: "default".to_string(),
        }
    }
}

/// Backoff settings for vector store operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Delay before the first retry, in milliseconds.
    pub base_delay_ms: u64,
    /// Upper bound on any single delay, in milliseconds.
    pub max_delay_ms: u64,
    /// Growth factor between consecutive delays.
    pub multiplier: f64,
    /// Total attempts, including the first one.
    pub max_attempts: u32,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            base_delay_ms: 2_000,
            max_delay_ms: 30_000,
            multiplier: 2.0,
            max_attempts: 5,
        }
    }
}

impl RetrySettings {
    /// Reject a multiplier that would make the backoff shrink or break.
    pub fn validate(&self) -> Result<()> {
        if !self.multiplier.is_finite() || self.multiplier < 0.0 {
            return Err(JarvisError::Config(format!(
                "retry.multiplier must be a non-negative number, got {}",
                self.multiplier
            )));
        }
        Ok(())
    }
}

/// Agent loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Maximum tool invocations per `respond` call. Zero means unbounded.
    pub max_tool_hops: usize,
    /// Result count used by the search tool.
    pub search_limit: usize,
    /// System prompt templates.
    pub prompts: AgentPrompts,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_tool_hops: 10,
            search_limit: 10,
            prompts: AgentPrompts::default(),
        }
    }
}

impl AgentSettings {
    /// Hop cap as passed to the agent.
    pub fn tool_hop_limit(&self) -> Option<usize> {
        (self.max_tool_hops > 0).then_some(self.max_tool_hops)
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            settings.retry.validate()?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| JarvisError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("jarvis")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded SQLite index path, or None for an in-memory index.
    pub fn sqlite_path(&self) -> Option<PathBuf> {
        if self.vector_store.provider == "memory" || self.vector_store.sqlite_path.is_empty() {
            None
        } else {
            Some(Self::expand_path(&self.vector_store.sqlite_path))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_retry_multiplier_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[retry]\nbase_delay_ms = 1\nmultiplier = -2.0\n").unwrap();

        let err = Settings::load_from(Some(&path)).unwrap_err();
        assert!(matches!(err, JarvisError::Config(msg) if msg.contains("retry.multiplier")));

        std::fs::write(&path, "[retry]\nmultiplier = 1.5\n").unwrap();
        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.retry.multiplier, 1.5);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [model]
            name = "gpt-4o-mini"

            [retry]
            max_attempts = 3
            "#,
        )
        .unwrap();

        assert_eq!(settings.model.name, "gpt-4o-mini");
        assert_eq!(settings.model.temperature, 0.0);
        assert_eq!(settings.retry.max_attempts, 3);
        assert_eq!(settings.retry.base_delay_ms, 2_000);
        assert_eq!(settings.vector_store.collection, "default");
        assert_eq!(settings.agent.tool_hop_limit(), Some(10));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.vector_store.collection = "restaurants".to_string();
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.vector_store.collection, "restaurants");
    }

    #[test]
    fn test_zero_hops_means_unbounded() {
        let settings: Settings = toml::from_str("[agent]\nmax_tool_hops = 0\n").unwrap();
        assert_eq!(settings.agent.tool_hop_limit(), None);
    }

    #[test]
    fn test_memory_provider_has_no_sqlite_path() {
        let mut settings = Settings::default();
        assert!(settings.sqlite_path().is_some());

        settings.vector_store.provider = "memory".to_string();
        assert!(settings.sqlite_path().is_none());
    }

    #[test]
    fn test_explicit_api_key_wins() {
        let openai = OpenAISettings {
            api_key: Some("sk-test".to_string()),
            api_key_env: "JARVIS_TEST_UNSET_KEY".to_string(),
            ..Default::default()
        };
        assert_eq!(openai.resolve_api_key().unwrap(), "sk-test");

        let missing = OpenAISettings {
            api_key: None,
            api_key_env: "JARVIS_TEST_UNSET_KEY".to_string(),
            ..Default::default()
        };
        assert!(matches!(missing.resolve_api_key(), Err(JarvisError::Config(_))));
    }

    #[test]
    fn test_invalid_api_base_rejected() {
        let openai = OpenAISettings {
            api_base: "not a url".to_string(),
            ..Default::default()
        };
        assert!(openai.api_base_url().is_err());
    }
}
