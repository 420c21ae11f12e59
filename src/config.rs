//! Configuration management for SentiFlow
//!
//! TOML-based configuration with defaults, environment overrides and validation.
//! Location: ~/.sentiflow/config.toml

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::{Result, SentiflowError};
use crate::providers::{gemini, ollama};
use crate::types::GenerationConfig;

/// Models tried after the primary, in order
pub const DEFAULT_FALLBACK_MODELS: [&str; 2] = ["gemini-1.5-flash", "gemini-1.5-flash-8b"];

/// Complete configuration for SentiFlow
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub generation: GenerationSettings,
    pub embedding: EmbeddingSettings,
    pub retrieval: RetrievalSettings,
    pub sessions: SessionSettings,
    pub elastic: ElasticConfig,
    pub gemini: GeminiConfig,
    pub ollama: OllamaConfig,
}

/// Which backend serves a provider role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    Ollama,
}

/// Generation provider and fallback chain configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub provider: ProviderKind,
    /// Configured primary model; skipped when unset
    pub primary_model: Option<String>,
    pub fallback_models: Vec<String>,
    /// Model used for sentiment classification (defaults to the first model of the chain)
    pub sentiment_model: Option<String>,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
    /// Attempts per model
    pub max_attempts: u32,
    /// Rate-limit backoff grows by this step per attempt
    pub backoff_step_ms: u64,
}

/// Embedding provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub provider: ProviderKind,
    pub model: String,
    pub dimension: usize,
}

/// Default retrieval parameters used by the chat facade
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub k: usize,
    pub semantic_weight: f64,
    pub keyword_weight: f64,
}

/// Conversation pool limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Live conversations kept before the least recently used is dropped
    pub max_conversations: usize,
}

/// Elasticsearch connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ElasticConfig {
    pub url: Option<String>,
    pub cloud_id: Option<String>,
    pub api_key: Option<String>,
    pub index: String,
    pub timeout_secs: u64,
}

/// Gemini API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

/// Ollama connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub base_url: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Gemini,
            primary_model: Some("gemini-2.0-flash-exp".to_string()),
            fallback_models: DEFAULT_FALLBACK_MODELS.iter().map(|m| m.to_string()).collect(),
            sentiment_model: None,
            temperature: 0.7,
            top_p: 0.9,
            top_k: 40,
            max_output_tokens: 512,
            max_attempts: 2,
            backoff_step_ms: 1500,
        }
    }
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Gemini,
            model: gemini::DEFAULT_EMBEDDING_MODEL.to_string(),
            dimension: 768,
        }
    }
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            k: 3,
            semantic_weight: 0.6,
            keyword_weight: 0.4,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_conversations: 1000,
        }
    }
}

impl Default for ElasticConfig {
    fn default() -> Self {
        Self {
            url: None,
            cloud_id: None,
            api_key: None,
            index: "sentiflow-kb".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: gemini::DEFAULT_GEMINI_URL.to_string(),
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: ollama::DEFAULT_OLLAMA_URL.to_string(),
        }
    }
}

impl GenerationSettings {
    /// Sampling parameters for the text generator
    pub fn sampling(&self) -> GenerationConfig {
        GenerationConfig {
            temperature: self.temperature,
            top_p: self.top_p,
            top_k: self.top_k,
            max_output_tokens: self.max_output_tokens,
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults, then apply environment overrides
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let mut config = if let Some(config_path) = path {
            Self::read_file(&config_path)?
        } else {
            Self::load_default()?
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let config = Self::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SentiflowError::Config(format!("Failed to read config: {}", e)))?;

        toml::from_str(&contents)
            .map_err(|e| SentiflowError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load from the standard location or use built-in defaults
    fn load_default() -> Result<Self> {
        if let Some(config_path) = Self::default_path() {
            if config_path.exists() {
                return Self::read_file(&config_path);
            }
        }

        Ok(Config::default())
    }

    /// Standard configuration file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".sentiflow").join("config.toml"))
    }

    /// Apply environment overrides; `lookup` is injected so tests stay hermetic
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("GEMINI_API_KEY") {
            self.gemini.api_key = Some(key);
        }
        if let Some(model) = get("GEMINI_MODEL") {
            self.generation.primary_model = Some(model);
        }
        if let Some(model) = get("EMBEDDING_MODEL") {
            self.embedding.model = model;
        }
        if let Some(url) = get("ELASTIC_URL") {
            self.elastic.url = Some(url);
        }
        if let Some(cloud_id) = get("ELASTIC_CLOUD_ID") {
            self.elastic.cloud_id = Some(cloud_id);
        }
        if let Some(key) = get("ELASTIC_API_KEY") {
            self.elastic.api_key = Some(key);
        }
        if let Some(index) = get("ELASTIC_INDEX_NAME") {
            self.elastic.index = index;
        }
        if let Some(url) = get("OLLAMA_URL") {
            self.ollama.base_url = url;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let gen = &self.generation;

        if gen.max_attempts == 0 {
            return Err(SentiflowError::Config(
                "max_attempts must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&gen.temperature) {
            return Err(SentiflowError::Config(
                "temperature must be between 0.0 and 2.0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&gen.top_p) {
            return Err(SentiflowError::Config(
                "top_p must be between 0.0 and 1.0".to_string(),
            ));
        }

        if gen.primary_model.is_none() && gen.fallback_models.is_empty() {
            return Err(SentiflowError::Config(
                "at least one generation model must be configured".to_string(),
            ));
        }

        if self.embedding.dimension == 0 {
            return Err(SentiflowError::Config(
                "embedding dimension must be greater than 0".to_string(),
            ));
        }

        if self.sessions.max_conversations == 0 {
            return Err(SentiflowError::Config(
                "max_conversations must be greater than 0".to_string(),
            ));
        }

        if self.retrieval.semantic_weight < 0.0 || self.retrieval.keyword_weight < 0.0 {
            return Err(SentiflowError::Config(
                "retrieval weights must not be negative".to_string(),
            ));
        }

        Ok(())
    }

    /// Credentials the selected providers need but that are not set
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();

        let uses_gemini = self.generation.provider == ProviderKind::Gemini
            || self.embedding.provider == ProviderKind::Gemini;
        if uses_gemini && self.gemini.api_key.is_none() {
            missing.push("GEMINI_API_KEY");
        }

        if self.elastic.url.is_none() && self.elastic.cloud_id.is_none() {
            missing.push("ELASTIC_URL or ELASTIC_CLOUD_ID");
        }

        if self.elastic.cloud_id.is_some() && self.elastic.api_key.is_none() {
            missing.push("ELASTIC_API_KEY");
        }

        missing
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| SentiflowError::Config(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SentiflowError::Config(format!("Failed to create config dir: {}", e)))?;
        }

        std::fs::write(path, contents)
            .map_err(|e| SentiflowError::Config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.generation.primary_model.as_deref(), Some("gemini-2.0-flash-exp"));
        assert_eq!(config.generation.fallback_models, vec!["gemini-1.5-flash", "gemini-1.5-flash-8b"]);
        assert_eq!(config.generation.max_attempts, 2);
        assert_eq!(config.retrieval.k, 3);
        assert_eq!(config.elastic.index, "sentiflow-kb");
        assert_eq!(config.embedding.dimension, 768);
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_attempts() {
        let mut config = Config::default();
        config.generation.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_temperature() {
        let mut config = Config::default();
        config.generation.temperature = 3.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_no_models() {
        let mut config = Config::default();
        config.generation.primary_model = None;
        config.generation.fallback_models.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_negative_weight() {
        let mut config = Config::default();
        config.retrieval.keyword_weight = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_session_cap() {
        let mut config = Config::default();
        assert_eq!(config.sessions.max_conversations, 1000);
        config.sessions.max_conversations = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("GEMINI_API_KEY", "secret"),
            ("GEMINI_MODEL", "gemini-exp"),
            ("ELASTIC_INDEX_NAME", "kb-test"),
            ("ELASTIC_URL", "  "),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.gemini.api_key.as_deref(), Some("secret"));
        assert_eq!(config.generation.primary_model.as_deref(), Some("gemini-exp"));
        assert_eq!(config.elastic.index, "kb-test");
        assert!(config.elastic.url.is_none());
    }

    #[test]
    fn test_missing_credentials() {
        let mut config = Config::default();
        let missing = config.missing_credentials();
        assert!(missing.contains(&"GEMINI_API_KEY"));
        assert!(missing.contains(&"ELASTIC_URL or ELASTIC_CLOUD_ID"));

        config.gemini.api_key = Some("k".to_string());
        config.elastic.url = Some("http://localhost:9200".to_string());
        assert!(config.missing_credentials().is_empty());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_text = r#"
            [generation]
            provider = "ollama"
            primary_model = "llama3.1:8b"
            fallback_models = []

            [elastic]
            url = "http://localhost:9200"
        "#;
        let config: Config = toml::from_str(toml_text).unwrap();
        assert_eq!(config.generation.provider, ProviderKind::Ollama);
        assert_eq!(config.generation.max_attempts, 2);
        assert!(config.generation.fallback_models.is_empty());
        assert_eq!(config.elastic.index, "sentiflow-kb");
        assert_eq!(config.retrieval.semantic_weight, 0.6);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.retrieval.k = 7;
        config.save(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.retrieval.k, 7);
    }

    #[test]
    fn test_sampling_from_settings() {
        let sampling = GenerationSettings::default().sampling();
        assert_eq!(sampling, GenerationConfig::default());
    }
}
