//! Ollama API client for local generation and embeddings
//!
//! - Endpoint: POST /api/generate (non-streaming)
//! - Endpoint: POST /api/embeddings
//! - Asymmetric embeddings via nomic-style instruction prefixes

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::{ProviderError, ProviderResult};
use crate::providers::{http_error, EmbeddingMode, EmbeddingProvider, TextGenerator};
use crate::types::GenerationConfig;

/// Default Ollama API endpoint
pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Default local embedding model (768 dimensions)
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";

/// Request timeout (120 seconds, local models can be slow to load)
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const PROVIDER: &str = "ollama";

/// Ollama HTTP client
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    embedding_model: String,
}

impl OllamaClient {
    /// Create new Ollama client with default settings
    pub fn new() -> ProviderResult<Self> {
        Self::with_config(DEFAULT_OLLAMA_URL, DEFAULT_EMBEDDING_MODEL)
    }

    /// Create Ollama client with custom configuration
    pub fn with_config(base_url: &str, embedding_model: &str) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ProviderError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            embedding_model: embedding_model.to_string(),
        })
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> ProviderResult<R>
    where
        B: Serialize + ?Sized,
        R: for<'de> Deserialize<'de>,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.post(&url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(http_error(PROVIDER, status, &text));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| ProviderError::invalid_response(PROVIDER, e.to_string()))
    }

    /// Check if Ollama is available
    pub async fn health_check(&self) -> ProviderResult<bool> {
        let url = format!("{}/api/version", self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// List available models
    pub async fn list_models(&self) -> ProviderResult<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(http_error(PROVIDER, status, &text));
        }

        let models: ModelsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::invalid_response(PROVIDER, e.to_string()))?;

        Ok(models.models.into_iter().map(|m| m.name).collect())
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl TextGenerator for OllamaClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        config: &GenerationConfig,
    ) -> ProviderResult<String> {
        let request = OllamaGenerateRequest {
            model: model.to_string(),
            prompt: prompt.to_string(),
            stream: false,
            options: OllamaOptions::from(config),
        };

        let response: OllamaGenerateResponse = self.post("/api/generate", &request).await?;
        Ok(response.response)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaClient {
    async fn embed(&self, text: &str, mode: EmbeddingMode) -> ProviderResult<Vec<f32>> {
        let request = OllamaEmbeddingRequest {
            model: self.embedding_model.clone(),
            prompt: format!("{}{}", mode.instruction_prefix(), text),
        };

        let response: OllamaEmbeddingResponse = self.post("/api/embeddings", &request).await?;
        if response.embedding.is_empty() {
            return Err(ProviderError::invalid_response(PROVIDER, "empty embedding"));
        }
        Ok(response.embedding)
    }
}

/// Ollama generate request
#[derive(Debug, Clone, Serialize)]
struct OllamaGenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Clone, Serialize)]
struct OllamaOptions {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    num_predict: u32,
}

impl From<&GenerationConfig> for OllamaOptions {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            temperature: config.temperature,
            top_p: config.top_p,
            top_k: config.top_k,
            num_predict: config.max_output_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Debug, Serialize)]
struct OllamaEmbeddingRequest {
    model: String,
    prompt: String,
}

#[derive(Debug, Deserialize)]
struct OllamaEmbeddingResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}

/// Ollama models list response
#[derive(Debug, Deserialize)]
struct ModelsResponse {
    models: Vec<ModelInfo>,
}

/// Model information
#[derive(Debug, Deserialize)]
struct ModelInfo {
    name: String,
}
