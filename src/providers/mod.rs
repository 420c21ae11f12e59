//! External collaborator interfaces
//!
//! The core talks to three providers through narrow traits so that each can
//! be swapped for an in-memory fake:
//! - `TextGenerator`: prompt in, text out, selectable by model id
//! - `EmbeddingProvider`: text in, fixed-size vector out (query/document mode)
//! - `SearchProvider`: fused hybrid query in, ranked hits out

pub mod elastic;
pub mod gemini;
pub mod ollama;
pub mod search;

use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Arc;

use crate::config::{Config, ProviderKind};
use crate::errors::{ProviderError, ProviderResult, Result, SentiflowError};
use crate::types::GenerationConfig;

pub use elastic::ElasticClient;
pub use gemini::GeminiClient;
pub use ollama::OllamaClient;
pub use search::{HybridQuery, SearchHit};

/// Generative text provider
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Provider name used in logs and errors
    fn name(&self) -> &str;

    /// Generate text for `prompt` with the given model
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        config: &GenerationConfig,
    ) -> ProviderResult<String>;
}

/// Task mode for embeddings; queries and documents are embedded asymmetrically
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingMode {
    Query,
    Document,
}

impl EmbeddingMode {
    /// Task type name understood by Vertex/Gemini embedding models
    pub fn task_type(&self) -> &'static str {
        match self {
            EmbeddingMode::Query => "RETRIEVAL_QUERY",
            EmbeddingMode::Document => "RETRIEVAL_DOCUMENT",
        }
    }

    /// Instruction prefix used by nomic-style local embedding models
    pub fn instruction_prefix(&self) -> &'static str {
        match self {
            EmbeddingMode::Query => "search_query: ",
            EmbeddingMode::Document => "search_document: ",
        }
    }
}

/// Embedding provider
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str, mode: EmbeddingMode) -> ProviderResult<Vec<f32>>;
}

/// Document-search provider
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &HybridQuery) -> ProviderResult<Vec<SearchHit>>;
}

/// Handles to the three collaborators, shared by every orchestrator
#[derive(Clone)]
pub struct Providers {
    pub generator: Arc<dyn TextGenerator>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub search: Arc<dyn SearchProvider>,
}

impl Providers {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        embedder: Arc<dyn EmbeddingProvider>,
        search: Arc<dyn SearchProvider>,
    ) -> Self {
        Self {
            generator,
            embedder,
            search,
        }
    }

    /// Build the HTTP-backed providers selected by `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let generator: Arc<dyn TextGenerator> = match config.generation.provider {
            ProviderKind::Gemini => Arc::new(gemini_client(config)?),
            ProviderKind::Ollama => Arc::new(ollama_client(config)?),
        };

        let embedder: Arc<dyn EmbeddingProvider> = match config.embedding.provider {
            ProviderKind::Gemini => Arc::new(gemini_client(config)?),
            ProviderKind::Ollama => Arc::new(ollama_client(config)?),
        };

        let search: Arc<dyn SearchProvider> =
            Arc::new(ElasticClient::new(&config.elastic).map_err(config_error)?);

        Ok(Self::new(generator, embedder, search))
    }
}

fn gemini_client(config: &Config) -> Result<GeminiClient> {
    let api_key = config
        .gemini
        .api_key
        .clone()
        .ok_or_else(|| SentiflowError::Config("Gemini API key is not set".to_string()))?;
    GeminiClient::with_config(&config.gemini.base_url, &api_key, &config.embedding.model)
        .map_err(config_error)
}

fn ollama_client(config: &Config) -> Result<OllamaClient> {
    OllamaClient::with_config(&config.ollama.base_url, &config.embedding.model).map_err(config_error)
}

fn config_error(err: ProviderError) -> SentiflowError {
    SentiflowError::Config(err.to_string())
}

/// Map a non-success HTTP response to a provider error.
///
/// Quota conditions become `RateLimited` whether they are signalled by the
/// status code or by a `RESOURCE_EXHAUSTED` status in a Google-style body.
pub(crate) fn http_error(provider: &str, status: StatusCode, body: &str) -> ProviderError {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let api_status = parsed
        .as_ref()
        .and_then(|v| v.pointer("/error/status"))
        .and_then(|v| v.as_str());
    let message = parsed
        .as_ref()
        .and_then(|v| v.pointer("/error/message").or_else(|| v.get("error")))
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string());

    if status == StatusCode::TOO_MANY_REQUESTS || api_status == Some("RESOURCE_EXHAUSTED") {
        return ProviderError::RateLimited {
            provider: provider.to_string(),
            message,
        };
    }

    ProviderError::Api {
        provider: provider.to_string(),
        status: status.as_u16(),
        message,
    }
}
