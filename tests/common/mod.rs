//! Shared in-memory providers for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use sentiflow::config::Config;
use sentiflow::errors::{ProviderError, ProviderResult};
use sentiflow::providers::{
    EmbeddingMode, EmbeddingProvider, HybridQuery, Providers, SearchHit, SearchProvider, TextGenerator,
};
use sentiflow::types::{GenerationConfig, IndexedDocument};
use sentiflow::GenerationOrchestrator;

pub const SENTIMENT_MODEL: &str = "sentiment";
pub const PRIMARY: &str = "primary";
pub const SECONDARY: &str = "secondary";
pub const TERTIARY: &str = "tertiary";

pub const NEUTRAL_VERDICT: &str =
    r#"{"score": 0.5, "label": "neutral", "emotion": "neutral", "confidence": 0.9}"#;

/// What a scripted model does on one call
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Empty,
    RateLimited,
    Fail(String),
}

impl Reply {
    pub fn text(s: &str) -> Self {
        Reply::Text(s.to_string())
    }

    fn into_result(self) -> ProviderResult<String> {
        match self {
            Reply::Text(s) => Ok(s),
            Reply::Empty => Ok(String::new()),
            Reply::RateLimited => Err(ProviderError::RateLimited {
                provider: "scripted".to_string(),
                message: "429 Resource exhausted".to_string(),
            }),
            Reply::Fail(message) => Err(ProviderError::Api {
                provider: "scripted".to_string(),
                status: 500,
                message,
            }),
        }
    }
}

/// Recorded generator call
#[derive(Debug, Clone)]
pub struct Call {
    pub model: String,
    pub prompt: String,
}

/// Generator whose behavior is scripted per model.
///
/// Each model plays its queue in order and then repeats the last reply.
#[derive(Default)]
pub struct ScriptedGenerator {
    scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedGenerator {
    pub fn new() -> Arc<Self> {
        let generator = Self::default();
        generator.script(SENTIMENT_MODEL, vec![Reply::text(NEUTRAL_VERDICT)]);
        Arc::new(generator)
    }

    pub fn script(&self, model: &str, replies: Vec<Reply>) {
        self.scripts
            .lock()
            .unwrap()
            .insert(model.to_string(), replies.into_iter().collect());
    }

    pub fn always(&self, model: &str, reply: Reply) {
        self.script(model, vec![reply]);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls to `model`, in order
    pub fn calls_to(&self, model: &str) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.model == model).collect()
    }

    /// Prompts sent to generation models (classifier calls excluded)
    pub fn generation_prompts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.model != SENTIMENT_MODEL)
            .map(|c| c.prompt)
            .collect()
    }

    pub fn last_generation_prompt(&self) -> String {
        self.generation_prompts().pop().unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, model: &str, prompt: &str, _config: &GenerationConfig) -> ProviderResult<String> {
        self.calls.lock().unwrap().push(Call {
            model: model.to_string(),
            prompt: prompt.to_string(),
        });

        let reply = {
            let mut scripts = self.scripts.lock().unwrap();
            match scripts.get_mut(model) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        reply
            .unwrap_or_else(|| Reply::Fail(format!("unknown model {}", model)))
            .into_result()
    }
}

/// Embedder returning a constant vector
pub struct StaticEmbedder {
    pub fail: bool,
    vector: Vec<f32>,
    calls: Mutex<Vec<(String, EmbeddingMode)>>,
}

impl StaticEmbedder {
    pub fn new() -> Arc<Self> {
        Self::with_vector(vec![0.1, 0.2, 0.3, 0.4])
    }

    pub fn with_vector(vector: Vec<f32>) -> Arc<Self> {
        Arc::new(Self {
            fail: false,
            vector,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            vector: Vec::new(),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(String, EmbeddingMode)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmbeddingProvider for StaticEmbedder {
    async fn embed(&self, text: &str, mode: EmbeddingMode) -> ProviderResult<Vec<f32>> {
        self.calls.lock().unwrap().push((text.to_string(), mode));
        if self.fail {
            return Err(ProviderError::Other("embedding service unavailable".to_string()));
        }
        Ok(self.vector.clone())
    }
}

/// Search provider over a fixed hit list; returns at most `k` hits
#[derive(Default)]
pub struct FakeSearch {
    hits: Vec<SearchHit>,
    fail: bool,
    queries: Mutex<Vec<HybridQuery>>,
}

impl FakeSearch {
    pub fn with_hits(hits: Vec<SearchHit>) -> Arc<Self> {
        Arc::new(Self {
            hits,
            ..Self::default()
        })
    }

    pub fn empty() -> Arc<Self> {
        Self::with_hits(Vec::new())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub fn queries(&self) -> Vec<HybridQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for FakeSearch {
    async fn search(&self, query: &HybridQuery) -> ProviderResult<Vec<SearchHit>> {
        self.queries.lock().unwrap().push(query.clone());
        if self.fail {
            return Err(ProviderError::Api {
                provider: "elasticsearch".to_string(),
                status: 503,
                message: "cluster unavailable".to_string(),
            });
        }
        Ok(self.hits.iter().take(query.k).cloned().collect())
    }
}

pub fn hit(id: &str, score: f64, title: &str, text: &str, category: &str) -> SearchHit {
    SearchHit {
        id: id.to_string(),
        score,
        document: IndexedDocument {
            text: text.to_string(),
            embedding: Vec::new(),
            source: Some(format!("{}.md", id)),
            category: Some(category.to_string()),
            timestamp: None,
            title: Some(title.to_string()),
            chunk_index: Some(0),
        },
        highlights: Vec::new(),
    }
}

pub fn knowledge_base() -> Vec<SearchHit> {
    vec![
        hit("returns", 2.4, "Return Policy", "Items can be returned within 30 days.", "returns"),
        hit("shipping", 1.9, "Shipping Times", "Standard shipping takes 3-5 business days.", "shipping"),
        hit("warranty", 1.2, "Warranty", "All products carry a one year warranty.", "warranty"),
        hit("refunds", 0.8, "Refunds", "Refunds are issued to the original payment method.", "returns"),
    ]
}

/// Configuration with a three-model chain, a dedicated sentiment model and
/// the embedding length of `StaticEmbedder::new`
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.generation.primary_model = Some(PRIMARY.to_string());
    config.generation.fallback_models = vec![SECONDARY.to_string(), TERTIARY.to_string()];
    config.generation.sentiment_model = Some(SENTIMENT_MODEL.to_string());
    config.embedding.dimension = 4;
    config
}

pub fn providers(
    generator: Arc<ScriptedGenerator>,
    embedder: Arc<StaticEmbedder>,
    search: Arc<FakeSearch>,
) -> Providers {
    Providers::new(generator, embedder, search)
}

pub fn orchestrator(generator: Arc<ScriptedGenerator>, search: Arc<FakeSearch>) -> GenerationOrchestrator {
    GenerationOrchestrator::new(&providers(generator, StaticEmbedder::new(), search), &test_config())
}
