//! Generation orchestrator - main coordinator
//!
//! Sequences one support reply:
//! - Sentiment classification (never fails outward)
//! - Hybrid retrieval (only when requested; failures are hard errors)
//! - Prompt assembly from verdict, context and retained history
//! - Generation through the model fallback chain
//! - History update
//!
//! History is owned by the instance, so calls take `&mut self`. Callers
//! sharing a conversation across tasks serialize through a mutex (see
//! `session::SessionPool`).

use tracing::info;

use crate::config::{Config, DEFAULT_FALLBACK_MODELS};
use crate::errors::{Result, SentiflowError};
use crate::generation::fallback::{FallbackGenerator, ModelChain};
use crate::generation::history::ConversationHistory;
use crate::providers::Providers;
use crate::rag::{format_context, HybridRetriever, PromptBuilder, SearchParams, NO_RETRIEVAL_CONTEXT};
use crate::sentiment::SentimentClassifier;
use crate::types::{GenerationResult, RetrievedDocument};

/// Main generation orchestrator
#[derive(Clone)]
pub struct GenerationOrchestrator {
    classifier: SentimentClassifier,
    retriever: HybridRetriever,
    prompt_builder: PromptBuilder,
    fallback: FallbackGenerator,
    history: ConversationHistory,
}

impl GenerationOrchestrator {
    /// Create orchestrator from shared providers and configuration
    pub fn new(providers: &Providers, config: &Config) -> Self {
        let settings = &config.generation;
        let chain = ModelChain::from_settings(settings);

        let sentiment_model = settings
            .sentiment_model
            .clone()
            .or_else(|| chain.first().map(str::to_string))
            .unwrap_or_else(|| DEFAULT_FALLBACK_MODELS[0].to_string());

        let classifier =
            SentimentClassifier::with_config(providers.generator.clone(), sentiment_model, settings.sampling());

        let retriever = HybridRetriever::with_params(
            providers.embedder.clone(),
            providers.search.clone(),
            SearchParams {
                k: config.retrieval.k,
                semantic_weight: config.retrieval.semantic_weight,
                keyword_weight: config.retrieval.keyword_weight,
            },
        )
        .with_dimension(config.embedding.dimension);

        let fallback = FallbackGenerator::from_settings(providers.generator.clone(), settings);

        Self::from_parts(classifier, retriever, fallback)
    }

    /// Assemble from already-built components
    pub fn from_parts(
        classifier: SentimentClassifier,
        retriever: HybridRetriever,
        fallback: FallbackGenerator,
    ) -> Self {
        Self {
            classifier,
            retriever,
            prompt_builder: PromptBuilder::new(),
            fallback,
            history: ConversationHistory::new(),
        }
    }

    /// Produce a sentiment-aware reply to `query`.
    ///
    /// Retrieval runs only when `retrieve_context` is set and then fetches up
    /// to `k` documents. History is updated only on success.
    pub async fn generate(&mut self, query: &str, retrieve_context: bool, k: usize) -> Result<GenerationResult> {
        info!(query = %preview(query), retrieve_context, k, "Generating response");

        let sentiment = self.classifier.analyze(query).await;
        info!(
            label = %sentiment.label,
            emotion = %sentiment.emotion,
            confidence = sentiment.confidence,
            "Sentiment analyzed"
        );

        let (documents, context) = if retrieve_context {
            let documents = self
                .retriever
                .retrieve(query, k)
                .await
                .map_err(SentiflowError::Retrieval)?;
            let context = format_context(&documents);
            info!(documents = documents.len(), "Context retrieved");
            (documents, context)
        } else {
            (Vec::<RetrievedDocument>::new(), NO_RETRIEVAL_CONTEXT.to_string())
        };

        let prompt = self
            .prompt_builder
            .build_prompt(query, &context, &sentiment, self.history.as_slice());

        let output = self.fallback.generate(&prompt).await?;

        self.history.record_exchange(query, output.text.clone());

        Ok(GenerationResult {
            response: output.text,
            sentiment,
            documents,
            model_used: output.model,
            retrieval_enabled: retrieve_context,
        })
    }

    /// Clear retained history; idempotent
    pub fn reset_conversation(&mut self) {
        self.history.clear();
        info!("Conversation history reset");
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn classifier(&self) -> &SentimentClassifier {
        &self.classifier
    }

    pub fn retriever(&self) -> &HybridRetriever {
        &self.retriever
    }

    pub fn model_chain(&self) -> &ModelChain {
        self.fallback.chain()
    }
}

fn preview(query: &str) -> String {
    query.chars().take(50).collect()
}
