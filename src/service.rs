//! Support service facade
//!
//! Entry point for front ends (the CLI, or an HTTP layer): validates input,
//! routes chat messages to their conversation, and records analytics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analytics::{AnalyticsOverview, AnalyticsStore, RecentQuery};
use crate::config::Config;
use crate::errors::{Result, SentiflowError};
use crate::providers::Providers;
use crate::session::SessionPool;
use crate::types::{RetrievedDocument, SentimentVerdict};

/// Title and origin of a document used for a reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub title: String,
    pub source: String,
}

impl From<&RetrievedDocument> for SourceRef {
    fn from(doc: &RetrievedDocument) -> Self {
        Self {
            title: doc.title_or_default().to_string(),
            source: doc.source_or_default().to_string(),
        }
    }
}

/// Reply returned to the caller of [`SupportService::chat`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    pub sentiment: SentimentVerdict,
    pub sources: Vec<SourceRef>,
    pub num_documents: usize,
    pub model_used: String,
    pub timestamp: DateTime<Utc>,
}

/// Boundary facade over sessions and analytics
#[derive(Clone)]
pub struct SupportService {
    sessions: SessionPool,
    analytics: AnalyticsStore,
    k: usize,
}

impl SupportService {
    pub fn new(providers: &Providers, config: &Config) -> Self {
        Self::with_pool(SessionPool::new(providers, config), config.retrieval.k)
    }

    /// Build around an existing pool; `k` documents are retrieved per message
    pub fn with_pool(sessions: SessionPool, k: usize) -> Self {
        Self {
            sessions,
            analytics: AnalyticsStore::new(),
            k,
        }
    }

    /// Answer `message` within `conversation_id`, retrieving the configured `k`
    pub async fn chat(&self, conversation_id: &str, message: &str) -> Result<ChatReply> {
        self.chat_with(conversation_id, message, true, self.k).await
    }

    /// Answer with explicit retrieval settings
    pub async fn chat_with(
        &self,
        conversation_id: &str,
        message: &str,
        retrieve_context: bool,
        k: usize,
    ) -> Result<ChatReply> {
        let message = non_empty(message, "Message")?;
        info!(conversation = %conversation_id, retrieve_context, "Received chat message");

        let result = self
            .sessions
            .generate(conversation_id, message, retrieve_context, k)
            .await?;

        self.analytics.record(message, result.sentiment.label);

        Ok(ChatReply {
            num_documents: result.num_documents(),
            sources: result.documents.iter().map(SourceRef::from).collect(),
            response: result.response,
            sentiment: result.sentiment,
            model_used: result.model_used,
            timestamp: Utc::now(),
        })
    }

    /// Standalone sentiment classification; not recorded in analytics
    pub async fn analyze_sentiment(&self, text: &str) -> Result<SentimentVerdict> {
        let text = non_empty(text, "Text")?;
        Ok(self.sessions.template().classifier().analyze(text).await)
    }

    /// Open a new conversation
    pub async fn open_conversation(&self) -> String {
        self.sessions.open().await
    }

    pub async fn reset(&self, conversation_id: &str) {
        self.sessions.reset(conversation_id).await;
    }

    pub async fn close(&self, conversation_id: &str) -> bool {
        self.sessions.close(conversation_id).await
    }

    pub fn overview(&self) -> AnalyticsOverview {
        self.analytics.overview()
    }

    pub fn recent(&self, limit: usize) -> Vec<RecentQuery> {
        self.analytics.recent(limit)
    }

    pub fn sessions(&self) -> &SessionPool {
        &self.sessions
    }
}

fn non_empty<'a>(input: &'a str, what: &str) -> Result<&'a str> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(SentiflowError::InvalidInput(format!("{} cannot be empty", what)));
    }
    Ok(trimmed)
}
