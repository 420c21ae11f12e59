//! Conversation pool
//!
//! Each conversation owns one orchestrator behind its own async mutex, so at
//! most one `generate` runs per conversation while different conversations
//! proceed concurrently.
//!
//! The pool holds at most `capacity` conversations. Creating one more drops the
//! least recently used; a call already running on it finishes normally.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Config;
use crate::errors::Result;
use crate::generation::GenerationOrchestrator;
use crate::providers::Providers;
use crate::types::GenerationResult;

type SharedOrchestrator = Arc<Mutex<GenerationOrchestrator>>;

/// Default cap on live conversations
pub const DEFAULT_MAX_CONVERSATIONS: usize = 1000;

/// Pool of per-conversation orchestrators
#[derive(Clone)]
pub struct SessionPool {
    template: GenerationOrchestrator,
    sessions: Arc<Mutex<LruCache<String, SharedOrchestrator>>>,
    capacity: NonZeroUsize,
}

impl SessionPool {
    /// Create pool whose conversations share `providers`
    pub fn new(providers: &Providers, config: &Config) -> Self {
        Self::with_template(GenerationOrchestrator::new(providers, config))
            .with_capacity(config.sessions.max_conversations)
    }

    /// New conversations start as a fresh copy of `template`
    pub fn with_template(mut template: GenerationOrchestrator) -> Self {
        template.reset_conversation();
        let capacity = NonZeroUsize::new(DEFAULT_MAX_CONVERSATIONS).unwrap_or(NonZeroUsize::MIN);
        Self {
            template,
            sessions: Arc::new(Mutex::new(LruCache::new(capacity))),
            capacity,
        }
    }

    /// Start with an empty pool holding at most `capacity` conversations (at least one)
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        self.sessions = Arc::new(Mutex::new(LruCache::new(self.capacity)));
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Open a conversation and return its id
    pub async fn open(&self) -> String {
        let id = Uuid::new_v4().to_string();
        self.get_or_create(&id).await;
        info!(conversation = %id, "Conversation opened");
        id
    }

    /// Generate a reply within conversation `id`, creating it if unknown
    pub async fn generate(
        &self,
        id: &str,
        query: &str,
        retrieve_context: bool,
        k: usize,
    ) -> Result<GenerationResult> {
        let session = self.get_or_create(id).await;
        let mut orchestrator = session.lock().await;
        orchestrator.generate(query, retrieve_context, k).await
    }

    /// Clear history of conversation `id`; unknown ids are a no-op
    pub async fn reset(&self, id: &str) {
        if let Some(session) = self.lookup(id).await {
            session.lock().await.reset_conversation();
        }
    }

    /// Drop conversation `id`; returns whether it existed
    pub async fn close(&self, id: &str) -> bool {
        let removed = self.sessions.lock().await.pop(id).is_some();
        if removed {
            info!(conversation = %id, "Conversation closed");
        }
        removed
    }

    /// Number of retained turns in conversation `id`
    pub async fn history_len(&self, id: &str) -> Option<usize> {
        let session = self.lookup(id).await?;
        let orchestrator = session.lock().await;
        Some(orchestrator.history().len())
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    /// Orchestrator prototype, used for stateless operations
    pub fn template(&self) -> &GenerationOrchestrator {
        &self.template
    }

    /// Find without changing recency
    async fn lookup(&self, id: &str) -> Option<SharedOrchestrator> {
        self.sessions.lock().await.peek(id).cloned()
    }

    // The pool lock is only held for the map update, never across a generate.
    async fn get_or_create(&self, id: &str) -> SharedOrchestrator {
        let mut sessions = self.sessions.lock().await;
        if let Some(session) = sessions.get(id) {
            return session.clone();
        }

        debug!(conversation = %id, "Creating orchestrator");
        let session = Arc::new(Mutex::new(self.template.clone()));
        if let Some((evicted, _)) = sessions.push(id.to_string(), session.clone()) {
            info!(conversation = %evicted, capacity = self.capacity.get(), "Evicted least recently used conversation");
        }
        session
    }
}
