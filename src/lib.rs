//! SentiFlow - sentiment-aware customer support replies
//!
//! Turns a customer's message into a reply grounded in a knowledge base, with
//! the tone adapted to how the customer feels.
//!
//! # Architecture
//!
//! - **Sentiment**: classify the message, derive tone and priority
//! - **RAG**: hybrid (vector + keyword) retrieval and prompt assembly
//! - **Generation**: orchestrator with model fallback, backoff and history
//! - **Providers**: Gemini, Ollama and Elasticsearch behind narrow traits
//! - **Service**: sessions, analytics and the facade front ends call

pub mod errors;
pub mod types;
pub mod config;
pub mod providers;

pub mod sentiment;
pub mod rag;
pub mod generation;

pub mod analytics;
pub mod session;
pub mod service;

// Binary support
pub mod cli;
pub mod logging;
pub mod repl;

// Re-export commonly used types
pub use config::Config;
pub use errors::{ProviderError, Result, SentiflowError};
pub use generation::GenerationOrchestrator;
pub use providers::Providers;
pub use service::{ChatReply, SupportService};
