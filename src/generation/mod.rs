//! Reply generation
//!
//! Components:
//! - Orchestrator: classify, retrieve, build prompt, generate, remember
//! - Fallback: model chain with linear backoff on rate limiting
//! - History: sliding window of conversation turns

pub mod fallback;
pub mod history;
pub mod orchestrator;

pub use fallback::{ChainOutput, FallbackGenerator, ModelChain, RetryPolicy};
pub use history::{ConversationHistory, MAX_HISTORY_TURNS};
pub use orchestrator::GenerationOrchestrator;
