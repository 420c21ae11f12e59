//! Type definitions module
//!
//! Data shared between the sentiment, retrieval and generation stages.

pub mod conversation;
pub mod documents;
pub mod generation;
pub mod sentiment;

// Re-export commonly used types
pub use conversation::{ConversationTurn, Role};
pub use documents::{IndexedDocument, RetrievedDocument};
pub use generation::{GenerationAttempt, GenerationConfig, GenerationResult};
pub use sentiment::{ClassificationStatus, SentimentLabel, SentimentOutcome, SentimentVerdict};
