// Retrieval-augmented generation building blocks
//
// Components:
// - Retrieval: hybrid (vector + keyword) search over the knowledge base
// - Context: numbered document blocks with fixed sentinels
// - Prompt: sentiment-aware prompt assembly

pub mod context;
pub mod prompt;
pub mod retrieval;

// Re-export key types
pub use context::{format_context, NO_RELEVANT_CONTEXT, NO_RETRIEVAL_CONTEXT};
pub use prompt::{build_prompt, PromptBuilder, PROMPT_HISTORY_WINDOW};
pub use retrieval::{HybridRetriever, SearchParams};
