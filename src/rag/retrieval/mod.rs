// Hybrid retrieval engine module
pub mod engine;

pub use engine::{fallback_snippet, HybridRetriever, SearchParams};
