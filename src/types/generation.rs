//! Generation request/result types

use serde::{Deserialize, Serialize};

use crate::types::{RetrievedDocument, SentimentVerdict};

/// Sampling parameters passed to the text generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        // Kept modest to reduce quota pressure
        Self {
            temperature: 0.7,
            top_p: 0.9,
            top_k: 40,
            max_output_tokens: 512,
        }
    }
}

/// One (model, try-count) pairing inside the fallback chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationAttempt<'a> {
    pub model: &'a str,
    pub attempt: u32,
}

/// Result of one `generate` call; immutable once produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub response: String,
    pub sentiment: SentimentVerdict,
    pub documents: Vec<RetrievedDocument>,
    pub model_used: String,
    pub retrieval_enabled: bool,
}

impl GenerationResult {
    pub fn num_documents(&self) -> usize {
        self.documents.len()
    }
}
