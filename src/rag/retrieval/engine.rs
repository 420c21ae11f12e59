//! Hybrid retrieval engine
//!
//! One fused search request per query: weighted cosine similarity over the
//! query embedding plus a boosted fuzzy keyword match. Provider errors are
//! propagated unchanged; an empty result means "nothing relevant".

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::errors::{ProviderError, ProviderResult};
use crate::providers::search::HIGHLIGHT_FRAGMENT_SIZE;
use crate::providers::{EmbeddingMode, EmbeddingProvider, HybridQuery, SearchHit, SearchProvider};
use crate::types::RetrievedDocument;

/// Search parameters for retrieval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Number of documents to return
    pub k: usize,
    /// Multiplier on the vector-similarity clause
    pub semantic_weight: f64,
    /// Boost on the keyword clause
    pub keyword_weight: f64,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            k: 5,
            semantic_weight: 0.6,
            keyword_weight: 0.4,
        }
    }
}

impl SearchParams {
    pub fn with_k(k: usize) -> Self {
        Self {
            k,
            ..Self::default()
        }
    }
}

/// Hybrid (vector + keyword) retriever
#[derive(Clone)]
pub struct HybridRetriever {
    embedder: Arc<dyn EmbeddingProvider>,
    search: Arc<dyn SearchProvider>,
    default_params: SearchParams,
    /// Length the index's dense-vector field was created with
    dimension: Option<usize>,
}

impl HybridRetriever {
    /// Create new retriever with default weights
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, search: Arc<dyn SearchProvider>) -> Self {
        Self::with_params(embedder, search, SearchParams::default())
    }

    /// Create with custom default weights
    pub fn with_params(
        embedder: Arc<dyn EmbeddingProvider>,
        search: Arc<dyn SearchProvider>,
        params: SearchParams,
    ) -> Self {
        Self {
            embedder,
            search,
            default_params: params,
            dimension: None,
        }
    }

    /// Reject query embeddings whose length differs from `dimension`
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = Some(dimension);
        self
    }

    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Retrieve the top `k` documents using the default weights
    pub async fn retrieve(&self, query: &str, k: usize) -> ProviderResult<Vec<RetrievedDocument>> {
        let params = SearchParams {
            k,
            ..self.default_params.clone()
        };
        self.retrieve_with_params(query, &params).await
    }

    /// Retrieve with explicit `k` and weights
    pub async fn retrieve_with_params(
        &self,
        query: &str,
        params: &SearchParams,
    ) -> ProviderResult<Vec<RetrievedDocument>> {
        if params.k == 0 {
            debug!("Retrieval requested with k=0; skipping search");
            return Ok(Vec::new());
        }

        info!(k = params.k, query = %preview(query), "Retrieving documents");

        let vector = self.embedder.embed(query, EmbeddingMode::Query).await?;
        if let Some(expected) = self.dimension {
            if vector.len() != expected {
                return Err(ProviderError::invalid_response(
                    "embedding",
                    format!("expected {}-dimensional embedding, got {}", expected, vector.len()),
                ));
            }
        }

        let hybrid = HybridQuery {
            text: query.to_string(),
            vector,
            k: params.k,
            semantic_weight: params.semantic_weight,
            keyword_weight: params.keyword_weight,
        };

        let hits = self.search.search(&hybrid).await?;

        let mut documents: Vec<RetrievedDocument> = hits.into_iter().map(into_document).collect();
        // Stable: equal scores keep the provider's order
        documents.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        documents.truncate(params.k);

        if documents.is_empty() {
            warn!("No documents found");
        } else {
            info!(documents = documents.len(), "Retrieved documents");
            for (i, doc) in documents.iter().take(3).enumerate() {
                debug!(rank = i + 1, title = doc.title_or_default(), score = doc.score, "Retrieved");
            }
        }

        Ok(documents)
    }

    /// Retrieve and keep only documents of `category`.
    ///
    /// Over-fetches `2k` and filters client-side, so fewer than `k` documents
    /// may come back even when more exist in the category.
    // TODO: push the category into the search request as a term filter once the
    // index mapping guarantees `category` is a keyword field.
    pub async fn retrieve_with_filter(
        &self,
        query: &str,
        category: Option<&str>,
        k: usize,
    ) -> ProviderResult<Vec<RetrievedDocument>> {
        let Some(category) = category else {
            return self.retrieve(query, k).await;
        };

        let mut documents = self.retrieve(query, k.saturating_mul(2)).await?;
        documents.retain(|doc| doc.in_category(category));
        documents.truncate(k);
        Ok(documents)
    }

    /// Get default search parameters
    pub fn default_params(&self) -> &SearchParams {
        &self.default_params
    }

    /// Update default search parameters
    pub fn set_default_params(&mut self, params: SearchParams) {
        self.default_params = params;
    }
}

fn into_document(hit: SearchHit) -> RetrievedDocument {
    let snippet = if hit.highlights.is_empty() {
        fallback_snippet(&hit.document.text)
    } else {
        hit.highlights.join(" ... ")
    };

    RetrievedDocument {
        id: hit.id,
        title: hit.document.title,
        text: hit.document.text,
        source: hit.document.source,
        category: hit.document.category,
        score: hit.score,
        snippet,
    }
}

/// First characters of the full text followed by an ellipsis
pub fn fallback_snippet(text: &str) -> String {
    let head: String = text.chars().take(HIGHLIGHT_FRAGMENT_SIZE).collect();
    format!("{}...", head)
}

fn preview(query: &str) -> String {
    query.chars().take(50).collect()
}
