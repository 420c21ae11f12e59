//! Fused hybrid query and search hit types

use serde_json::{json, Value};

use crate::types::IndexedDocument;

/// Maximum characters per highlighted fragment
pub const HIGHLIGHT_FRAGMENT_SIZE: usize = 200;

/// Maximum highlighted fragments per hit
pub const HIGHLIGHT_FRAGMENTS: usize = 2;

/// Name of the dense-vector field; write-only from the core's point of view
pub const EMBEDDING_FIELD: &str = "embedding";

/// One fused vector + keyword search request
#[derive(Debug, Clone, PartialEq)]
pub struct HybridQuery {
    pub text: String,
    pub vector: Vec<f32>,
    pub k: usize,
    pub semantic_weight: f64,
    pub keyword_weight: f64,
}

impl HybridQuery {
    /// Render the Elasticsearch request body.
    ///
    /// Both signals sit in one `bool.should`, so a document's score is the sum
    /// of whichever clauses matched:
    /// - `semantic_weight * (cosineSimilarity + 1.0)` over every document
    /// - fuzzy `multi_match` on `text^2` and `title`, boosted by `keyword_weight`
    pub fn to_search_body(&self) -> Value {
        json!({
            "size": self.k,
            "query": {
                "bool": {
                    "should": [
                        {
                            "script_score": {
                                "query": { "match_all": {} },
                                "script": {
                                    "source": format!(
                                        "params.semantic_weight * (cosineSimilarity(params.query_vector, '{}') + 1.0)",
                                        EMBEDDING_FIELD
                                    ),
                                    "params": {
                                        "query_vector": self.vector,
                                        "semantic_weight": self.semantic_weight,
                                    }
                                }
                            }
                        },
                        {
                            "multi_match": {
                                "query": self.text,
                                "fields": ["text^2", "title"],
                                "type": "best_fields",
                                "fuzziness": "AUTO",
                                "boost": self.keyword_weight,
                            }
                        }
                    ]
                }
            },
            "_source": { "excludes": [EMBEDDING_FIELD] },
            "highlight": {
                "fields": {
                    "text": {
                        "fragment_size": HIGHLIGHT_FRAGMENT_SIZE,
                        "number_of_fragments": HIGHLIGHT_FRAGMENTS,
                    }
                }
            }
        })
    }
}

/// One ranked hit as returned by the search provider
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub id: String,
    pub score: f64,
    pub document: IndexedDocument,
    /// Highlighted fragments from the `text` field, possibly empty
    pub highlights: Vec<String>,
}
