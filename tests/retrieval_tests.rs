//! Integration tests for hybrid retrieval

mod common;

use common::*;
use sentiflow::providers::{EmbeddingMode, SearchHit};
use sentiflow::rag::{HybridRetriever, SearchParams};

fn retriever(search: std::sync::Arc<FakeSearch>) -> HybridRetriever {
    HybridRetriever::new(StaticEmbedder::new(), search)
}

#[tokio::test]
async fn test_k_zero_returns_empty_without_calls() {
    let embedder = StaticEmbedder::new();
    let search = FakeSearch::with_hits(knowledge_base());
    let retriever = HybridRetriever::new(embedder.clone(), search.clone());

    let documents = retriever.retrieve("return policy", 0).await.unwrap();

    assert!(documents.is_empty());
    assert!(embedder.calls().is_empty());
    assert!(search.queries().is_empty());
}

#[tokio::test]
async fn test_query_embedded_in_query_mode() {
    let embedder = StaticEmbedder::new();
    let search = FakeSearch::with_hits(knowledge_base());
    let retriever = HybridRetriever::new(embedder.clone(), search.clone());

    retriever.retrieve("return policy", 3).await.unwrap();

    let calls = embedder.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0], ("return policy".to_string(), EmbeddingMode::Query));

    let query = &search.queries()[0];
    assert_eq!(query.vector, vec![0.1, 0.2, 0.3, 0.4]);
    assert_eq!(query.semantic_weight, 0.6);
    assert_eq!(query.keyword_weight, 0.4);
}

#[tokio::test]
async fn test_custom_weights_reach_search() {
    let search = FakeSearch::with_hits(knowledge_base());
    let retriever = retriever(search.clone());
    let params = SearchParams {
        k: 2,
        semantic_weight: 0.9,
        keyword_weight: 0.1,
    };

    let documents = retriever.retrieve_with_params("shipping", &params).await.unwrap();

    assert_eq!(documents.len(), 2);
    let query = &search.queries()[0];
    assert_eq!(query.k, 2);
    assert_eq!(query.semantic_weight, 0.9);
    assert_eq!(query.keyword_weight, 0.1);
}

#[tokio::test]
async fn test_results_ranked_by_score() {
    let mut hits = knowledge_base();
    hits.reverse();
    let retriever = retriever(FakeSearch::with_hits(hits));

    let documents = retriever.retrieve("anything", 4).await.unwrap();
    let scores: Vec<f64> = documents.iter().map(|d| d.score).collect();

    assert_eq!(scores, vec![2.4, 1.9, 1.2, 0.8]);
}

#[tokio::test]
async fn test_snippets_from_highlights_or_text() {
    let mut highlighted = hit("returns", 2.0, "Return Policy", "Items can be returned within 30 days.", "returns");
    highlighted.highlights = vec!["<em>returned</em> within".to_string(), "30 <em>days</em>".to_string()];
    let plain = hit("shipping", 1.0, "Shipping", "Ships fast.", "shipping");
    let retriever = retriever(FakeSearch::with_hits(vec![highlighted, plain]));

    let documents = retriever.retrieve("returns", 2).await.unwrap();

    assert_eq!(documents[0].snippet, "<em>returned</em> within ... 30 <em>days</em>");
    assert_eq!(documents[1].snippet, "Ships fast....");
}

#[tokio::test]
async fn test_filter_overfetches_and_keeps_category() {
    let search = FakeSearch::with_hits(knowledge_base());
    let retriever = retriever(search.clone());

    let documents = retriever
        .retrieve_with_filter("money back", Some("returns"), 2)
        .await
        .unwrap();

    assert_eq!(search.queries()[0].k, 4);
    assert_eq!(documents.len(), 2);
    assert!(documents.iter().all(|d| d.category.as_deref() == Some("returns")));
}

#[tokio::test]
async fn test_filter_may_return_fewer_than_k() {
    let search = FakeSearch::with_hits(knowledge_base());
    let retriever = retriever(search);

    // Over-fetch of 2 covers only the two best hits, neither is warranty
    let documents = retriever
        .retrieve_with_filter("coverage", Some("warranty"), 1)
        .await
        .unwrap();

    assert!(documents.is_empty());
}

#[tokio::test]
async fn test_filter_without_category_is_plain_retrieve() {
    let search = FakeSearch::with_hits(knowledge_base());
    let retriever = retriever(search.clone());

    let documents = retriever.retrieve_with_filter("anything", None, 3).await.unwrap();

    assert_eq!(documents.len(), 3);
    assert_eq!(search.queries()[0].k, 3);
}

#[tokio::test]
async fn test_dimension_check_only_when_configured() {
    let embedder = StaticEmbedder::with_vector(vec![0.1; 768]);
    let search = FakeSearch::with_hits(knowledge_base());

    let unchecked = HybridRetriever::new(embedder.clone(), search.clone());
    assert_eq!(unchecked.retrieve("returns", 2).await.unwrap().len(), 2);

    let matching = HybridRetriever::new(embedder.clone(), search.clone()).with_dimension(768);
    assert_eq!(matching.dimension(), Some(768));
    assert_eq!(matching.retrieve("returns", 2).await.unwrap().len(), 2);

    let mismatched = HybridRetriever::new(embedder, search.clone()).with_dimension(1024);
    let err = mismatched.retrieve("returns", 2).await.unwrap_err();
    assert!(!err.is_rate_limited());
    assert_eq!(search.queries().len(), 2);
}

#[tokio::test]
async fn test_provider_error_propagates() {
    let retriever = retriever(FakeSearch::failing());
    let err = retriever.retrieve("anything", 3).await.unwrap_err();
    assert!(err.to_string().contains("cluster unavailable"));
}

#[test]
fn test_missing_text_still_yields_document() {
    let json = serde_json::json!({"title": "Empty"});
    let document: sentiflow::types::IndexedDocument = serde_json::from_value(json).unwrap();
    let hit = SearchHit {
        id: "x".to_string(),
        score: 1.0,
        document,
        highlights: Vec::new(),
    };
    let rt = tokio_test::block_on(async {
        retriever(FakeSearch::with_hits(vec![hit])).retrieve("q", 1).await
    });
    let documents = rt.unwrap();
    assert_eq!(documents[0].text, "");
    assert_eq!(documents[0].snippet, "...");
}
