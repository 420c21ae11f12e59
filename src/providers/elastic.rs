//! Elasticsearch client for hybrid search
//!
//! Only reads the knowledge-base index; index creation and ingestion are
//! owned by the ingestion job.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::config::ElasticConfig;
use crate::errors::{ProviderError, ProviderResult};
use crate::providers::{http_error, HybridQuery, SearchHit, SearchProvider};
use crate::types::IndexedDocument;

const PROVIDER: &str = "elasticsearch";

/// Elasticsearch REST client bound to one index
#[derive(Debug, Clone)]
pub struct ElasticClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    index: String,
}

impl ElasticClient {
    /// Create client from configuration; `url` wins over `cloud_id`
    pub fn new(config: &ElasticConfig) -> ProviderResult<Self> {
        let endpoint = match (&config.url, &config.cloud_id) {
            (Some(url), _) => url.trim_end_matches('/').to_string(),
            (None, Some(cloud_id)) => endpoint_from_cloud_id(cloud_id)?,
            (None, None) => {
                return Err(ProviderError::Other(
                    "Elasticsearch endpoint not configured (set url or cloud_id)".to_string(),
                ))
            }
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(ProviderError::Http)?;

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
            index: config.index.clone(),
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("Authorization", format!("ApiKey {}", key)),
            None => request,
        }
    }

    /// Check that the cluster answers
    pub async fn ping(&self) -> ProviderResult<bool> {
        match self.authorized(self.client.get(&self.endpoint)).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Number of chunks in the knowledge-base index
    pub async fn document_count(&self) -> ProviderResult<u64> {
        let url = format!("{}/{}/_count", self.endpoint, self.index);
        let response = self.authorized(self.client.get(&url)).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(http_error(PROVIDER, status, &text));
        }

        let count: CountResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::invalid_response(PROVIDER, e.to_string()))?;
        Ok(count.count)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn index(&self) -> &str {
        &self.index
    }
}

#[async_trait]
impl SearchProvider for ElasticClient {
    async fn search(&self, query: &HybridQuery) -> ProviderResult<Vec<SearchHit>> {
        let url = format!("{}/{}/_search", self.endpoint, self.index);
        let response = self
            .authorized(self.client.post(&url))
            .json(&query.to_search_body())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(http_error(PROVIDER, status, &text));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::invalid_response(PROVIDER, e.to_string()))?;

        Ok(body.into_hits())
    }
}

/// Decode an Elastic Cloud ID (`name:base64(host$es_uuid$kibana_uuid)`)
/// into the HTTPS endpoint of its Elasticsearch deployment.
pub fn endpoint_from_cloud_id(cloud_id: &str) -> ProviderResult<String> {
    let invalid = |reason: &str| ProviderError::Other(format!("Invalid Elastic Cloud ID: {}", reason));

    let encoded = cloud_id
        .split_once(':')
        .map(|(_, rest)| rest)
        .ok_or_else(|| invalid("missing ':' separator"))?;
    let decoded = STANDARD
        .decode(encoded)
        .map_err(|e| invalid(&e.to_string()))?;
    let decoded = String::from_utf8(decoded).map_err(|e| invalid(&e.to_string()))?;

    let mut parts = decoded.split('$');
    let host = parts.next().filter(|h| !h.is_empty()).ok_or_else(|| invalid("missing host"))?;
    let es_uuid = parts
        .next()
        .filter(|u| !u.is_empty())
        .ok_or_else(|| invalid("missing deployment id"))?;

    let (host, port) = match host.rsplit_once(':') {
        Some((h, p)) => (h, Some(p)),
        None => (host, None),
    };

    Ok(match port {
        Some(port) if port != "443" => format!("https://{}.{}:{}", es_uuid, host, port),
        _ => format!("https://{}.{}", es_uuid, host),
    })
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

impl SearchResponse {
    fn into_hits(self) -> Vec<SearchHit> {
        self.hits
            .hits
            .into_iter()
            .map(|raw| SearchHit {
                id: raw.id,
                score: raw.score.unwrap_or(0.0),
                document: raw.source,
                highlights: raw.highlight.remove_text(),
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    #[serde(default)]
    hits: Vec<RawHit>,
}

#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_score", default)]
    score: Option<f64>,
    #[serde(rename = "_source")]
    source: IndexedDocument,
    #[serde(default)]
    highlight: Highlight,
}

#[derive(Debug, Deserialize, Default)]
struct Highlight(HashMap<String, Vec<String>>);

impl Highlight {
    fn remove_text(mut self) -> Vec<String> {
        self.0.remove("text").unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ElasticConfig {
        ElasticConfig {
            url: Some("http://localhost:9200/".to_string()),
            ..ElasticConfig::default()
        }
    }

    #[test]
    fn test_client_uses_url() {
        let client = ElasticClient::new(&config()).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:9200");
        assert_eq!(client.index(), "sentiflow-kb");
    }

    #[test]
    fn test_client_requires_endpoint() {
        let result = ElasticClient::new(&ElasticConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_cloud_id_decoding() {
        let encoded = STANDARD.encode("us-central1.gcp.cloud.es.io$abc123$def456");
        let endpoint = endpoint_from_cloud_id(&format!("sentiflow:{}", encoded)).unwrap();
        assert_eq!(endpoint, "https://abc123.us-central1.gcp.cloud.es.io");
    }

    #[test]
    fn test_cloud_id_with_port() {
        let encoded = STANDARD.encode("eu-west-1.aws.found.io:9243$abc$def");
        let endpoint = endpoint_from_cloud_id(&format!("x:{}", encoded)).unwrap();
        assert_eq!(endpoint, "https://abc.eu-west-1.aws.found.io:9243");
    }

    #[test]
    fn test_cloud_id_invalid() {
        assert!(endpoint_from_cloud_id("no-separator").is_err());
        assert!(endpoint_from_cloud_id("name:!!!").is_err());
    }

    #[test]
    fn test_search_response_parsing() {
        let body = r#"{
            "hits": {
                "hits": [
                    {
                        "_id": "a1",
                        "_score": 2.4,
                        "_source": {"text": "Returns accepted within 30 days", "title": "Returns", "category": "policy"},
                        "highlight": {"text": ["<em>Returns</em> accepted"]}
                    },
                    {
                        "_id": "b2",
                        "_score": null,
                        "_source": {"text": "Shipping takes 3 days"}
                    }
                ]
            }
        }"#;
        let parsed: SearchResponse = serde_json::from_str(body).unwrap();
        let hits = parsed.into_hits();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "a1");
        assert_eq!(hits[0].highlights, vec!["<em>Returns</em> accepted"]);
        assert_eq!(hits[0].document.category.as_deref(), Some("policy"));
        assert_eq!(hits[1].score, 0.0);
        assert!(hits[1].highlights.is_empty());
    }

    #[test]
    fn test_search_response_with_ingestion_timestamp() {
        let body = r#"{"hits":{"hits":[{"_id":"c3","_score":1.1,"_source":{"text":"Warranty covers one year","title":"Warranty","chunk_index":2,"timestamp":"2025-10-24T12:34:56.123456"}}]}}"#;
        let parsed: SearchResponse = serde_json::from_str(body).unwrap();
        let hits = parsed.into_hits();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document.text, "Warranty covers one year");
        assert!(hits[0].document.timestamp.is_some());
    }
}
