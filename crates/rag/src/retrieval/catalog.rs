//! HTTP client for the catalog search service.
//!
//! Wire format:
//! - `POST /query {query, top_k}` → `{results: [{score, product}, ..]}`
//! - `GET /status` → `{status: "ok", products: n}`

use super::{build_http_client, CatalogRetriever};
use crate::catalog::{CatalogHit, CatalogStatus};
use async_trait::async_trait;
use docchat_core::{AppError, AppResult};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
    top_k: usize,
}

/// Client for the external catalog index.
pub struct HttpCatalogClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpCatalogClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = build_http_client(timeout).map_err(AppError::Config)?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn read_json(&self, request: reqwest::RequestBuilder) -> AppResult<Value> {
        let response = request
            .send()
            .await
            .map_err(|e| AppError::Retrieval(format!("Catalog request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Retrieval(format!(
                "Catalog service error ({})",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Retrieval(format!("Malformed catalog response: {}", e)))
    }
}

/// Interpret a `/query` response body. Items that do not deserialize into
/// a hit are skipped one by one.
fn parse_results(body: &Value) -> Vec<CatalogHit> {
    let Some(results) = body.get("results").and_then(Value::as_array) else {
        return Vec::new();
    };

    results
        .iter()
        .filter_map(|item| match serde_json::from_value::<CatalogHit>(item.clone()) {
            Ok(hit) => Some(hit),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed catalog result");
                None
            }
        })
        .collect()
}

fn parse_status(body: &Value) -> CatalogStatus {
    let ready = body
        .get("status")
        .and_then(Value::as_str)
        .is_some_and(|s| s.eq_ignore_ascii_case("ok"));

    CatalogStatus {
        ready,
        products: body.get("products").and_then(Value::as_u64),
    }
}

#[async_trait]
impl CatalogRetriever for HttpCatalogClient {
    async fn query(&self, question: &str, top_k: usize) -> AppResult<Vec<CatalogHit>> {
        tracing::debug!(top_k, "Querying catalog service");

        let request = self
            .client
            .post(format!("{}/query", self.base_url))
            .json(&QueryRequest {
                query: question,
                top_k,
            });

        let body = self.read_json(request).await?;
        Ok(parse_results(&body))
    }

    async fn status(&self) -> AppResult<CatalogStatus> {
        let request = self.client.get(format!("{}/status", self.base_url));
        let body = self.read_json(request).await?;
        Ok(parse_status(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> HttpCatalogClient {
        HttpCatalogClient::new(server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_parse_results_skips_malformed_items() {
        let hits = parse_results(&json!({
            "results": [
                {"score": 0.5, "product": {"product_name": "Arc"}},
                {"score": 0.4},
                {"product": {"product_name": "Bare"}}
            ]
        }));

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].product.product_name.as_deref(), Some("Arc"));
        assert_eq!(hits[1].score, 0.0);
    }

    #[test]
    fn test_parse_results_keeps_scalar_and_null_fields() {
        let hits = parse_results(&json!({
            "results": [
                {"score": 0.9, "product": {"product_name": "Chair", "pricing": 129.99}},
                {"score": 0.8, "product": {"product_name": "Desk", "source_page": null}},
                {"score": 0.7, "product": {"product_name": "Lamp", "pricing": "$40"}}
            ]
        }));

        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].product.pricing.as_deref(), Some("129.99"));
        assert_eq!(hits[1].product.source_page, 0);
        assert_eq!(hits[2].product.pricing.as_deref(), Some("$40"));
    }

    #[test]
    fn test_parse_status() {
        let status = parse_status(&json!({"status": "OK", "products": 42}));
        assert!(status.ready);
        assert_eq!(status.products, Some(42));

        assert!(!parse_status(&json!({"status": "loading"})).ready);
        assert!(!parse_status(&json!({})).ready);
    }

    #[tokio::test]
    async fn test_query_returns_hits_in_rank_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .and(body_json(json!({"query": "brass sconce", "top_k": 5})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {"score": 0.75, "product": {"product_name": "Arc Sconce", "image_path": "arc.png"}},
                    {"score": 0.5, "product": {"product_name": "Dome Sconce"}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let hits = client(&server).query("brass sconce", 5).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].score, 0.75);
        assert_eq!(hits[1].product.product_name.as_deref(), Some("Dome Sconce"));
    }

    #[tokio::test]
    async fn test_query_without_results_field_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "none"})))
            .mount(&server)
            .await;

        assert!(client(&server).query("x", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_status_reads_product_count() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"status": "ok", "products": 12})),
            )
            .mount(&server)
            .await;

        let status = client(&server).status().await.unwrap();
        assert!(status.ready);
        assert_eq!(status.products, Some(12));
    }

    #[tokio::test]
    async fn test_status_http_error_is_err() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        assert!(client(&server).status().await.is_err());
    }
}
