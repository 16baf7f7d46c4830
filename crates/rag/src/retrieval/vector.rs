//! HTTP client for the vector search service.
//!
//! Wire format:
//! - `POST /query {query, top_k}` → `{documents: [..], scores: [..]}`
//! - `POST /index {chunks, model, batch_size}`

use super::{build_http_client, DocumentRetriever};
use crate::types::{RetrievalMethod, RetrievalResult};
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

#[derive(Debug, Serialize)]
struct IndexRequest<'a> {
    chunks: &'a [String],
    model: &'a str,
    batch_size: usize,
}

/// Client for the external vector index.
pub struct HttpVectorClient {
    base_url: String,
    embedding_model: String,
    batch_size: usize,
    client: reqwest::Client,
}

impl HttpVectorClient {
    pub fn new(
        base_url: impl Into<String>,
        embedding_model: impl Into<String>,
        batch_size: usize,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = build_http_client(timeout).map_err(AppError::Config)?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            embedding_model: embedding_model.into(),
            batch_size,
            client,
        })
    }

    async fn post_json<T: Serialize + ?Sized>(&self, endpoint: &str, body: &T) -> AppResult<String> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Retrieval(format!("Vector request to {} failed: {}", url, e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::Retrieval(format!("Failed to read vector response: {}", e)))?;

        if !status.is_success() {
            return Err(AppError::Retrieval(format!(
                "Vector service error ({}): {}",
                status, text
            )));
        }

        Ok(text)
    }
}

/// Interpret a `/query` response body.
///
/// A missing or non-array `documents` field yields an empty `none` result.
/// Documents without a score array are tagged `unscored`.
fn parse_query_response(body: &Value) -> RetrievalResult {
    let Some(documents) = body.get("documents").and_then(Value::as_array) else {
        return RetrievalResult::none();
    };

    let documents: Vec<String> = documents
        .iter()
        .map(|doc| match doc {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect();

    if documents.is_empty() {
        return RetrievalResult::none();
    }

    let raw_scores = body
        .get("scores")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    // One unreadable score makes the whole ranking untrustworthy.
    let scores: Vec<f32> = match raw_scores.iter().map(score_value).collect::<Option<Vec<_>>>() {
        Some(scores) => scores,
        None => {
            tracing::warn!("Vector service returned non-numeric scores; treating result as unscored");
            Vec::new()
        }
    };

    let method = if scores.is_empty() {
        RetrievalMethod::Unscored
    } else {
        RetrievalMethod::Vector
    };

    RetrievalResult::new(documents, scores, method)
}

/// A number, or a string holding one.
fn score_value(value: &Value) -> Option<f32> {
    match value {
        Value::Number(n) => n.as_f64().map(|f| f as f32),
        Value::String(s) => s.trim().parse::<f32>().ok(),
        _ => None,
    }
}

#[async_trait]
impl DocumentRetriever for HttpVectorClient {
    async fn query(&self, question: &str, top_k: usize) -> AppResult<RetrievalResult> {
        tracing::debug!(top_k, "Querying vector service");

        let text = self
            .post_json(
                "/query",
                &QueryRequest {
                    query: question,
                    top_k,
                },
            )
            .await?;

        let body: Value = serde_json::from_str(&text)
            .map_err(|e| AppError::Retrieval(format!("Malformed vector response: {}", e)))?;

        let result = parse_query_response(&body);
        tracing::debug!(
            "Vector service returned {} documents (method: {})",
            result.documents.len(),
            result.method
        );

        Ok(result)
    }

    async fn index(&self, chunks: &[String]) -> AppResult<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        tracing::info!("Pushing {} chunks to vector service", chunks.len());

        self.post_json(
            "/index",
            &IndexRequest {
                chunks,
                model: &self.embedding_model,
                batch_size: self.batch_size,
            },
        )
        .await
        .map_err(|e| AppError::Index(e.to_string()))?;

        Ok(())
    }
}
