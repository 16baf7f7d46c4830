//! Retrieval backends.
//!
//! Both backends sit behind traits so the pipeline can be driven by the
//! HTTP clients in production and by in-memory fakes in tests.

mod catalog;
mod vector;

pub use catalog::HttpCatalogClient;
pub use vector::HttpVectorClient;

use crate::catalog::{CatalogHit, CatalogStatus};
use crate::types::RetrievalResult;
use async_trait::async_trait;
use docchat_core::AppResult;
use std::time::Duration;

/// Passage retrieval over the indexed document corpus.
#[async_trait]
pub trait DocumentRetriever: Send + Sync {
    /// Ranked passages for `question`, best first.
    async fn query(&self, question: &str, top_k: usize) -> AppResult<RetrievalResult>;

    /// Replace the backend's index with `chunks`.
    async fn index(&self, chunks: &[String]) -> AppResult<()>;
}

/// Product retrieval over the catalog index.
#[async_trait]
pub trait CatalogRetriever: Send + Sync {
    async fn query(&self, question: &str, top_k: usize) -> AppResult<Vec<CatalogHit>>;

    async fn status(&self) -> AppResult<CatalogStatus>;
}

fn build_http_client(timeout: Duration) -> Result<reqwest::Client, String> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| format!("Failed to build HTTP client: {}", e))
}
