//! Core pipeline types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Temporal character of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    /// Answerable from existing documents or past data.
    Fact,
    /// About future events, predictions or unknown outcomes.
    Futuristic,
    /// Combines factual lookup with speculation.
    Mixed,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fact => "FACT",
            Self::Futuristic => "FUTURISTIC",
            Self::Mixed => "MIXED",
        }
    }

    /// Anything other than a plain fact lookup.
    pub fn is_speculative(&self) -> bool {
        !matches!(self, Self::Fact)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which retrieval backend produced a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalMethod {
    /// Vector similarity search with one score per document.
    Vector,
    /// Backend returned documents without similarity scores.
    Unscored,
    /// Retrieval unavailable, failed, or empty.
    None,
}

impl RetrievalMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vector => "vector",
            Self::Unscored => "unscored",
            Self::None => "none",
        }
    }

    pub fn is_scored(&self) -> bool {
        matches!(self, Self::Vector)
    }
}

impl fmt::Display for RetrievalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ranked documents as returned by a retrieval backend.
///
/// Order is the backend's order (descending similarity) and is never
/// re-sorted. `scores` is parallel to `documents` for scored methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub documents: Vec<String>,
    pub scores: Vec<f32>,
    pub method: RetrievalMethod,
}

impl RetrievalResult {
    pub fn new(documents: Vec<String>, scores: Vec<f32>, method: RetrievalMethod) -> Self {
        Self {
            documents,
            scores,
            method,
        }
    }

    /// Empty result tagged `none`.
    pub fn none() -> Self {
        Self::new(Vec::new(), Vec::new(), RetrievalMethod::None)
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Highest score in the set, if any scores were returned.
    pub fn max_score(&self) -> Option<f32> {
        self.scores.iter().copied().reduce(f32::max)
    }
}

/// One recorded exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub timestamp: DateTime<Utc>,
    pub question: String,
    pub answer: String,
}

impl ChatEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// The pipeline's answer envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatAnswer {
    pub answer: String,
    pub intent: Intent,
    pub supported: bool,
    /// Whether the answer was allowed to speculate
    pub speculative: bool,
    pub retrieval_method: RetrievalMethod,
    /// Media references (catalog image paths), rank order, no duplicates
    #[serde(rename = "images")]
    pub media: Vec<String>,
}

/// Static pipeline selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Raw document passages from the vector backend.
    #[default]
    Document,
    /// Structured product records from the catalog backend.
    Catalog,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document => f.write_str("document"),
            Self::Catalog => f.write_str("catalog"),
        }
    }
}

/// Snapshot for the status surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub mode: Mode,
    pub chunks_loaded: usize,
    pub indexing: bool,
    pub last_index_error: Option<String>,
    pub last_indexed_at: Option<DateTime<Utc>>,
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_products: Option<u64>,
    pub history_entries: usize,
}
