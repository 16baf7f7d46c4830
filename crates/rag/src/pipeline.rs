//! Document and catalog retrieval pipelines behind a static mode switch.
//!
//! Both pipelines feed the same classification and synthesis steps; they
//! differ in where context comes from, how it is formatted and how the
//! speculation flags are derived.

use crate::catalog::{collect_media, render_product};
use crate::chunker::Chunker;
use crate::corpus::DocumentCorpus;
use crate::gate::RetrievalGate;
use crate::retrieval::{CatalogRetriever, DocumentRetriever};
use crate::source::TextSource;
use crate::types::{Intent, Mode, RetrievalMethod, RetrievalResult};
use docchat_core::AppResult;
use std::sync::Arc;

/// Context gathered for one question.
#[derive(Debug, Clone, PartialEq)]
pub struct Retrieved {
    /// Ranked context chunks, best first
    pub chunks: Vec<String>,
    pub supported: bool,
    pub method: RetrievalMethod,
    /// De-duplicated media references, rank order
    pub media: Vec<String>,
    pub corpus_empty: bool,
}

/// Speculation flags for one answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Speculation {
    /// Passed to the synthesizer as its allow-speculation input
    pub allow: bool,
    /// Reported in the answer envelope
    pub reported: bool,
}

/// Raw passages from the vector backend over the local corpus.
pub struct DocumentPipeline {
    retriever: Arc<dyn DocumentRetriever>,
    corpus: DocumentCorpus,
    chunker: Chunker,
    gate: RetrievalGate,
    top_k: usize,
}

impl DocumentPipeline {
    pub fn new(
        retriever: Arc<dyn DocumentRetriever>,
        corpus: DocumentCorpus,
        chunker: Chunker,
        gate: RetrievalGate,
        top_k: usize,
    ) -> Self {
        Self {
            retriever,
            corpus,
            chunker,
            gate,
            top_k,
        }
    }

    pub fn corpus(&self) -> &DocumentCorpus {
        &self.corpus
    }

    pub async fn retrieve(
        &self,
        question: &str,
        conversation_ref: bool,
        history_non_empty: bool,
    ) -> Retrieved {
        let corpus_empty = self.corpus.is_empty();

        let result = if corpus_empty {
            tracing::debug!("Corpus is empty, skipping retrieval");
            RetrievalResult::none()
        } else {
            match self.retriever.query(question, self.top_k).await {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!("Document retrieval failed: {}", e);
                    RetrievalResult::none()
                }
            }
        };

        let supported = self
            .gate
            .is_supported(&result, conversation_ref, history_non_empty);

        Retrieved {
            chunks: result.documents,
            supported,
            method: result.method,
            media: Vec::new(),
            corpus_empty,
        }
    }

    pub async fn reindex(&self, source: &dyn TextSource) -> AppResult<usize> {
        self.corpus
            .reindex(source, &self.chunker, self.retriever.as_ref())
            .await
    }
}

/// Structured product records rendered into labeled text blocks.
pub struct CatalogPipeline {
    retriever: Arc<dyn CatalogRetriever>,
    gate: RetrievalGate,
    top_k: usize,
}

impl CatalogPipeline {
    /// Supported when any hit scores at least `min_score`.
    pub fn new(retriever: Arc<dyn CatalogRetriever>, top_k: usize, min_score: f32) -> Self {
        Self {
            retriever,
            gate: RetrievalGate::new(1, min_score),
            top_k,
        }
    }

    pub async fn retrieve(
        &self,
        question: &str,
        conversation_ref: bool,
        history_non_empty: bool,
    ) -> Retrieved {
        let hits = match self.retriever.query(question, self.top_k).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!("Catalog retrieval failed: {}", e);
                Vec::new()
            }
        };

        let method = if hits.is_empty() {
            RetrievalMethod::None
        } else {
            RetrievalMethod::Vector
        };

        let result = RetrievalResult::new(
            hits.iter().map(render_product).collect(),
            hits.iter().map(|hit| hit.score).collect(),
            method,
        );

        let supported = self
            .gate
            .is_supported(&result, conversation_ref, history_non_empty);

        let mut media: Vec<String> = Vec::new();
        for path in collect_media(&hits) {
            if !media.contains(&path) {
                media.push(path);
            }
        }

        Retrieved {
            chunks: result.documents,
            supported,
            method,
            media,
            corpus_empty: false,
        }
    }

    pub async fn status(&self) -> (bool, Option<u64>) {
        match self.retriever.status().await {
            Ok(status) => (status.ready, status.products),
            Err(e) => {
                tracing::warn!("Catalog status check failed: {}", e);
                (false, None)
            }
        }
    }
}

/// Mode dispatcher, chosen once from configuration.
pub enum Pipeline {
    Document(DocumentPipeline),
    Catalog(CatalogPipeline),
}

impl Pipeline {
    pub fn mode(&self) -> Mode {
        match self {
            Self::Document(_) => Mode::Document,
            Self::Catalog(_) => Mode::Catalog,
        }
    }

    pub async fn retrieve(
        &self,
        question: &str,
        conversation_ref: bool,
        history_non_empty: bool,
    ) -> Retrieved {
        match self {
            Self::Document(p) => p.retrieve(question, conversation_ref, history_non_empty).await,
            Self::Catalog(p) => p.retrieve(question, conversation_ref, history_non_empty).await,
        }
    }

    /// Document answers speculate only when the caller allows it and the
    /// question is not a plain fact. Catalog answers may always speculate.
    pub fn speculation(&self, intent: Intent, caller_allows: bool) -> Speculation {
        match self {
            Self::Document(_) => {
                let speculative = caller_allows && intent.is_speculative();
                Speculation {
                    allow: speculative,
                    reported: speculative,
                }
            }
            Self::Catalog(_) => Speculation {
                allow: true,
                reported: intent.is_speculative(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogHit, CatalogProduct};
    use crate::tests::fakes::{FakeCatalog, FakeRetriever};

    async fn document_pipeline(retriever: FakeRetriever, corpus: &[&str]) -> DocumentPipeline {
        let pipeline = DocumentPipeline::new(
            Arc::new(retriever),
            DocumentCorpus::new(),
            Chunker::new(500, 100),
            RetrievalGate::new(1, 0.2),
            3,
        );
        if !corpus.is_empty() {
            let texts: Vec<String> = corpus.iter().map(|s| s.to_string()).collect();
            pipeline.reindex(&texts).await.unwrap();
        }
        pipeline
    }

    fn hit(name: &str, score: f32, image: Option<&str>) -> CatalogHit {
        CatalogHit {
            score,
            product: CatalogProduct {
                product_name: Some(name.to_string()),
                image_path: image.map(str::to_string),
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_document_pipeline_skips_retrieval_on_empty_corpus() {
        let retriever = Arc::new(FakeRetriever::scored(&[("doc", 0.9)]));
        let pipeline = DocumentPipeline::new(
            retriever.clone(),
            DocumentCorpus::new(),
            Chunker::new(500, 100),
            RetrievalGate::new(1, 0.2),
            3,
        );

        let retrieved = pipeline.retrieve("question", false, false).await;
        assert!(retrieved.corpus_empty);
        assert!(retrieved.chunks.is_empty());
        assert_eq!(retrieved.method, RetrievalMethod::None);
        assert_eq!(retriever.queries(), 0);
    }

    #[tokio::test]
    async fn test_document_pipeline_uses_backend_results() {
        let pipeline = document_pipeline(
            FakeRetriever::scored(&[("Warranty: 2 years.", 0.8)]),
            &["Warranty: 2 years."],
        )
        .await;

        let retrieved = pipeline.retrieve("warranty", false, false).await;
        assert!(retrieved.supported);
        assert!(!retrieved.corpus_empty);
        assert_eq!(retrieved.chunks, vec!["Warranty: 2 years.".to_string()]);
        assert_eq!(retrieved.method, RetrievalMethod::Vector);
    }

    #[tokio::test]
    async fn test_document_retrieval_failure_degrades_to_none() {
        let pipeline = document_pipeline(FakeRetriever::failing(), &["Something."]).await;

        let retrieved = pipeline.retrieve("warranty", false, false).await;
        assert!(!retrieved.supported);
        assert_eq!(retrieved.method, RetrievalMethod::None);
    }

    #[tokio::test]
    async fn test_catalog_pipeline_renders_hits_and_dedups_media() {
        let catalog = FakeCatalog::new(vec![
            hit("Arc", 0.1, Some("arc.png")),
            hit("Dome", 0.3, Some("arc.png")),
            hit("Cone", 0.05, Some("cone.png")),
        ]);
        let pipeline = CatalogPipeline::new(Arc::new(catalog), 5, 0.2);

        let retrieved = pipeline.retrieve("sconce", false, false).await;
        assert!(retrieved.supported);
        assert_eq!(retrieved.method, RetrievalMethod::Vector);
        assert!(retrieved.chunks[0].starts_with("Product Name: Arc\n"));
        assert_eq!(retrieved.media, vec!["arc.png", "cone.png"]);
    }

    #[tokio::test]
    async fn test_catalog_below_threshold_is_unsupported() {
        let pipeline = CatalogPipeline::new(Arc::new(FakeCatalog::new(vec![hit("Arc", 0.1, None)])), 5, 0.2);

        let retrieved = pipeline.retrieve("sconce", false, false).await;
        assert!(!retrieved.supported);
        assert_eq!(retrieved.chunks.len(), 1);
    }

    #[tokio::test]
    async fn test_catalog_failure_degrades_to_none() {
        let pipeline = CatalogPipeline::new(Arc::new(FakeCatalog::failing()), 5, 0.2);

        let retrieved = pipeline.retrieve("sconce", false, false).await;
        assert!(retrieved.chunks.is_empty());
        assert_eq!(retrieved.method, RetrievalMethod::None);
        assert_eq!(pipeline.status().await, (false, None));
    }

    #[tokio::test]
    async fn test_speculation_flags_per_mode() {
        let document = Pipeline::Document(document_pipeline(FakeRetriever::empty(), &[]).await);
        let catalog = Pipeline::Catalog(CatalogPipeline::new(Arc::new(FakeCatalog::new(vec![])), 5, 0.2));

        assert_eq!(
            document.speculation(Intent::Futuristic, false),
            Speculation { allow: false, reported: false }
        );
        assert_eq!(
            document.speculation(Intent::Mixed, true),
            Speculation { allow: true, reported: true }
        );
        assert_eq!(
            document.speculation(Intent::Fact, true),
            Speculation { allow: false, reported: false }
        );
        assert_eq!(
            catalog.speculation(Intent::Fact, false),
            Speculation { allow: true, reported: false }
        );
        assert_eq!(
            catalog.speculation(Intent::Futuristic, false),
            Speculation { allow: true, reported: true }
        );
        assert_eq!(document.mode(), Mode::Document);
        assert_eq!(catalog.mode(), Mode::Catalog);
    }
}
