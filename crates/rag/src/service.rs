//! The chat service: one question in, one gated answer out.

use crate::chunker::Chunker;
use crate::config::{get_corpus_path, RagConfig};
use crate::corpus::DocumentCorpus;
use crate::gate::RetrievalGate;
use crate::history::ConversationWindow;
use crate::intent::{is_conversation_reference, IntentClassifier};
use crate::pipeline::{CatalogPipeline, DocumentPipeline, Pipeline};
use crate::retrieval::{HttpCatalogClient, HttpVectorClient};
use crate::source::{DirectorySource, TextSource};
use crate::synthesizer::{AnswerSynthesizer, SynthesisRequest};
use crate::text::excerpt;
use crate::types::{ChatAnswer, ChatEntry, Intent, Mode, ServiceStatus};
use docchat_core::{AppError, AppResult};
use docchat_llm::LlmClient;
use docchat_prompt::PromptDefinition;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const QUESTION_LOG_CHARS: usize = 500;
const ANSWER_LOG_CHARS: usize = 1000;

/// Process-scoped chat state and the pipeline that answers questions.
pub struct ChatService {
    classifier: IntentClassifier,
    synthesizer: AnswerSynthesizer,
    pipeline: Pipeline,
    window: ConversationWindow,
    history_window: usize,
    documents_dir: Option<PathBuf>,
}

impl ChatService {
    pub fn new(
        classifier: IntentClassifier,
        synthesizer: AnswerSynthesizer,
        pipeline: Pipeline,
        window: ConversationWindow,
        history_window: usize,
    ) -> Self {
        Self {
            classifier,
            synthesizer,
            pipeline,
            window,
            history_window,
            documents_dir: None,
        }
    }

    /// Directory read by [`ChatService::reindex`].
    pub fn with_documents_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.documents_dir = Some(dir.into());
        self
    }

    /// Wire the HTTP backends, the persisted corpus and the optional
    /// generative collaborator from configuration.
    pub fn from_config(
        workspace: &Path,
        config: &RagConfig,
        llm: Option<Arc<dyn LlmClient>>,
        model: &str,
        prompt: PromptDefinition,
    ) -> AppResult<Self> {
        config.validate()?;

        let classifier = match (&llm, config.classifier_enabled) {
            (Some(client), true) => IntentClassifier::with_llm(Arc::clone(client), model),
            _ => IntentClassifier::local(),
        };

        let mut synthesizer = AnswerSynthesizer::new(prompt)
            .with_generation(config.generation_temperature, config.generation_max_tokens);
        match llm {
            Some(client) if config.generation_enabled => {
                synthesizer = synthesizer.with_llm(client, model);
            }
            Some(_) => tracing::info!("Answer generation disabled; using extractive answers"),
            None => {}
        }

        let pipeline = match config.mode {
            Mode::Document => {
                let retriever = HttpVectorClient::new(
                    &config.vector_url,
                    &config.embedding_model,
                    config.index_batch_size,
                    config.vector_timeout(),
                )?;
                Pipeline::Document(DocumentPipeline::new(
                    Arc::new(retriever),
                    DocumentCorpus::open(get_corpus_path(workspace)),
                    Chunker::from_config(config),
                    RetrievalGate::new(config.min_chunks, config.min_score),
                    config.top_k,
                ))
            }
            Mode::Catalog => {
                let retriever = HttpCatalogClient::new(&config.catalog_url, config.catalog_timeout())?;
                Pipeline::Catalog(CatalogPipeline::new(
                    Arc::new(retriever),
                    config.catalog_top_k,
                    config.catalog_min_score,
                ))
            }
        };

        let documents_dir = if config.documents_dir.is_absolute() {
            config.documents_dir.clone()
        } else {
            workspace.join(&config.documents_dir)
        };

        tracing::debug!(
            mode = %config.mode,
            llm = synthesizer.has_llm(),
            llm_classifier = classifier.has_llm(),
            "Chat service configured"
        );

        Ok(Self::new(
            classifier,
            synthesizer,
            pipeline,
            ConversationWindow::new(config.history_max_entries),
            config.history_window,
        )
        .with_documents_dir(documents_dir))
    }

    pub fn mode(&self) -> Mode {
        self.pipeline.mode()
    }

    /// Answer `question` and record the exchange.
    ///
    /// Collaborator failures degrade into fallback answers; the only error
    /// is a blank question.
    pub async fn answer(&self, question: &str, allow_speculation: bool) -> AppResult<ChatAnswer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::Validation("question must not be blank".to_string()));
        }

        tracing::info!(mode = %self.mode(), "question: {}", excerpt(question, QUESTION_LOG_CHARS));

        let intent = self.classifier.classify(question).await;
        let conversation_ref = is_conversation_reference(question);
        let history = self.window.recent(self.history_window);

        let retrieved = self
            .pipeline
            .retrieve(question, conversation_ref, !history.is_empty())
            .await;
        let speculation = self.pipeline.speculation(intent, allow_speculation);

        let synthesis = self
            .synthesizer
            .synthesize(&SynthesisRequest {
                question,
                chunks: &retrieved.chunks,
                history: &history,
                intent,
                supported: retrieved.supported,
                allow_speculation: speculation.allow,
                conversation_ref,
                corpus_empty: retrieved.corpus_empty,
            })
            .await;

        if !(intent == Intent::Fact && retrieved.supported) {
            tracing::info!(
                intent = %intent,
                supported = retrieved.supported,
                speculative = speculation.reported,
                retrieval = %retrieved.method,
                conversation_ref,
                path = ?synthesis.path,
                "guardrail decision"
            );
        }

        tracing::info!("answer: {}", excerpt(&synthesis.answer, ANSWER_LOG_CHARS));

        self.window.append(question, synthesis.answer.clone());

        Ok(ChatAnswer {
            answer: synthesis.answer,
            intent,
            supported: retrieved.supported,
            speculative: speculation.reported,
            retrieval_method: retrieved.method,
            media: retrieved.media,
        })
    }

    /// Reindex from the configured documents directory.
    pub async fn reindex(&self) -> AppResult<usize> {
        let dir = self
            .documents_dir
            .clone()
            .ok_or_else(|| AppError::Config("no documents directory configured".to_string()))?;
        self.reindex_from(&DirectorySource::new(dir)).await
    }

    /// Reindex from any text source. Catalog mode has no local corpus and
    /// indexes nothing.
    pub async fn reindex_from(&self, source: &dyn TextSource) -> AppResult<usize> {
        match &self.pipeline {
            Pipeline::Document(pipeline) => pipeline.reindex(source).await,
            Pipeline::Catalog(_) => {
                tracing::info!("Catalog mode has no document corpus, skipping reindex");
                Ok(0)
            }
        }
    }

    pub async fn status(&self) -> ServiceStatus {
        let history_entries = self.window.len();

        match &self.pipeline {
            Pipeline::Document(pipeline) => {
                let corpus = pipeline.corpus();
                let chunks_loaded = corpus.len();
                ServiceStatus {
                    mode: Mode::Document,
                    chunks_loaded,
                    indexing: corpus.is_indexing(),
                    last_index_error: corpus.last_error(),
                    last_indexed_at: corpus.last_indexed_at(),
                    ready: chunks_loaded > 0,
                    catalog_products: None,
                    history_entries,
                }
            }
            Pipeline::Catalog(pipeline) => {
                let (ready, products) = pipeline.status().await;
                ServiceStatus {
                    mode: Mode::Catalog,
                    chunks_loaded: 0,
                    indexing: false,
                    last_index_error: None,
                    last_indexed_at: None,
                    ready,
                    catalog_products: products,
                    history_entries,
                }
            }
        }
    }

    /// Recorded exchanges, oldest first.
    pub fn history(&self) -> Vec<ChatEntry> {
        self.window.snapshot()
    }

    pub fn clear_history(&self) {
        self.window.clear();
        tracing::info!("Conversation history cleared");
    }
}
