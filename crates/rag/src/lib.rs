//! Retrieval orchestration and answer gating for DocChat.
//!
//! Documents are chunked and pushed to an external vector index. Each
//! question is classified, answered from retrieved context, and gated so
//! that speculative or unsupported questions never produce confident
//! fabricated answers.

pub mod catalog;
pub mod chunker;
pub mod config;
pub mod corpus;
pub mod gate;
pub mod history;
pub mod intent;
pub mod pipeline;
pub mod retrieval;
pub mod service;
pub mod source;
pub mod synthesizer;
pub mod text;
pub mod types;

#[cfg(test)]
mod tests;

pub use catalog::{CatalogHit, CatalogProduct, CatalogStatus};
pub use chunker::Chunker;
pub use config::{get_config_path, get_corpus_path, load_config, RagConfig};
pub use corpus::DocumentCorpus;
pub use gate::RetrievalGate;
pub use history::ConversationWindow;
pub use intent::{classify_local, is_conversation_reference, IntentClassifier};
pub use pipeline::{CatalogPipeline, DocumentPipeline, Pipeline};
pub use retrieval::{CatalogRetriever, DocumentRetriever, HttpCatalogClient, HttpVectorClient};
pub use service::ChatService;
pub use source::{DirectorySource, TextSource};
pub use synthesizer::{AnswerPath, AnswerSynthesizer, SynthesisRequest};
pub use types::{
    ChatAnswer, ChatEntry, Intent, Mode, RetrievalMethod, RetrievalResult, ServiceStatus,
};
