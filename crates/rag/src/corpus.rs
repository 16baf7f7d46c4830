//! In-memory chunk corpus with whole-corpus replacement on reindex.

use crate::chunker::Chunker;
use crate::retrieval::DocumentRetriever;
use crate::source::TextSource;
use chrono::{DateTime, Utc};
use docchat_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

/// On-disk form of the corpus.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedCorpus {
    chunks: Vec<String>,
    last_indexed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct IndexState {
    last_error: Option<String>,
    last_indexed_at: Option<DateTime<Utc>>,
}

/// Shared chunk corpus.
///
/// Readers get an `Arc` snapshot, so a concurrent reindex can never expose
/// a partially rebuilt corpus. At most one reindex runs at a time.
#[derive(Debug, Default)]
pub struct DocumentCorpus {
    chunks: RwLock<Arc<Vec<String>>>,
    indexing: AtomicBool,
    state: Mutex<IndexState>,
    path: Option<PathBuf>,
}

/// Clears the indexing flag when the reindex ends, however it ends.
struct IndexingGuard<'a>(&'a AtomicBool);

impl Drop for IndexingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl DocumentCorpus {
    /// Empty corpus that is never written to disk.
    pub fn new() -> Self {
        Self::default()
    }

    /// Corpus persisted at `path`, loading whatever is already there.
    ///
    /// An unreadable file leaves the corpus empty and is reported through
    /// `last_error`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut corpus = Self {
            path: Some(path.clone()),
            ..Self::default()
        };

        if !path.exists() {
            return corpus;
        }

        match load_persisted(&path) {
            Ok(persisted) => {
                tracing::debug!(
                    "Loaded {} chunks from {}",
                    persisted.chunks.len(),
                    path.display()
                );
                corpus.chunks = RwLock::new(Arc::new(persisted.chunks));
                corpus.state = Mutex::new(IndexState {
                    last_error: None,
                    last_indexed_at: persisted.last_indexed_at,
                });
            }
            Err(e) => {
                tracing::warn!("Ignoring unreadable corpus file {}: {}", path.display(), e);
                corpus.state = Mutex::new(IndexState {
                    last_error: Some(e.to_string()),
                    last_indexed_at: None,
                });
            }
        }

        corpus
    }

    /// Current chunks; stays valid even if a reindex swaps the corpus.
    pub fn snapshot(&self) -> Arc<Vec<String>> {
        let chunks = self
            .chunks
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&chunks)
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    pub fn is_indexing(&self) -> bool {
        self.indexing.load(Ordering::Acquire)
    }

    pub fn last_error(&self) -> Option<String> {
        self.state().last_error.clone()
    }

    pub fn last_indexed_at(&self) -> Option<DateTime<Utc>> {
        self.state().last_indexed_at
    }

    /// Rebuild the corpus from `source`.
    ///
    /// The new corpus is staged on disk, then pushed to `retriever`; the
    /// staged file and the in-memory corpus are committed only once the
    /// backend accepts the chunks. On failure the previous corpus stays
    /// queryable and the error is kept for the status surface.
    pub async fn reindex(
        &self,
        source: &dyn TextSource,
        chunker: &Chunker,
        retriever: &dyn DocumentRetriever,
    ) -> AppResult<usize> {
        if self
            .indexing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(AppError::Index("reindex already in progress".to_string()));
        }
        let _guard = IndexingGuard(&self.indexing);

        tracing::info!("Reindexing corpus from {}", source.describe());

        match self.rebuild(source, chunker, retriever).await {
            Ok(count) => {
                tracing::info!("Reindex complete: {} chunks", count);
                Ok(count)
            }
            Err(e) => {
                tracing::error!("Reindex failed: {}", e);
                self.state().last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn rebuild(
        &self,
        source: &dyn TextSource,
        chunker: &Chunker,
        retriever: &dyn DocumentRetriever,
    ) -> AppResult<usize> {
        let texts = source.load_texts()?;
        let chunks = chunker.chunk_all(&texts);

        let indexed_at = Utc::now();
        let staged = match &self.path {
            Some(path) => Some(stage_persisted(path, &chunks, indexed_at)?),
            None => None,
        };

        if let Err(e) = retriever.index(&chunks).await {
            if let Some(tmp) = &staged {
                if let Err(rm) = fs::remove_file(tmp) {
                    tracing::debug!("Could not remove staged corpus {}: {}", tmp.display(), rm);
                }
            }
            return Err(e);
        }

        let count = chunks.len();
        *self
            .chunks
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Arc::new(chunks);

        // The backend already holds the new chunks, so a failed commit is
        // reported rather than rolled back.
        let commit_error = match (&self.path, &staged) {
            (Some(path), Some(tmp)) => fs::rename(tmp, path).err().map(|e| {
                tracing::warn!("Indexed corpus could not be saved to {}: {}", path.display(), e);
                format!("Indexed {} chunks but could not save corpus: {}", count, e)
            }),
            _ => None,
        };

        let mut state = self.state();
        state.last_error = commit_error;
        state.last_indexed_at = Some(indexed_at);

        Ok(count)
    }

    fn state(&self) -> std::sync::MutexGuard<'_, IndexState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn load_persisted(path: &Path) -> AppResult<PersistedCorpus> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Write the corpus to a sibling temp file; renaming it over `path`
/// commits it.
fn stage_persisted(
    path: &Path,
    chunks: &[String],
    indexed_at: DateTime<Utc>,
) -> AppResult<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let persisted = PersistedCorpus {
        chunks: chunks.to_vec(),
        last_indexed_at: Some(indexed_at),
    };

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_string(&persisted)?)?;

    tracing::debug!("Staged corpus at {}", tmp.display());
    Ok(tmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::fakes::FakeRetriever;
    use tempfile::TempDir;
    use tokio::sync::Notify;

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_reindex_swaps_corpus_after_backend_success() {
        let corpus = DocumentCorpus::new();
        let retriever = FakeRetriever::empty();
        let chunker = Chunker::new(500, 100);

        let count = corpus
            .reindex(&texts(&["Alpha.", "Beta."]), &chunker, &retriever)
            .await
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(*corpus.snapshot(), texts(&["Alpha.", "Beta."]));
        assert_eq!(retriever.indexed(), vec![texts(&["Alpha.", "Beta."])]);
        assert!(corpus.last_indexed_at().is_some());
        assert!(corpus.last_error().is_none());
        assert!(!corpus.is_indexing());
    }

    #[tokio::test]
    async fn test_failed_reindex_keeps_previous_corpus() {
        let corpus = DocumentCorpus::new();
        let chunker = Chunker::new(500, 100);
        corpus
            .reindex(&texts(&["Old."]), &chunker, &FakeRetriever::empty())
            .await
            .unwrap();

        let failing = FakeRetriever::empty().with_index_failure();
        let err = corpus
            .reindex(&texts(&["New."]), &chunker, &failing)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Index(_)));
        assert_eq!(*corpus.snapshot(), texts(&["Old."]));
        assert!(corpus.last_error().is_some());
        assert!(!corpus.is_indexing());
    }

    #[tokio::test]
    async fn test_concurrent_reindex_is_rejected() {
        let corpus = DocumentCorpus::new();
        let chunker = Chunker::new(500, 100);
        let release = Arc::new(Notify::new());
        let blocking = FakeRetriever::empty().with_index_gate(release.clone());
        let first_source = texts(&["First."]);
        let second_source = texts(&["Second."]);

        let (first, second) = tokio::join!(
            corpus.reindex(&first_source, &chunker, &blocking),
            async {
                assert!(corpus.is_indexing());
                assert!(corpus.is_empty());
                let result = corpus
                    .reindex(&second_source, &chunker, &FakeRetriever::empty())
                    .await;
                release.notify_one();
                result
            }
        );

        assert_eq!(first.unwrap(), 1);
        assert!(matches!(second, Err(AppError::Index(_))));
        assert_eq!(*corpus.snapshot(), texts(&["First."]));
    }

    #[tokio::test]
    async fn test_persisted_corpus_reloads() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".docchat").join("corpus.json");

        let corpus = DocumentCorpus::open(&path);
        assert!(corpus.is_empty());
        corpus
            .reindex(&texts(&["Kept."]), &Chunker::new(500, 100), &FakeRetriever::empty())
            .await
            .unwrap();

        let reopened = DocumentCorpus::open(&path);
        assert_eq!(*reopened.snapshot(), texts(&["Kept."]));
        assert_eq!(reopened.last_indexed_at(), corpus.last_indexed_at());
    }

    #[tokio::test]
    async fn test_unwritable_corpus_is_never_sent_to_backend() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let corpus = DocumentCorpus::open(blocker.join("corpus.json"));
        let retriever = FakeRetriever::empty();
        let result = corpus
            .reindex(&texts(&["Fresh."]), &Chunker::new(500, 100), &retriever)
            .await;

        assert!(result.is_err());
        assert!(retriever.indexed().is_empty());
        assert!(corpus.is_empty());
        assert!(corpus.last_error().is_some());
    }

    #[tokio::test]
    async fn test_backend_failure_discards_staged_corpus() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("corpus.json");
        let corpus = DocumentCorpus::open(&path);

        let failing = FakeRetriever::empty().with_index_failure();
        assert!(corpus
            .reindex(&texts(&["Lost."]), &Chunker::new(500, 100), &failing)
            .await
            .is_err());

        assert!(!path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_corrupt_corpus_file_reports_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("corpus.json");
        fs::write(&path, "{not json").unwrap();

        let corpus = DocumentCorpus::open(&path);
        assert!(corpus.is_empty());
        assert!(corpus.last_error().is_some());
    }
}
