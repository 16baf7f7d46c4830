//! Pipeline configuration.
//!
//! Loaded from `.docchat/rag.yaml`; every field has a default so a partial
//! (or missing) file is fine.

use crate::types::Mode;
use docchat_core::{config::STATE_DIR, AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Tuning for chunking, retrieval, gating, synthesis and history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Pipeline selection
    pub mode: Mode,

    /// Target chunk size in characters
    pub chunk_size: usize,

    /// Characters carried from one chunk into the next
    pub chunk_overlap: usize,

    /// Documents requested from the vector backend
    pub top_k: usize,

    /// Fewer documents than this is never supported
    pub min_chunks: usize,

    /// Best score must reach this for support
    pub min_score: f32,

    /// Conversation window capacity
    pub history_max_entries: usize,

    /// Most recent entries supplied to synthesis
    pub history_window: usize,

    /// Whether speculative questions may reach the generative collaborator
    pub allow_speculation: bool,

    /// Use the generative collaborator for intent labels
    pub classifier_enabled: bool,

    /// Use the generative collaborator for answers; off means extractive only
    pub generation_enabled: bool,

    pub generation_temperature: f32,
    pub generation_max_tokens: u32,

    /// Directory of source texts for reindexing (relative to the workspace)
    pub documents_dir: PathBuf,

    pub vector_url: String,
    pub vector_timeout_ms: u64,
    pub embedding_model: String,
    pub index_batch_size: usize,

    pub catalog_url: String,
    pub catalog_timeout_ms: u64,
    pub catalog_top_k: usize,
    pub catalog_min_score: f32,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Document,
            chunk_size: 500,
            chunk_overlap: 100,
            top_k: 3,
            min_chunks: 1,
            min_score: 0.2,
            history_max_entries: 10,
            history_window: 10,
            allow_speculation: true,
            classifier_enabled: true,
            generation_enabled: true,
            generation_temperature: 0.7,
            generation_max_tokens: 500,
            documents_dir: PathBuf::from("documents"),
            vector_url: "http://localhost:9100".to_string(),
            vector_timeout_ms: 60_000,
            embedding_model: "text-embedding-3-small".to_string(),
            index_batch_size: 128,
            catalog_url: "http://localhost:9000".to_string(),
            catalog_timeout_ms: 10_000,
            catalog_top_k: 5,
            catalog_min_score: 0.2,
        }
    }
}

impl RagConfig {
    pub fn vector_timeout(&self) -> Duration {
        Duration::from_millis(self.vector_timeout_ms)
    }

    pub fn catalog_timeout(&self) -> Duration {
        Duration::from_millis(self.catalog_timeout_ms)
    }

    /// Reject settings the pipeline cannot honor.
    pub fn validate(&self) -> AppResult<()> {
        if self.chunk_size == 0 {
            return Err(AppError::Config("chunk_size must be positive".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(AppError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 || self.catalog_top_k == 0 {
            return Err(AppError::Config("top_k must be positive".to_string()));
        }
        Ok(())
    }
}

/// Load the pipeline configuration for a workspace.
pub fn load_config(workspace: &Path) -> AppResult<RagConfig> {
    let config_path = get_config_path(workspace);

    if !config_path.exists() {
        tracing::debug!("No {:?}; using default pipeline config", config_path);
        return Ok(RagConfig::default());
    }

    let content = fs::read_to_string(&config_path).map_err(|e| {
        AppError::Config(format!("Failed to read config at {:?}: {}", config_path, e))
    })?;

    let config: RagConfig = serde_yaml::from_str(&content).map_err(|e| {
        AppError::Config(format!("Failed to parse config at {:?}: {}", config_path, e))
    })?;

    config.validate()?;

    tracing::debug!("Loaded pipeline config from {:?}", config_path);
    Ok(config)
}

/// Path to the pipeline config file.
pub fn get_config_path(workspace: &Path) -> PathBuf {
    workspace.join(STATE_DIR).join("rag.yaml")
}

/// Path of the persisted chunk corpus.
pub fn get_corpus_path(workspace: &Path) -> PathBuf {
    workspace.join(STATE_DIR).join("corpus.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_default_config() {
        let temp = TempDir::new().unwrap();
        let config = load_config(temp.path()).unwrap();

        assert_eq!(config.mode, Mode::Document);
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.chunk_overlap, 100);
        assert_eq!(config.history_max_entries, 10);
        assert!(config.generation_enabled);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = get_config_path(temp.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            "mode: catalog\nmin_score: 0.25\ngeneration_enabled: false\n",
        )
        .unwrap();

        let config = load_config(temp.path()).unwrap();
        assert_eq!(config.mode, Mode::Catalog);
        assert!(!config.generation_enabled);
        assert!(config.classifier_enabled);
        assert_eq!(config.min_score, 0.25);
        assert_eq!(config.top_k, 3);
        assert_eq!(config.catalog_url, "http://localhost:9000");
    }

    #[test]
    fn test_overlap_must_be_smaller_than_size() {
        let config = RagConfig {
            chunk_size: 100,
            chunk_overlap: 100,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
