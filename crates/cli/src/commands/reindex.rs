//! Reindex command handler.

use super::service::build_service;
use clap::Args;
use docchat_core::{config::AppConfig, AppResult};
use docchat_rag::DirectorySource;
use std::path::PathBuf;

/// Rebuild the document corpus and push it to the vector service
#[derive(Args, Debug)]
pub struct ReindexCommand {
    /// Directory to read (default: documents_dir from rag.yaml)
    pub dir: Option<PathBuf>,
}

impl ReindexCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing reindex command");

        let (service, _) = build_service(config)?;

        let count = match &self.dir {
            Some(dir) => service.reindex_from(&DirectorySource::new(dir)).await?,
            None => service.reindex().await?,
        };

        println!("Indexed {} chunks", count);
        Ok(())
    }
}
