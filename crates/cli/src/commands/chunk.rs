//! Chunk command handler.
//!
//! Runs the chunker over local files without touching any backend.

use clap::Args;
use docchat_core::{config::AppConfig, AppError, AppResult};
use docchat_rag::source::parse_file;
use docchat_rag::{load_config, Chunker};
use serde::Serialize;
use std::path::PathBuf;

/// Show how files would be chunked
#[derive(Args, Debug)]
pub struct ChunkCommand {
    /// Files to chunk
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Target chunk size in characters (default: from rag.yaml)
    #[arg(long)]
    pub size: Option<usize>,

    /// Overlap in characters (default: from rag.yaml)
    #[arg(long)]
    pub overlap: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChunkRecord {
    file: String,
    index: usize,
    chars: usize,
    text: String,
}

impl ChunkCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chunk command for {} files", self.files.len());

        let rag_config = load_config(&config.workspace)?;
        let chunker = Chunker::new(
            self.size.unwrap_or(rag_config.chunk_size),
            self.overlap.unwrap_or(rag_config.chunk_overlap),
        );

        let mut records = Vec::new();
        for file in &self.files {
            let text = parse_file(file)?;
            for (index, chunk) in chunker.chunk(&text).into_iter().enumerate() {
                records.push(ChunkRecord {
                    file: file.display().to_string(),
                    index,
                    chars: chunk.chars().count(),
                    text: chunk,
                });
            }
        }

        if self.json {
            let json = serde_json::to_string_pretty(&records)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            for record in &records {
                println!("--- {} #{} ({} chars)", record.file, record.index, record.chars);
                println!("{}", record.text);
            }
            println!("\n{} chunks", records.len());
        }

        Ok(())
    }
}
