//! Raw text sources for corpus reindexing.

use docchat_core::{AppError, AppResult};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Anything that can hand over the full set of raw document texts.
pub trait TextSource: Send + Sync {
    /// Every document's text, in a stable order.
    fn load_texts(&self) -> AppResult<Vec<String>>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

impl TextSource for Vec<String> {
    fn load_texts(&self) -> AppResult<Vec<String>> {
        Ok(self.clone())
    }

    fn describe(&self) -> String {
        format!("{} in-memory texts", self.len())
    }
}

/// Content type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Markdown,
    PlainText,
    Unsupported,
}

impl ContentType {
    /// Detect content type from file extension.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("md") | Some("markdown") => Self::Markdown,
            Some("txt") | Some("text") => Self::PlainText,
            _ => Self::Unsupported,
        }
    }
}

/// Plain-text and markdown files under a directory, in path order.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn files(&self) -> AppResult<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(AppError::Index(format!(
                "Documents directory not found: {}",
                self.root.display()
            )));
        }

        let mut files: Vec<PathBuf> = WalkDir::new(&self.root)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| ContentType::from_path(path) != ContentType::Unsupported)
            .collect();

        files.sort();
        Ok(files)
    }
}

impl TextSource for DirectorySource {
    fn load_texts(&self) -> AppResult<Vec<String>> {
        let mut texts = Vec::new();

        for path in self.files()? {
            match parse_file(&path) {
                Ok(text) if !text.trim().is_empty() => texts.push(text),
                Ok(_) => tracing::debug!("Skipping empty file: {:?}", path),
                Err(e) => tracing::warn!("Skipping {:?}: {}", path, e),
            }
        }

        tracing::info!(
            "Loaded {} documents from {}",
            texts.len(),
            self.root.display()
        );

        Ok(texts)
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Read a source file and extract clean text.
pub fn parse_file(path: &Path) -> AppResult<String> {
    let raw = fs::read_to_string(path)?;

    if raw.contains('\0') {
        return Err(AppError::Index(format!("Binary content in {:?}", path)));
    }

    Ok(match ContentType::from_path(path) {
        ContentType::Markdown => clean_markdown(&raw),
        _ => raw,
    })
}

/// Strip header markers, rules and code fences. Blank lines are kept so
/// paragraph boundaries survive into chunking.
fn clean_markdown(text: &str) -> String {
    let mut lines = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim_start_matches('#').trim();

        if trimmed.starts_with("---") || trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            continue;
        }

        lines.push(trimmed);
    }

    lines.join("\n").trim().to_string()
}
