//! Paragraph-aware text chunking with overlap.
//!
//! Paragraphs (blank-line separated) are accumulated into a buffer of about
//! `size` characters. When the next unit does not fit, the buffer is flushed
//! and the new buffer is seeded with the last `overlap` characters of the
//! flushed chunk, so dropping each chunk's leading overlap and concatenating
//! gives back the normalized text. Paragraphs longer than `2 × size` are fed in sentence by
//! sentence under the same rule. Sentences are never cut, so a sentence
//! longer than the target becomes an oversized chunk of its own.

use crate::config::RagConfig;
use crate::text::{char_len, collapse_whitespace, split_sentences, tail_chars};
use regex::Regex;
use std::sync::LazyLock;

static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("paragraph regex is valid"));

const PARAGRAPH_SEPARATOR: &str = "\n\n";
const SENTENCE_SEPARATOR: &str = " ";

/// Deterministic chunker; the same input always yields the same chunks.
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    size: usize,
    overlap: usize,
}

impl Chunker {
    /// `overlap` is clamped below `size`.
    pub fn new(size: usize, overlap: usize) -> Self {
        let size = size.max(1);
        Self {
            size,
            overlap: overlap.min(size - 1),
        }
    }

    pub fn from_config(config: &RagConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split one document into ordered chunks.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        let mut buffer = ChunkBuffer::new(*self);

        for raw in PARAGRAPH_BREAK.split(&normalized) {
            let paragraph = collapse_whitespace(raw);
            if paragraph.is_empty() {
                continue;
            }
            buffer.push_paragraph(&paragraph);
        }

        let chunks = buffer.finish();

        tracing::debug!(
            "Chunked text into {} chunks (size: {}, overlap: {})",
            chunks.len(),
            self.size,
            self.overlap
        );

        chunks
    }

    /// Chunk several documents, keeping document order.
    pub fn chunk_all<I, S>(&self, texts: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        texts
            .into_iter()
            .flat_map(|text| self.chunk(text.as_ref()))
            .collect()
    }
}

struct ChunkBuffer {
    chunker: Chunker,
    chunks: Vec<String>,
    buf: String,
    buf_len: usize,
}

impl ChunkBuffer {
    fn new(chunker: Chunker) -> Self {
        Self {
            chunker,
            chunks: Vec::new(),
            buf: String::new(),
            buf_len: 0,
        }
    }

    fn push_paragraph(&mut self, paragraph: &str) {
        let len = char_len(paragraph);
        let limit = self.chunker.size * 2;

        // A paragraph that cannot sit behind the overlap seed within 2×size
        // goes in sentence by sentence as well.
        if len > limit || self.length_after_push(len, PARAGRAPH_SEPARATOR) > limit {
            for (i, sentence) in split_sentences(paragraph).into_iter().enumerate() {
                let separator = if i == 0 {
                    PARAGRAPH_SEPARATOR
                } else {
                    SENTENCE_SEPARATOR
                };
                self.push(sentence, separator);
            }
        } else {
            self.push(paragraph, PARAGRAPH_SEPARATOR);
        }
    }

    fn needs_flush(&self, unit_len: usize, separator: &str) -> bool {
        self.buf_len > 0 && self.buf_len + separator.len() + unit_len > self.chunker.size
    }

    /// A flushed chunk shorter than the overlap is carried over whole.
    fn seed_len(&self) -> usize {
        self.buf_len.min(self.chunker.overlap)
    }

    /// Buffer length once a unit of `unit_len` chars has been pushed.
    fn length_after_push(&self, unit_len: usize, separator: &str) -> usize {
        let base = if self.needs_flush(unit_len, separator) {
            self.seed_len()
        } else {
            self.buf_len
        };
        if base == 0 {
            unit_len
        } else {
            base + separator.len() + unit_len
        }
    }

    fn push(&mut self, unit: &str, separator: &str) {
        let unit_len = char_len(unit);

        if self.needs_flush(unit_len, separator) {
            self.flush_with_overlap();
        }

        if self.buf_len > 0 {
            self.buf.push_str(separator);
            self.buf_len += separator.len();
        }
        self.buf.push_str(unit);
        self.buf_len += unit_len;
    }

    fn flush_with_overlap(&mut self) {
        let seed_len = self.seed_len();
        let seed = if seed_len > 0 {
            tail_chars(&self.buf, seed_len).to_string()
        } else {
            String::new()
        };

        let chunk = std::mem::replace(&mut self.buf, seed);
        self.chunks.push(chunk);
        self.buf_len = seed_len;
    }

    fn finish(mut self) -> Vec<String> {
        if !self.buf.trim().is_empty() {
            self.chunks.push(self.buf);
        }
        self.chunks
    }
}
