//! Sentence-aware text splitting into overlapping nodes

use unicode_segmentation::UnicodeSegmentation;

use crate::config::ChunkingConfig;
use crate::error::Result;
use crate::types::{Document, TextNode};

/// Packs whole sentences into chunks of at most `chunk_size` characters,
/// carrying `chunk_overlap` characters of the previous chunk forward.
#[derive(Debug, Clone)]
pub struct SentenceSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl SentenceSplitter {
    /// Create a splitter; overlap must be smaller than the chunk size
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        ChunkingConfig {
            chunk_size,
            chunk_overlap,
            ..Default::default()
        }
        .validate()?;

        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    /// Create a splitter from the `[chunking]` config section
    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Split every document into nodes
    pub fn split_documents(&self, documents: &[Document]) -> Vec<TextNode> {
        documents.iter().flat_map(|doc| self.split_document(doc)).collect()
    }

    /// Split a single document into nodes
    pub fn split_document(&self, doc: &Document) -> Vec<TextNode> {
        self.split_text(&doc.text)
            .into_iter()
            .map(|(text, start, end)| TextNode::new(doc, text, start, end))
            .collect()
    }

    /// Split text into `(chunk, start_char, end_char)` triples
    pub fn split_text(&self, text: &str) -> Vec<(String, usize, usize)> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_len = 0usize;
        let mut current_start = 0usize;
        let mut char_pos = 0usize;

        for piece in self.pieces(text) {
            let piece_len = piece.chars().count();

            if current_len > 0 && current_len + piece_len > self.chunk_size {
                push_chunk(&mut chunks, &current, current_start, char_pos);

                current = self.overlap_tail(&current);
                current_len = current.chars().count();
                if current_len + piece_len > self.chunk_size {
                    current.clear();
                    current_len = 0;
                }
                current_start = char_pos - current_len;
            }

            current.push_str(piece);
            current_len += piece_len;
            char_pos += piece_len;
        }

        push_chunk(&mut chunks, &current, current_start, char_pos);
        chunks
    }

    /// Sentences, with any sentence longer than a chunk hard-split
    fn pieces<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut pieces = Vec::new();
        for sentence in text.split_sentence_bounds() {
            if sentence.chars().count() <= self.chunk_size {
                pieces.push(sentence);
                continue;
            }
            let mut rest = sentence;
            while !rest.is_empty() {
                let cut = rest
                    .char_indices()
                    .nth(self.chunk_size - self.chunk_overlap)
                    .map(|(i, _)| i)
                    .unwrap_or(rest.len());
                pieces.push(&rest[..cut]);
                rest = &rest[cut..];
            }
        }
        pieces
    }

    /// Last `chunk_overlap` characters, starting on a word boundary when possible
    fn overlap_tail(&self, text: &str) -> String {
        let total = text.chars().count();
        if self.chunk_overlap == 0 {
            return String::new();
        }
        if total <= self.chunk_overlap {
            return text.to_string();
        }

        let start = text
            .char_indices()
            .nth(total - self.chunk_overlap)
            .map(|(i, _)| i)
            .unwrap_or(0);
        let tail = &text[start..];

        match tail.find(' ') {
            Some(pos) if pos + 1 < tail.len() => tail[pos + 1..].to_string(),
            _ => tail.to_string(),
        }
    }
}

/// Store `text` trimmed, with its char offsets narrowed to match
fn push_chunk(chunks: &mut Vec<(String, usize, usize)>, text: &str, start: usize, end: usize) {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return;
    }
    let leading = text.chars().count() - text.trim_start().chars().count();
    let trailing = text.chars().count() - text.trim_end().chars().count();
    chunks.push((trimmed.to_string(), start + leading, end - trailing));
}
