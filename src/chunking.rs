//! Paragraph-aware chunking of normalized text.

use crate::sources::{Provenance, SourceDocument};

/// Separator between paragraphs, and the join used when accumulating them.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// A bounded-size slice of normalized text, ready to become one observation.
///
/// Emission order is the implicit sequence number; rejoining a document's
/// chunks with [`PARAGRAPH_SEPARATOR`] reproduces its normalized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Trimmed chunk text.
    pub text: String,
    /// Origin, identical across every chunk of one document.
    pub provenance: Provenance,
}

/// Splits text into chunks no larger than `chunk_size` characters, breaking
/// only at paragraph boundaries.
///
/// A single paragraph longer than the limit is emitted whole and oversized.
/// That is intentional: splitting mid-paragraph would hand the extractor a
/// truncated thought, which costs more than an occasional large chunk.
#[derive(Debug, Clone, Copy)]
pub struct ParagraphChunker {
    chunk_size: usize,
}

impl ParagraphChunker {
    /// Create a chunker with the given size limit in characters.
    #[must_use]
    pub fn new(chunk_size: usize) -> Self {
        Self { chunk_size }
    }

    /// The configured size limit.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Cut a document into chunks, each tagged with the document's provenance.
    #[must_use]
    pub fn chunk_document(&self, document: &SourceDocument) -> Vec<Chunk> {
        self.split(&document.text)
            .into_iter()
            .map(|text| Chunk {
                text,
                provenance: document.provenance.clone(),
            })
            .collect()
    }

    /// Split `text` along paragraph boundaries into bounded pieces.
    ///
    /// Sizes are measured in characters, matching the configured limit.
    #[must_use]
    pub fn split(&self, text: &str) -> Vec<String> {
        if text.chars().count() <= self.chunk_size {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Vec::new();
            }
            return vec![trimmed.to_string()];
        }

        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_chars = 0usize;

        for para in text.split(PARAGRAPH_SEPARATOR) {
            let para_chars = para.chars().count();
            let would_be = current_chars + para_chars + PARAGRAPH_SEPARATOR.len();
            if would_be > self.chunk_size && !current.is_empty() {
                chunks.push(current.trim().to_string());
                current = para.to_string();
                current_chars = para_chars;
            } else if current.is_empty() {
                current = para.to_string();
                current_chars = para_chars;
            } else {
                current.push_str(PARAGRAPH_SEPARATOR);
                current.push_str(para);
                current_chars += PARAGRAPH_SEPARATOR.len() + para_chars;
            }
        }

        if !current.trim().is_empty() {
            chunks.push(current.trim().to_string());
        }

        chunks
    }
}
