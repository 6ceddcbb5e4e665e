//! Source readers that turn raw files into [`SourceDocument`]s.
//!
//! Two independent source families feed the pipeline:
//!
//! * [`memory`] — markdown knowledge-base files discovered under a root
//!   directory.
//! * [`session`] — newline-delimited JSON conversation transcripts, one
//!   aggregated document per file.
//!
//! Both yield `(text, provenance)` pairs and never abort the scan on a
//! per-file failure.

pub mod memory;
pub mod session;

use std::fmt;

pub use memory::scan_memory_files;
pub use session::scan_session_files;

/// Where a document (and every chunk cut from it) came from.
///
/// Rendered as `memory:<relative-path>` or `session:<file-basename>` when
/// persisted; the string form is traceability only and is never parsed
/// downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    /// A knowledge-base file, identified by its path relative to the
    /// memory root.
    Memory { path: String },
    /// A session transcript, identified by its file basename.
    Session { file: String },
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Memory { path } => write!(f, "memory:{path}"),
            Provenance::Session { file } => write!(f, "session:{file}"),
        }
    }
}

/// A unit of cleaned input text ready for chunking.
///
/// Constructed once per memory file, or once per session file after message
/// aggregation; immutable and discarded after chunking.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Normalized text content.
    pub text: String,
    /// Origin of the text.
    pub provenance: Provenance,
}
