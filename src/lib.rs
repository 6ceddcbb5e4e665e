//! ```text
//! memory root (*.md, kb/, archive/) ──► sources::memory ──┐
//!                                                          │  cleaned documents
//! sessions dir (*.jsonl) ──► sources::session ─────────────┤
//!                │                                         ▼
//!                └─► cleaning::TextPolicy      chunking::ParagraphChunker
//!                    (noise rules + transforms)            │
//!                                                          ▼
//!                                    pipeline::run_backfill ──► stores::ObservationSink
//!                                                               (pending observations)
//! ```
//!
//! memsift backfills a memory/observation store from historical sources:
//! knowledge-base markdown files and JSONL conversation transcripts are read,
//! stripped of noise and structural boilerplate, split into bounded chunks
//! along paragraph boundaries, and staged as pending records for a downstream
//! entity extractor.

pub mod chunking;
pub mod cleaning;
pub mod config;
pub mod pipeline;
pub mod sources;
pub mod stores;
pub mod types;

pub use chunking::{Chunk, ParagraphChunker};
pub use cleaning::TextPolicy;
pub use config::{BackfillConfig, SourceMode};
pub use pipeline::{BackfillReport, run_backfill};
pub use sources::{Provenance, SourceDocument};
pub use stores::{ObservationRecord, ObservationSink, SqliteObservationStore};
pub use types::BackfillError;
