//! Persistence for staged observations.
//!
//! The pipeline talks to storage through the [`ObservationSink`] trait: one
//! append operation plus two count queries. The schema and storage technology
//! live behind the trait; [`sqlite::SqliteObservationStore`] is the shipped
//! implementation.

pub mod sqlite;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chunking::Chunk;
use crate::types::BackfillError;

pub use sqlite::SqliteObservationStore;

/// Prefix marking a record's origin as this backfill tool.
pub const BACKFILL_SOURCE_PREFIX: &str = "backfill:";

/// One staged observation, awaiting entity extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationRecord {
    /// Unique record id.
    pub id: String,
    /// Provenance string, prefixed with [`BACKFILL_SOURCE_PREFIX`].
    pub source: String,
    /// The chunk text.
    pub raw_text: String,
    /// Placeholder for not-yet-computed entities; empty marks the record
    /// as pending.
    pub entities_json: String,
    /// Batch key correlating every record of one run.
    pub session_key: String,
}

impl ObservationRecord {
    /// Stage a chunk as a pending record under the given batch key.
    #[must_use]
    pub fn staged(chunk: &Chunk, session_key: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            source: format!("{BACKFILL_SOURCE_PREFIX}{}", chunk.provenance),
            raw_text: chunk.text.clone(),
            entities_json: String::new(),
            session_key: session_key.to_string(),
        }
    }
}

/// Append target for staged observations.
///
/// Insertions are independent operations: a failed insert must not poison
/// the connection or abort the batch. Only connection-level failures (the
/// store cannot be reached at all) surface as errors from the counts.
#[async_trait]
pub trait ObservationSink: Send + Sync {
    /// Append one record.
    async fn insert_observation(&self, record: ObservationRecord) -> Result<(), BackfillError>;

    /// Total number of observations in the store.
    async fn count_total(&self) -> Result<usize, BackfillError>;

    /// Number of observations still awaiting extraction (empty
    /// `entities_json`).
    async fn count_pending(&self) -> Result<usize, BackfillError>;
}
