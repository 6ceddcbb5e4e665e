//! SQLite-backed observation sink.

use std::path::Path;

use async_trait::async_trait;
use tokio_rusqlite::Connection;

use super::{ObservationRecord, ObservationSink};
use crate::types::BackfillError;

/// Append-only observation store over a SQLite database.
///
/// Rows autocommit individually, so one rejected insert never rolls back the
/// rest of a batch.
#[derive(Clone)]
pub struct SqliteObservationStore {
    conn: Connection,
}

impl SqliteObservationStore {
    /// Open (or create) the database at `path` and ensure the
    /// `observations` table exists.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, BackfillError> {
        let conn = Connection::open(path)
            .await
            .map_err(|err| BackfillError::Storage(err.to_string()))?;
        Self::with_connection(conn).await
    }

    /// In-memory store, used by tests.
    pub async fn open_in_memory() -> Result<Self, BackfillError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|err| BackfillError::Storage(err.to_string()))?;
        Self::with_connection(conn).await
    }

    async fn with_connection(conn: Connection) -> Result<Self, BackfillError> {
        conn.call(|conn| {
            conn.execute(
                "CREATE TABLE IF NOT EXISTS observations (
                    id TEXT PRIMARY KEY,
                    source TEXT NOT NULL,
                    raw_text TEXT NOT NULL,
                    entities_json TEXT NOT NULL DEFAULT '',
                    session_key TEXT NOT NULL,
                    created_at TEXT NOT NULL DEFAULT (datetime('now'))
                )",
                [],
            )
            .map_err(tokio_rusqlite::Error::Rusqlite)?;
            Ok(())
        })
        .await?;
        Ok(Self { conn })
    }

    async fn count_where(&self, sql: &'static str) -> Result<usize, BackfillError> {
        let count = self
            .conn
            .call(move |conn| {
                let count: i64 = conn
                    .query_row(sql, [], |row| row.get(0))
                    .map_err(tokio_rusqlite::Error::Rusqlite)?;
                Ok(count)
            })
            .await?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

#[async_trait]
impl ObservationSink for SqliteObservationStore {
    async fn insert_observation(&self, record: ObservationRecord) -> Result<(), BackfillError> {
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO observations (id, source, raw_text, entities_json, session_key)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    (
                        &record.id,
                        &record.source,
                        &record.raw_text,
                        &record.entities_json,
                        &record.session_key,
                    ),
                )
                .map_err(tokio_rusqlite::Error::Rusqlite)?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    async fn count_total(&self) -> Result<usize, BackfillError> {
        self.count_where("SELECT COUNT(*) FROM observations").await
    }

    async fn count_pending(&self) -> Result<usize, BackfillError> {
        self.count_where("SELECT COUNT(*) FROM observations WHERE entities_json = ''")
            .await
    }
}
