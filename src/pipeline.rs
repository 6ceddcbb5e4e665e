//! End-to-end backfill orchestration.
//!
//! Documents flow one at a time through scan → normalize → chunk → sink.
//! There is no shared mutable state between documents and no concurrency;
//! memory files are processed first, then session files newest-first.

use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use crate::chunking::{Chunk, ParagraphChunker};
use crate::cleaning::TextPolicy;
use crate::config::BackfillConfig;
use crate::sources::{scan_memory_files, scan_session_files};
use crate::stores::{ObservationRecord, ObservationSink};
use crate::types::BackfillError;

/// How many chunks a dry run logs in full before summarizing the rest.
const DRY_RUN_SAMPLE: usize = 5;

/// Counters reported at the end of a run.
///
/// `inserted` reflects actual successful inserts, which may be smaller than
/// the chunk total under partial persistence failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackfillReport {
    /// Memory files that survived filtering and produced a document.
    pub memory_documents: usize,
    /// Session files that produced an aggregated document.
    pub session_documents: usize,
    /// Chunks cut from memory files.
    pub memory_chunks: usize,
    /// Chunks cut from session files.
    pub session_chunks: usize,
    /// Total characters across all chunks.
    pub total_chars: usize,
    /// Records actually persisted (always 0 on a dry run).
    pub inserted: usize,
    /// Whether persistence was skipped.
    pub dry_run: bool,
}

impl BackfillReport {
    /// Total chunks produced by the run.
    #[must_use]
    pub fn total_chunks(&self) -> usize {
        self.memory_chunks + self.session_chunks
    }
}

/// Batch key correlating every record of one run, e.g. `backfill-20240102`.
#[must_use]
pub fn batch_key(date: NaiveDate) -> String {
    format!("backfill-{}", date.format("%Y%m%d"))
}

/// Collect every chunk the configured sources yield, in processing order.
pub async fn collect_chunks(config: &BackfillConfig) -> (Vec<Chunk>, BackfillReport) {
    let policy = TextPolicy::standard(config.min_text_len);
    let chunker = ParagraphChunker::new(config.chunk_size);
    let mut chunks: Vec<Chunk> = Vec::new();
    let mut report = BackfillReport::default();

    if config.mode.includes_memory() {
        let documents =
            scan_memory_files(&config.memory_dir, config.min_text_len, &policy).await;
        report.memory_documents = documents.len();
        for document in &documents {
            chunks.extend(chunker.chunk_document(document));
        }
        report.memory_chunks = chunks.len();
        info!(
            documents = report.memory_documents,
            chunks = report.memory_chunks,
            "processed memory files"
        );
    }

    if config.mode.includes_sessions() {
        let documents = scan_session_files(
            &config.sessions_dir,
            config.recent_days,
            config.min_text_len,
            &policy,
        )
        .await;
        report.session_documents = documents.len();
        for document in &documents {
            chunks.extend(chunker.chunk_document(document));
        }
        report.session_chunks = chunks.len() - report.memory_chunks;
        info!(
            documents = report.session_documents,
            chunks = report.session_chunks,
            "processed session logs"
        );
    }

    report.total_chars = chunks.iter().map(|chunk| chunk.text.chars().count()).sum();
    (chunks, report)
}

/// Run a full backfill.
///
/// With `sink = None` the run is a dry run: chunks are collected and a
/// bounded sample is logged, but nothing is persisted. Per-record insert
/// failures are logged and skipped; only a connection-level store failure
/// (the count queries) aborts the run.
pub async fn run_backfill(
    config: &BackfillConfig,
    sink: Option<&dyn ObservationSink>,
) -> Result<BackfillReport, BackfillError> {
    let (chunks, mut report) = collect_chunks(config).await;
    info!(
        chunks = chunks.len(),
        chars = report.total_chars,
        approx_tokens = report.total_chars / 4,
        "staging complete"
    );

    let Some(sink) = sink else {
        report.dry_run = true;
        info!(would_insert = chunks.len(), "dry run, skipping persistence");
        for (idx, chunk) in chunks.iter().take(DRY_RUN_SAMPLE).enumerate() {
            let preview: String = chunk.text.chars().take(100).collect();
            info!(
                sample = idx + 1,
                provenance = %chunk.provenance,
                len = chunk.text.len(),
                preview,
                "dry run sample"
            );
        }
        if chunks.len() > DRY_RUN_SAMPLE {
            info!(more = chunks.len() - DRY_RUN_SAMPLE, "further chunks omitted");
        }
        return Ok(report);
    };

    let existing = sink.count_total().await?;
    let pending = sink.count_pending().await?;
    info!(existing, pending, "store state before backfill");

    let key = batch_key(Local::now().date_naive());
    for chunk in &chunks {
        let record = ObservationRecord::staged(chunk, &key);
        match sink.insert_observation(record).await {
            Ok(()) => report.inserted += 1,
            Err(err) => {
                warn!(%err, provenance = %chunk.provenance, "insert failed, continuing batch");
            }
        }
    }

    info!(
        inserted = report.inserted,
        of = chunks.len(),
        "backfill complete"
    );
    Ok(report)
}
