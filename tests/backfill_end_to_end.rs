//! End-to-end runs over real fixture trees: tempdir sources, a recording
//! sink for semantics, and the SQLite store for persistence.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use memsift::{
    BackfillConfig, BackfillError, ObservationRecord, ObservationSink, SourceMode,
    SqliteObservationStore, run_backfill,
};
use tempfile::TempDir;

// ── Test sink ──────────────────────────────────────────────────────────

/// Sink that captures records in memory; optionally rejects records whose
/// text contains a marker, to exercise partial-failure behavior.
#[derive(Default)]
struct RecordingSink {
    records: Mutex<Vec<ObservationRecord>>,
    reject_containing: Option<&'static str>,
}

#[async_trait]
impl ObservationSink for RecordingSink {
    async fn insert_observation(&self, record: ObservationRecord) -> Result<(), BackfillError> {
        if let Some(marker) = self.reject_containing {
            if record.raw_text.contains(marker) {
                return Err(BackfillError::Storage("simulated insert failure".into()));
            }
        }
        self.records.lock().unwrap().push(record);
        Ok(())
    }

    async fn count_total(&self) -> Result<usize, BackfillError> {
        Ok(self.records.lock().unwrap().len())
    }

    async fn count_pending(&self) -> Result<usize, BackfillError> {
        Ok(self.records.lock().unwrap().len())
    }
}

// ── Fixtures ───────────────────────────────────────────────────────────

struct Fixture {
    _dir: TempDir,
    config: BackfillConfig,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("memory")).unwrap();
    std::fs::create_dir_all(dir.path().join("sessions")).unwrap();
    let config = BackfillConfig::new()
        .memory_dir(dir.path().join("memory"))
        .sessions_dir(dir.path().join("sessions"));
    Fixture { _dir: dir, config }
}

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

fn message_line(role: &str, text: &str) -> String {
    format!(
        r#"{{"message": {{"role": {}, "content": {}}}}}"#,
        serde_json::to_string(role).unwrap(),
        serde_json::to_string(text).unwrap()
    )
}

// ── Tests ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn two_message_session_becomes_one_chunk() {
    let fx = fixture();
    let user_text = "u".repeat(200);
    let assistant_text = "a".repeat(200);
    let lines = [
        message_line("user", &user_text),
        message_line("system", &"s".repeat(200)),
        message_line("assistant", &assistant_text),
    ];
    write(
        &fx.config.sessions_dir.join("chat.jsonl"),
        &lines.join("\n"),
    );

    let sink = RecordingSink::default();
    let report = run_backfill(&fx.config.clone().mode(SourceMode::SessionsOnly), Some(&sink))
        .await
        .unwrap();

    assert_eq!(report.session_documents, 1);
    assert_eq!(report.session_chunks, 1);
    assert_eq!(report.inserted, 1);

    let records = sink.records.lock().unwrap();
    let record = &records[0];
    assert_eq!(record.source, "backfill:session:chat.jsonl");
    assert_eq!(
        record.raw_text,
        format!("[User]: {user_text}\n\n[Assistant]: {assistant_text}")
    );
    assert!(record.entities_json.is_empty());
    assert!(record.session_key.starts_with("backfill-"));
}

#[tokio::test]
async fn memory_paragraphs_split_at_chunk_limit() {
    let fx = fixture();
    let p1 = "a".repeat(2500);
    let p2 = "b".repeat(2500);
    let p3 = "c".repeat(2500);
    write(
        &fx.config.memory_dir.join("kb/big.md"),
        &format!("{p1}\n\n{p2}\n\n{p3}"),
    );

    let sink = RecordingSink::default();
    let report = run_backfill(&fx.config.clone().mode(SourceMode::MemoryOnly), Some(&sink))
        .await
        .unwrap();

    assert_eq!(report.memory_documents, 1);
    assert_eq!(report.memory_chunks, 2);

    let records = sink.records.lock().unwrap();
    assert_eq!(records[0].raw_text, format!("{p1}\n\n{p2}"));
    assert_eq!(records[1].raw_text, p3);
    assert_eq!(records[0].source, "backfill:memory:kb/big.md");
    assert_eq!(records[1].source, records[0].source);
}

#[tokio::test]
async fn noise_and_short_units_never_reach_the_store() {
    let fx = fixture();
    write(&fx.config.memory_dir.join("stub.md"), "tiny");
    let lines = [
        message_line("assistant", "NO_REPLY"),
        message_line("assistant", "HEARTBEAT_OK"),
        message_line("user", "short"),
        format!(
            r#"{{"message": {{"role": "assistant", "content": {}}}}}"#,
            serde_json::to_string(&format!(
                "{{\"toolCallId\": \"t-1\", \"payload\": \"{}\"}}",
                "p".repeat(200)
            ))
            .unwrap()
        ),
    ];
    write(&fx.config.sessions_dir.join("noisy.jsonl"), &lines.join("\n"));

    let sink = RecordingSink::default();
    let report = run_backfill(&fx.config, Some(&sink)).await.unwrap();

    assert_eq!(report.total_chunks(), 0);
    assert_eq!(report.inserted, 0);
    assert!(sink.records.lock().unwrap().is_empty());
}

#[tokio::test]
async fn insert_failure_does_not_abort_the_batch() {
    let fx = fixture();
    write(
        &fx.config.memory_dir.join("good.md"),
        &format!("good {}", "content ".repeat(20)),
    );
    write(
        &fx.config.memory_dir.join("poison.md"),
        &format!("POISON {}", "content ".repeat(20)),
    );

    let sink = RecordingSink {
        reject_containing: Some("POISON"),
        ..Default::default()
    };
    let report = run_backfill(&fx.config.clone().mode(SourceMode::MemoryOnly), Some(&sink))
        .await
        .unwrap();

    assert_eq!(report.memory_chunks, 2);
    assert_eq!(report.inserted, 1);
    let records = sink.records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].raw_text.starts_with("good"));
}

#[tokio::test]
async fn dry_run_collects_but_persists_nothing() {
    let fx = fixture();
    write(
        &fx.config.memory_dir.join("note.md"),
        &format!("note {}", "content ".repeat(20)),
    );

    let report = run_backfill(&fx.config, None).await.unwrap();

    assert!(report.dry_run);
    assert_eq!(report.memory_chunks, 1);
    assert_eq!(report.inserted, 0);
}

#[tokio::test]
async fn sqlite_store_round_trip() {
    let fx = fixture();
    write(
        &fx.config.memory_dir.join("kb/topic.md"),
        &format!("topic {}", "content ".repeat(30)),
    );
    write(
        &fx.config.sessions_dir.join("day.jsonl"),
        &message_line("user", &"q".repeat(120)),
    );

    let db_dir = TempDir::new().unwrap();
    let store = SqliteObservationStore::open(db_dir.path().join("obs.db"))
        .await
        .unwrap();
    let report = run_backfill(&fx.config, Some(&store)).await.unwrap();

    assert_eq!(report.memory_chunks, 1);
    assert_eq!(report.session_chunks, 1);
    assert_eq!(report.inserted, 2);
    assert_eq!(store.count_total().await.unwrap(), 2);
    assert_eq!(store.count_pending().await.unwrap(), 2);
}
