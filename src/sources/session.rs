//! Reading of newline-delimited JSON session transcripts.
//!
//! Each `*.jsonl` file becomes at most one [`SourceDocument`]: the retained,
//! cleaned messages of the file are concatenated in file order, each prefixed
//! with a role label and joined by a blank line. Chunk boundaries may
//! therefore span multiple original messages; this granularity is deliberate
//! (per-message chunking would starve the extractor of conversational
//! context).

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::fs;
use tracing::{debug, warn};

use crate::cleaning::TextPolicy;
use crate::sources::{Provenance, SourceDocument};

// ── Wire shapes ────────────────────────────────────────────────────────

/// One line of a session log. The message object is either nested under a
/// `message` key or is the top-level object itself.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SessionRecord {
    Wrapped { message: RawMessage },
    Flat(RawMessage),
}

impl SessionRecord {
    fn into_message(self) -> RawMessage {
        match self {
            SessionRecord::Wrapped { message } => message,
            SessionRecord::Flat(message) => message,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(default)]
    role: String,
    #[serde(default)]
    content: MessageContent,
}

/// Message content arrives in two shapes; both are resolved to plain text
/// here, once, so the rest of the pipeline never branches on shape.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
    Other(serde_json::Value),
}

impl Default for MessageContent {
    fn default() -> Self {
        MessageContent::Text(String::new())
    }
}

impl MessageContent {
    /// Plain text of this content: the string itself, or the `text` parts
    /// joined by newline. Unknown shapes contribute nothing.
    fn into_plain_text(self) -> String {
        match self {
            MessageContent::Text(text) => text,
            MessageContent::Parts(parts) => parts
                .into_iter()
                .filter(|part| part.kind == "text")
                .map(|part| part.text)
                .collect::<Vec<_>>()
                .join("\n"),
            MessageContent::Other(_) => String::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: String,
}

// ── Discovery ──────────────────────────────────────────────────────────

/// Enumerate `*.jsonl` files in `dir`, newest first by modification time,
/// optionally dropping files older than `recent_days`.
#[must_use]
pub fn discover_session_files(dir: &Path, recent_days: Option<u32>) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(dir = %dir.display(), %err, "cannot read sessions directory");
            return Vec::new();
        }
    };

    let mut files: Vec<(PathBuf, SystemTime)> = entries
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("jsonl") {
                return None;
            }
            let modified = entry.metadata().ok()?.modified().ok()?;
            Some((path, modified))
        })
        .collect();

    files.sort_by(|a, b| b.1.cmp(&a.1));

    if let Some(days) = recent_days {
        let cutoff = Utc::now() - Duration::days(i64::from(days));
        files.retain(|(_, modified)| DateTime::<Utc>::from(*modified) >= cutoff);
    }

    files.into_iter().map(|(path, _)| path).collect()
}

// ── Per-file processing ────────────────────────────────────────────────

/// Parse one session file into an aggregated document.
///
/// Malformed lines, non-conversational roles, and noisy messages are skipped
/// individually; a file with nothing left yields `None`. Read failures are
/// logged and also yield `None` — a bad file never aborts the scan.
pub async fn read_session_file(
    path: &Path,
    min_text_len: usize,
    policy: &TextPolicy,
) -> Option<SourceDocument> {
    let raw = match fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(err) => {
            warn!(path = %path.display(), %err, "skipping unreadable session file");
            return None;
        }
    };

    let mut messages: Vec<String> = Vec::new();
    for line in raw.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let record: SessionRecord = match serde_json::from_str(line) {
            Ok(record) => record,
            Err(err) => {
                debug!(path = %path.display(), %err, "skipping malformed session line");
                continue;
            }
        };
        let message = record.into_message();
        let label = match message.role.as_str() {
            "user" => "User",
            "assistant" => "Assistant",
            _ => continue,
        };

        let text = message.content.into_plain_text();
        if policy.is_noise(&text) {
            continue;
        }
        let cleaned = policy.clean(&text);
        if cleaned.chars().count() >= min_text_len {
            messages.push(format!("[{label}]: {cleaned}"));
        }
    }

    if messages.is_empty() {
        return None;
    }

    let basename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Some(SourceDocument {
        text: messages.join("\n\n"),
        provenance: Provenance::Session { file: basename },
    })
}

/// Scan the sessions directory into documents, newest file first.
pub async fn scan_session_files(
    dir: &Path,
    recent_days: Option<u32>,
    min_text_len: usize,
    policy: &TextPolicy,
) -> Vec<SourceDocument> {
    let mut documents = Vec::new();
    for path in discover_session_files(dir, recent_days) {
        if let Some(document) = read_session_file(&path, min_text_len, policy).await {
            debug!(
                provenance = %document.provenance,
                chars = document.text.len(),
                "aggregated session file"
            );
            documents.push(document);
        }
    }
    documents
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration as StdDuration;
    use tempfile::tempdir;

    fn long_text(label: &str) -> String {
        format!("{label}{}", " substance".repeat(20))
    }

    fn policy() -> TextPolicy {
        TextPolicy::standard(80)
    }

    #[tokio::test]
    async fn aggregates_user_and_assistant_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("2024-01-01.jsonl");
        let user = long_text("question about lifetimes.");
        let assistant = long_text("borrow checker answer.");
        let lines = [
            format!(r#"{{"message": {{"role": "user", "content": {}}}}}"#,
                serde_json::to_string(&user).unwrap()),
            format!(r#"{{"role": "system", "content": {}}}"#,
                serde_json::to_string(&long_text("system prompt.")).unwrap()),
            "not json at all".to_string(),
            format!(r#"{{"role": "assistant", "content": [{{"type": "text", "text": {}}}, {{"type": "tool_use", "id": "t1"}}]}}"#,
                serde_json::to_string(&assistant).unwrap()),
        ];
        std::fs::write(&path, lines.join("\n")).unwrap();

        let doc = read_session_file(&path, 80, &policy()).await.unwrap();
        assert_eq!(doc.provenance.to_string(), "session:2024-01-01.jsonl");
        assert_eq!(
            doc.text,
            format!("[User]: {user}\n\n[Assistant]: {assistant}")
        );
    }

    #[tokio::test]
    async fn noisy_messages_are_dropped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("s.jsonl");
        let keep = long_text("a real reply.");
        let lines = [
            r#"{"role": "assistant", "content": "NO_REPLY"}"#.to_string(),
            r#"{"role": "user", "content": "ok"}"#.to_string(),
            format!(r#"{{"role": "assistant", "content": {}}}"#,
                serde_json::to_string(&keep).unwrap()),
        ];
        std::fs::write(&path, lines.join("\n")).unwrap();

        let doc = read_session_file(&path, 80, &policy()).await.unwrap();
        assert_eq!(doc.text, format!("[Assistant]: {keep}"));
    }

    #[tokio::test]
    async fn file_with_no_survivors_yields_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("quiet.jsonl");
        std::fs::write(&path, r#"{"role": "user", "content": "hi"}"#).unwrap();

        assert!(read_session_file(&path, 80, &policy()).await.is_none());
    }

    #[test]
    fn discovery_sorts_newest_first_and_applies_cutoff() {
        let dir = tempdir().unwrap();
        let old = dir.path().join("old.jsonl");
        let new = dir.path().join("new.jsonl");
        std::fs::write(&old, "{}").unwrap();
        std::fs::write(&new, "{}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let ninety_days_ago = SystemTime::now() - StdDuration::from_secs(90 * 24 * 3600);
        File::options()
            .write(true)
            .open(&old)
            .unwrap()
            .set_modified(ninety_days_ago)
            .unwrap();

        let all = discover_session_files(dir.path(), None);
        assert_eq!(all, vec![new.clone(), old.clone()]);

        let recent = discover_session_files(dir.path(), Some(7));
        assert_eq!(recent, vec![new]);
    }
}
