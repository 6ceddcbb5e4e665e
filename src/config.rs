//! Configuration for a backfill run.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default chunk size in characters (~1500 tokens).
pub const DEFAULT_CHUNK_SIZE: usize = 6000;

/// Default minimum retained-text length in characters.
pub const DEFAULT_MIN_TEXT_LEN: usize = 80;

/// Which source families a run should process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceMode {
    /// Memory files only.
    MemoryOnly,
    /// Session logs only.
    SessionsOnly,
    /// Memory files first, then session logs.
    #[default]
    All,
}

impl SourceMode {
    /// Whether memory files are in scope for this mode.
    #[must_use]
    pub fn includes_memory(self) -> bool {
        matches!(self, SourceMode::MemoryOnly | SourceMode::All)
    }

    /// Whether session logs are in scope for this mode.
    #[must_use]
    pub fn includes_sessions(self) -> bool {
        matches!(self, SourceMode::SessionsOnly | SourceMode::All)
    }
}

/// Tunable values consumed by the pipeline.
///
/// Uses a builder pattern — all setters are `#[must_use]`.
///
/// ```rust
/// use memsift::config::BackfillConfig;
///
/// let config = BackfillConfig::new().chunk_size(4000).recent_days(Some(7));
/// assert_eq!(config.chunk_size, 4000);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BackfillConfig {
    /// Maximum chunk size in characters. A single paragraph longer than this
    /// is still emitted whole (see [`crate::chunking::ParagraphChunker`]).
    pub chunk_size: usize,
    /// Minimum length for retained text; shorter units are dropped as noise.
    pub min_text_len: usize,
    /// Only process session files modified within the last N days.
    /// `None` processes everything.
    pub recent_days: Option<u32>,
    /// Which source families to process.
    pub mode: SourceMode,
    /// Root of the memory-file tree.
    pub memory_dir: PathBuf,
    /// Directory containing `*.jsonl` session logs.
    pub sessions_dir: PathBuf,
}

impl Default for BackfillConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            min_text_len: DEFAULT_MIN_TEXT_LEN,
            recent_days: None,
            mode: SourceMode::default(),
            memory_dir: PathBuf::new(),
            sessions_dir: PathBuf::new(),
        }
    }
}

impl BackfillConfig {
    /// Create a config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum chunk size in characters.
    #[must_use]
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Set the minimum retained-text length.
    #[must_use]
    pub fn min_text_len(mut self, len: usize) -> Self {
        self.min_text_len = len;
        self
    }

    /// Restrict session processing to files modified in the last N days.
    #[must_use]
    pub fn recent_days(mut self, days: Option<u32>) -> Self {
        self.recent_days = days;
        self
    }

    /// Set the processing mode.
    #[must_use]
    pub fn mode(mut self, mode: SourceMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the memory-file root directory.
    #[must_use]
    pub fn memory_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.memory_dir = dir.into();
        self
    }

    /// Set the session-log directory.
    #[must_use]
    pub fn sessions_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.sessions_dir = dir.into();
        self
    }
}
