//! Discovery and reading of memory (knowledge-base) markdown files.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::cleaning::TextPolicy;
use crate::sources::{Provenance, SourceDocument};

/// Subdirectories of the memory root that are scanned recursively.
/// The root itself contributes top-level files only.
const RECURSIVE_SUBDIRS: [&str; 2] = ["kb", "archive"];

/// Enumerate markdown files under `root`: top-level `*.md` plus everything
/// under the [`RECURSIVE_SUBDIRS`].
///
/// Files reachable through more than one pattern are returned once,
/// deduplicated by resolved path.
#[must_use]
pub fn discover_memory_files(root: &Path) -> Vec<PathBuf> {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut files = Vec::new();

    let top_level = WalkDir::new(root).min_depth(1).max_depth(1).follow_links(true);
    let nested = RECURSIVE_SUBDIRS
        .iter()
        .map(|sub| WalkDir::new(root.join(sub)).min_depth(1).follow_links(true));

    for walker in std::iter::once(top_level).chain(nested) {
        for entry in walker.sort_by_file_name().into_iter().filter_map(Result::ok) {
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|ext| ext.to_str()) != Some("md")
            {
                continue;
            }
            let resolved = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
            if seen.insert(resolved) {
                files.push(path.to_path_buf());
            }
        }
    }

    files
}

/// Read, filter, and clean every discovered memory file into documents.
///
/// Memory files skip the noise predicates (they are curated content, not
/// conversation traffic) but still receive the cleaning transforms. Files
/// shorter than `min_text_len` after trimming are skipped, as are files that
/// cannot be read; neither aborts the scan.
pub async fn scan_memory_files(
    root: &Path,
    min_text_len: usize,
    policy: &TextPolicy,
) -> Vec<SourceDocument> {
    let mut documents = Vec::new();

    for path in discover_memory_files(root) {
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(path = %path.display(), %err, "skipping unreadable memory file");
                continue;
            }
        };
        if raw.trim().chars().count() < min_text_len {
            debug!(path = %path.display(), "skipping short memory file");
            continue;
        }

        let rel_path = path
            .strip_prefix(root)
            .unwrap_or(&path)
            .to_string_lossy()
            .into_owned();
        documents.push(SourceDocument {
            text: policy.clean(&raw),
            provenance: Provenance::Memory { path: rel_path },
        });
    }

    documents
}
