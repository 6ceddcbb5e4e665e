//! Cleaning transforms — rules that rewrite retained text.
//!
//! Transforms run in declaration order on every retained unit (and on whole
//! memory files, which bypass the noise predicates). The sequence as a whole
//! is idempotent: cleaning already-clean text is a no-op.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Placeholder substituted for tool/function result bodies.
pub const TOOL_OUTPUT_PLACEHOLDER: &str = "[tool output]";

/// A single rewrite rule applied to retained text.
pub trait CleanRule: Send + Sync {
    /// Identifier used in logging and tests.
    fn id(&self) -> &'static str;

    /// Rewrites the text, borrowing when nothing matched.
    fn apply<'t>(&self, text: &'t str) -> Cow<'t, str>;
}

/// Removes `<knowledge-graph-context>…</knowledge-graph-context>` blocks,
/// contents included. Non-greedy and multi-line.
#[derive(Debug, Clone, Copy)]
pub struct StripContextBlocks;

impl CleanRule for StripContextBlocks {
    fn id(&self) -> &'static str {
        "strip_context_blocks"
    }

    fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        static RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"(?s)<knowledge-graph-context>.*?</knowledge-graph-context>").unwrap()
        });
        RE.replace_all(text, "")
    }
}

/// Removes fenced JSON blocks that look like conversation-metadata
/// envelopes (their object carries a `"message_id"` key).
#[derive(Debug, Clone, Copy)]
pub struct StripMetadataFences;

impl CleanRule for StripMetadataFences {
    fn id(&self) -> &'static str {
        "strip_metadata_fences"
    }

    fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        static RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r#"```json\n\{[^}]*"message_id"[^}]*\}\n```"#).unwrap()
        });
        RE.replace_all(text, "")
    }
}

/// Replaces `<function_results>…</function_results>` bodies with
/// [`TOOL_OUTPUT_PLACEHOLDER`].
///
/// Replacement, not deletion: the extractor still sees that a tool call
/// happened at that point in the conversation.
#[derive(Debug, Clone, Copy)]
pub struct ReplaceToolResults;

impl CleanRule for ReplaceToolResults {
    fn id(&self) -> &'static str {
        "replace_tool_results"
    }

    fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        static RE: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"(?s)<function_results>.*?</function_results>").unwrap());
        RE.replace_all(text, TOOL_OUTPUT_PLACEHOLDER)
    }
}

/// Collapses runs of three or more newlines into exactly one blank line.
///
/// Runs last so gaps opened by the removal rules above are closed too.
#[derive(Debug, Clone, Copy)]
pub struct CollapseBlankLines;

impl CleanRule for CollapseBlankLines {
    fn id(&self) -> &'static str {
        "collapse_blank_lines"
    }

    fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        static RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());
        RE.replace_all(text, "\n\n")
    }
}
