//! Noise predicates — rules that reject a text unit outright.
//!
//! Each rule inspects the RAW extracted text, before any cleaning transform
//! runs, because several of them key on structure (leading `{`, context tags)
//! that cleaning would remove.

/// Marker key found in raw tool-call JSON payloads.
const TOOL_CALL_MARKER: &str = "\"toolCallId\"";

/// Opening tag of injected knowledge-graph context blocks.
pub(crate) const CONTEXT_TAG_OPEN: &str = "<knowledge-graph-context>";

/// How many leading characters are searched for [`CONTEXT_TAG_OPEN`].
const CONTEXT_TAG_WINDOW: usize = 100;

/// Sentinel replies used as control signals, never worth extracting from.
const CONTROL_SENTINELS: [&str; 2] = ["NO_REPLY", "HEARTBEAT_OK"];

/// A single noise-detection rule.
///
/// Rules are composed by [`TextPolicy`](super::TextPolicy); a unit is
/// discarded when ANY rule matches.
pub trait NoiseRule: Send + Sync {
    /// Identifier used in skip logging (e.g. `"min_length"`).
    fn id(&self) -> &'static str;

    /// Returns `true` when the text should be discarded.
    fn is_noise(&self, text: &str) -> bool;
}

/// Rejects units shorter than a minimum character count.
#[derive(Debug, Clone, Copy)]
pub struct MinLength {
    pub min: usize,
}

impl NoiseRule for MinLength {
    fn id(&self) -> &'static str {
        "min_length"
    }

    fn is_noise(&self, text: &str) -> bool {
        text.chars().count() < self.min
    }
}

/// Rejects raw tool-call JSON payloads.
///
/// Heuristic: the trimmed unit starts with `{` and mentions a tool-call
/// identifier key anywhere in the body.
#[derive(Debug, Clone, Copy)]
pub struct ToolCallPayload;

impl NoiseRule for ToolCallPayload {
    fn id(&self) -> &'static str {
        "tool_call_payload"
    }

    fn is_noise(&self, text: &str) -> bool {
        text.trim_start().starts_with('{') && text.contains(TOOL_CALL_MARKER)
    }
}

/// Rejects units that open with an injected knowledge-graph context block.
///
/// Only the first [`CONTEXT_TAG_WINDOW`] characters are searched: a tag that
/// far into the body means the unit carries real content before the injected
/// context, and the cleaning transform will strip the block instead.
#[derive(Debug, Clone, Copy)]
pub struct ContextTagPrefix;

impl NoiseRule for ContextTagPrefix {
    fn id(&self) -> &'static str {
        "context_tag_prefix"
    }

    fn is_noise(&self, text: &str) -> bool {
        let window_end = text
            .char_indices()
            .nth(CONTEXT_TAG_WINDOW)
            .map_or(text.len(), |(idx, _)| idx);
        text[..window_end].contains(CONTEXT_TAG_OPEN)
    }
}

/// Rejects units that are exactly a control sentinel.
#[derive(Debug, Clone, Copy)]
pub struct ControlSentinel;

impl NoiseRule for ControlSentinel {
    fn id(&self) -> &'static str {
        "control_sentinel"
    }

    fn is_noise(&self, text: &str) -> bool {
        CONTROL_SENTINELS.contains(&text.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_length_boundary() {
        let rule = MinLength { min: 80 };
        assert!(rule.is_noise(&"x".repeat(79)));
        assert!(!rule.is_noise(&"x".repeat(80)));
    }

    #[test]
    fn tool_call_payload_requires_both_markers() {
        let rule = ToolCallPayload;
        assert!(rule.is_noise(r#"{"toolCallId": "abc", "result": 1}"#));
        assert!(rule.is_noise("  {\"toolCallId\": \"abc\"}"));
        assert!(!rule.is_noise(r#"{"role": "user"}"#));
        assert!(!rule.is_noise(r#"mentions "toolCallId" in prose"#));
    }

    #[test]
    fn context_tag_only_within_window() {
        let rule = ContextTagPrefix;

        let mut near = "x".repeat(50);
        near.push_str(CONTEXT_TAG_OPEN);
        near.push_str(&"y".repeat(200));
        assert!(rule.is_noise(&near));

        let mut far = "x".repeat(150);
        far.push_str(CONTEXT_TAG_OPEN);
        far.push_str(&"y".repeat(200));
        assert!(!rule.is_noise(&far));
    }

    #[test]
    fn context_tag_window_counts_chars_not_bytes() {
        // 50 multi-byte chars (150 bytes) followed by the tag: still inside
        // the 100-char window.
        let mut text = "é".repeat(50);
        text.push_str(CONTEXT_TAG_OPEN);
        text.push_str(&"y".repeat(200));
        assert!(ContextTagPrefix.is_noise(&text));
    }

    #[test]
    fn sentinels_rejected_even_padded() {
        let rule = ControlSentinel;
        assert!(rule.is_noise("NO_REPLY"));
        assert!(rule.is_noise("  HEARTBEAT_OK\n"));
        assert!(!rule.is_noise("NO_REPLY but with context"));
    }
}
