//! Noise filtering and text cleaning.
//!
//! ```text
//! raw unit ──► noise predicates ──reject──► (dropped)
//!                    │
//!                 retain
//!                    ▼
//!            cleaning transforms ──► normalized text
//! ```
//!
//! The policy is an ordered list of small rule objects rather than one
//! conditional: [`NoiseRule`]s veto a unit before any rewriting happens (they
//! key on raw structure), and [`CleanRule`]s then rewrite what survives.
//! Rules are independently testable; see [`noise`] and [`transforms`].

pub mod noise;
pub mod transforms;

use tracing::debug;

pub use noise::{ContextTagPrefix, ControlSentinel, MinLength, NoiseRule, ToolCallPayload};
pub use transforms::{
    CleanRule, CollapseBlankLines, ReplaceToolResults, StripContextBlocks, StripMetadataFences,
    TOOL_OUTPUT_PLACEHOLDER,
};

/// The composed noise/cleaning policy applied to every text unit.
pub struct TextPolicy {
    noise_rules: Vec<Box<dyn NoiseRule>>,
    clean_rules: Vec<Box<dyn CleanRule>>,
}

impl TextPolicy {
    /// The standard rule set: minimum length, tool-call payloads, leading
    /// context tags, and control sentinels for rejection; context-block,
    /// metadata-fence, tool-result, and blank-line rewrites for cleaning.
    #[must_use]
    pub fn standard(min_text_len: usize) -> Self {
        Self {
            noise_rules: vec![
                Box::new(MinLength { min: min_text_len }),
                Box::new(ToolCallPayload),
                Box::new(ContextTagPrefix),
                Box::new(ControlSentinel),
            ],
            clean_rules: vec![
                Box::new(StripContextBlocks),
                Box::new(StripMetadataFences),
                Box::new(ReplaceToolResults),
                Box::new(CollapseBlankLines),
            ],
        }
    }

    /// Build a policy from explicit rule lists.
    #[must_use]
    pub fn new(
        noise_rules: Vec<Box<dyn NoiseRule>>,
        clean_rules: Vec<Box<dyn CleanRule>>,
    ) -> Self {
        Self {
            noise_rules,
            clean_rules,
        }
    }

    /// Returns `true` when any noise rule rejects the RAW text.
    ///
    /// Must be called before [`clean`](Self::clean): several rules inspect
    /// structure that cleaning removes.
    #[must_use]
    pub fn is_noise(&self, raw: &str) -> bool {
        for rule in &self.noise_rules {
            if rule.is_noise(raw) {
                debug!(rule = rule.id(), len = raw.len(), "unit rejected as noise");
                return true;
            }
        }
        false
    }

    /// Applies every cleaning transform in order and trims the result.
    #[must_use]
    pub fn clean(&self, raw: &str) -> String {
        let mut text = raw.to_string();
        for rule in &self.clean_rules {
            text = rule.apply(&text).into_owned();
        }
        text.trim().to_string()
    }
}
