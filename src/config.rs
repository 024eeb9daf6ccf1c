//! Configuration types and defaults for anchor tracking and recovery
//!
//! Every threshold and window the resolver uses lives here. Defaults are the
//! values the editor has always shipped with.

use serde::{Deserialize, Serialize};

// =============================================================================
// Main Configuration
// =============================================================================

/// Anchor tracking configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    /// Characters of context captured on each side of an anchor. Default: 30
    pub context_window: usize,
    /// Characters of stored context used in the context-window pattern. Default: 15
    pub context_match_window: usize,
    /// Minimum (exclusive) similarity for context-window matches. Default: 0.6
    pub context_threshold: f64,
    /// Minimum (exclusive) similarity for content-only fuzzy matches. Default: 0.6
    pub fuzzy_threshold: f64,
    /// Minimum (exclusive) similarity for short content. Default: 0.8
    pub short_content_threshold: f64,
    /// Content shorter than this uses `short_content_threshold`. Default: 10
    pub short_content_len: usize,
    /// Window sizes span `len * (1 - ratio) ..= len * (1 + ratio)`. Default: 0.3
    pub fuzzy_window_ratio: f64,
    /// Suggested delay before trusting live text after an edit. Default: 500
    pub settle_delay_ms: u32,
    /// Suggested consistency sweep interval. Default: 1000
    pub sweep_interval_ms: u32,
    /// Maximum anchors recovered per pass. Default: 25
    pub max_anchors_per_pass: usize,
    /// Failed attempts before an anchor leaves the retry queue. Default: None (retry forever)
    pub max_recovery_attempts: Option<u32>,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            context_window: 30,
            context_match_window: 15,
            context_threshold: 0.6,
            fuzzy_threshold: 0.6,
            short_content_threshold: 0.8,
            short_content_len: 10,
            fuzzy_window_ratio: 0.3,
            settle_delay_ms: 500,
            sweep_interval_ms: 1000,
            max_anchors_per_pass: 25,
            max_recovery_attempts: None,
        }
    }
}

impl AnchorConfig {
    /// Fewer false positives: higher thresholds, tighter windows
    pub fn strict() -> Self {
        Self {
            context_threshold: 0.75,
            fuzzy_threshold: 0.75,
            short_content_threshold: 0.9,
            fuzzy_window_ratio: 0.2,
            max_recovery_attempts: Some(5),
            ..Self::default()
        }
    }

    /// Keep tags alive through heavier rewrites
    pub fn lenient() -> Self {
        Self {
            context_window: 40,
            context_match_window: 20,
            context_threshold: 0.5,
            fuzzy_threshold: 0.5,
            short_content_threshold: 0.7,
            fuzzy_window_ratio: 0.4,
            ..Self::default()
        }
    }

    /// Content-only threshold for content of `len` chars
    pub fn fuzzy_threshold_for(&self, len: usize) -> f64 {
        if len < self.short_content_len {
            self.short_content_threshold
        } else {
            self.fuzzy_threshold
        }
    }

    /// Strictly-greater acceptance test for content-only matches
    pub fn accepts_fuzzy(&self, len: usize, score: f64) -> bool {
        score > self.fuzzy_threshold_for(len)
    }

    /// Inclusive range of window sizes searched for content of `len` chars
    pub fn fuzzy_window_range(&self, len: usize) -> (usize, usize) {
        let ratio = self.fuzzy_window_ratio.clamp(0.0, 1.0);
        let min = ((len as f64) * (1.0 - ratio)).round() as usize;
        let max = ((len as f64) * (1.0 + ratio)).round() as usize;
        (min.max(1), max.max(1))
    }
}

// =============================================================================
// Tests
// =============================================================================
