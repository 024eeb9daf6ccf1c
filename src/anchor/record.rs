//! AnchorRecord: one application of a tag to a span of text

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::{DocumentView, Span};

/// Block id used when the editor reports no owning block
pub const ROOT_BLOCK: &str = "root";

// =============================================================================
// Status
// =============================================================================

/// Why an anchor can no longer be trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleReason {
    /// Span mapped cleanly but the text under it changed; span is current
    ContentMismatch,
    /// Span could not be mapped; span is the last known good one
    Unmapped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum AnchorStatus {
    Resolved,
    Stale(StaleReason),
}

impl Default for AnchorStatus {
    fn default() -> Self {
        AnchorStatus::Resolved
    }
}

// =============================================================================
// AnchorRecord
// =============================================================================

/// Tracked association between a tag and a span of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorRecord {
    /// Range id, unique per tag application
    pub id: String,
    pub tag_id: String,
    pub span: Span,
    pub block_id: String,
    /// Exact text covered at creation or last good match
    pub content: String,
    pub content_before: String,
    pub content_after: String,
    #[serde(default)]
    pub status: AnchorStatus,
    /// Last change-set version applied to this anchor
    #[serde(default)]
    pub doc_version: u64,
    #[serde(default)]
    pub recovery_attempts: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AnchorRecord {
    pub fn is_resolved(&self) -> bool {
        self.status == AnchorStatus::Resolved
    }

    pub fn is_stale(&self) -> bool {
        !self.is_resolved()
    }

    /// True unless the span is a leftover from before a failed mapping
    pub fn has_current_span(&self) -> bool {
        self.status != AnchorStatus::Stale(StaleReason::Unmapped)
    }

    /// Live text under the stored span still equals the stored content
    pub fn matches<D: DocumentView + ?Sized>(&self, doc: &D) -> bool {
        !self.span.is_empty()
            && self.span.end <= doc.len()
            && doc.text_between(self.span.start, self.span.end) == self.content
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// =============================================================================
// Context capture
// =============================================================================

/// Text around a span, bounded by a window on each side
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnchorContext {
    pub content: String,
    pub before: String,
    pub after: String,
}

impl AnchorContext {
    pub fn capture<D: DocumentView + ?Sized>(doc: &D, span: Span, window: usize) -> Self {
        let before_start = span.start.saturating_sub(window);
        let after_end = (span.end + window).min(doc.len());
        Self {
            content: doc.text_between(span.start, span.end),
            before: doc.text_between(before_start, span.start),
            after: doc.text_between(span.end, after_end),
        }
    }
}

/// Block owning `pos`, or [`ROOT_BLOCK`]
pub fn block_for<D: DocumentView + ?Sized>(doc: &D, pos: usize) -> String {
    doc.block_at(pos).unwrap_or_else(|| ROOT_BLOCK.to_string())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TextDocument;

    #[test]
    fn test_context_is_windowed() {
        let doc = TextDocument::new("0123456789abcdefghij");
        let ctx = AnchorContext::capture(&doc, Span::new(10, 12), 3);
        assert_eq!(ctx.content, "ab");
        assert_eq!(ctx.before, "789");
        assert_eq!(ctx.after, "cde");
    }

    #[test]
    fn test_context_clamped_at_edges() {
        let doc = TextDocument::new("hello world");
        let ctx = AnchorContext::capture(&doc, Span::new(0, 5), 30);
        assert_eq!(ctx.before, "");
        assert_eq!(ctx.after, " world");
    }

    #[test]
    fn test_block_for_falls_back_to_root() {
        let doc = TextDocument::new("plain");
        assert_eq!(block_for(&doc, 0), ROOT_BLOCK);
        let doc = TextDocument::with_blocks(&[("p1", "para")]);
        assert_eq!(block_for(&doc, 1), "p1");
    }

    #[test]
    fn test_status_serde_shape() {
        let json = serde_json::to_string(&AnchorStatus::Stale(StaleReason::Unmapped)).unwrap();
        assert_eq!(json, r#"{"state":"stale","reason":"unmapped"}"#);
        let json = serde_json::to_string(&AnchorStatus::Resolved).unwrap();
        assert_eq!(json, r#"{"state":"resolved"}"#);
    }
}
