//! Span Remapper: carry anchors through a document change
//!
//! Every anchor's endpoints are mapped through the [`ChangeSet`]. A clean
//! mapping whose live text still equals the stored content keeps the anchor
//! resolved and refreshes its context. A clean mapping over different text
//! moves the span but flags the anchor stale. A failed mapping leaves the
//! span and content untouched as the seed for recovery.
//!
//! A change whose version the anchor has already seen is not mapped again,
//! but a resolved anchor is still checked against the live text so a replayed
//! or mis-versioned change can never leave it resolved over other text.

pub mod change;

pub use change::*;

use serde::{Deserialize, Serialize};

use crate::anchor::{AnchorContext, AnchorRecord, AnchorStatus, StaleReason};
use crate::document::DocumentView;

/// Output of [`remap`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemapResult {
    /// Anchors that are resolved after the change
    pub updated: Vec<AnchorRecord>,
    /// Anchors that need recovery
    pub invalidated: Vec<AnchorRecord>,
    /// Anchors that had already seen this change version and still match
    pub skipped: Vec<AnchorRecord>,
}

impl RemapResult {
    pub fn len(&self) -> usize {
        self.updated.len() + self.invalidated.len() + self.skipped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Map every anchor through `change`, reading live text from `doc`
pub fn remap<D: DocumentView + ?Sized>(
    anchors: Vec<AnchorRecord>,
    change: &ChangeSet,
    doc: &D,
    context_window: usize,
) -> RemapResult {
    let mut result = RemapResult::default();

    for mut anchor in anchors {
        if anchor.doc_version >= change.version {
            if anchor.is_resolved() && !anchor.matches(doc) {
                anchor.status = AnchorStatus::Stale(StaleReason::ContentMismatch);
                anchor.touch();
                result.invalidated.push(anchor);
            } else {
                result.skipped.push(anchor);
            }
            continue;
        }
        anchor.doc_version = change.version;

        // The stored span predates this change's coordinates
        if !anchor.has_current_span() {
            result.invalidated.push(anchor);
            continue;
        }

        let mapped = change.map_span(anchor.span).filter(|span| span.end <= doc.len());
        let Some(span) = mapped else {
            anchor.status = AnchorStatus::Stale(StaleReason::Unmapped);
            anchor.touch();
            result.invalidated.push(anchor);
            continue;
        };

        if span != anchor.span {
            anchor.span = span;
            anchor.touch();
        }
        if let Some(block_id) = doc.block_at(span.start) {
            anchor.block_id = block_id;
        }

        let ctx = AnchorContext::capture(doc, span, context_window);
        if ctx.content == anchor.content {
            anchor.content_before = ctx.before;
            anchor.content_after = ctx.after;
            anchor.status = AnchorStatus::Resolved;
            result.updated.push(anchor);
        } else {
            anchor.status = AnchorStatus::Stale(StaleReason::ContentMismatch);
            result.invalidated.push(anchor);
        }
    }

    result
}

// =============================================================================
// Tests
// =============================================================================
