//! Recovery Resolver: relocate stale anchors
//!
//! Strategies run in order and short-circuit on the first hit:
//! 0. in place (the anchor's current span still reads its content)
//! 1. exact match inside the owning block
//! 2. exact match anywhere in the document
//! 3. context-window fuzzy match
//! 4. content-only fuzzy match
//!
//! Exact strategies take the first occurrence in document order.

pub mod strategies;

pub use strategies::Candidate;

use serde::{Deserialize, Serialize};

use crate::anchor::{block_for, AnchorContext, AnchorRecord, AnchorStatus, AnchorStore, ROOT_BLOCK};
use crate::config::AnchorConfig;
use crate::document::{DocumentView, Span};
use crate::error::TagError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryStrategy {
    InPlace,
    BlockExact,
    DocumentExact,
    ContextFuzzy,
    ContentFuzzy,
}

/// Where a stale anchor was found, and how
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecoveryMatch {
    pub span: Span,
    pub strategy: RecoveryStrategy,
    pub score: f64,
}

/// Runs the strategy chain with one configuration
#[derive(Debug, Clone, Default)]
pub struct RecoveryResolver {
    config: AnchorConfig,
}

impl RecoveryResolver {
    pub fn new(config: AnchorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnchorConfig {
        &self.config
    }

    /// Locate `anchor` in `doc` without touching any store
    pub fn recover<D: DocumentView + ?Sized>(&self, anchor: &AnchorRecord, doc: &D) -> Option<RecoveryMatch> {
        if anchor.content.is_empty() {
            return None;
        }

        if anchor.has_current_span() && anchor.matches(doc) {
            return Some(RecoveryMatch { span: anchor.span, strategy: RecoveryStrategy::InPlace, score: 1.0 });
        }

        if anchor.block_id != ROOT_BLOCK {
            if let Some(span) = strategies::block_exact(doc, &anchor.block_id, &anchor.content) {
                return Some(RecoveryMatch { span, strategy: RecoveryStrategy::BlockExact, score: 1.0 });
            }
            console_log!("[RecoveryResolver] {} not in block {}, widening", anchor.id, anchor.block_id);
        }

        if let Some(span) = strategies::document_exact(doc, &anchor.content) {
            return Some(RecoveryMatch { span, strategy: RecoveryStrategy::DocumentExact, score: 1.0 });
        }

        if let Some(found) = strategies::context_fuzzy(
            doc,
            &anchor.content,
            &anchor.content_before,
            &anchor.content_after,
            &self.config,
        ) {
            return Some(RecoveryMatch {
                span: found.span,
                strategy: RecoveryStrategy::ContextFuzzy,
                score: found.score,
            });
        }

        strategies::content_fuzzy(doc, &anchor.content, &self.config).map(|found| RecoveryMatch {
            span: found.span,
            strategy: RecoveryStrategy::ContentFuzzy,
            score: found.score,
        })
    }

    /// Recover the stored anchor `id` and write the new location back
    ///
    /// On success the anchor is resolved with refreshed span, content,
    /// context and block. On failure the record is left as it was.
    pub fn resolve<D: DocumentView + ?Sized>(
        &self,
        store: &mut AnchorStore,
        id: &str,
        doc: &D,
    ) -> Result<RecoveryMatch, TagError> {
        let anchor = store.get(id).ok_or_else(|| TagError::AnchorNotFound(id.to_string()))?;
        let found = self
            .recover(anchor, doc)
            .ok_or_else(|| TagError::RecoveryFailed(id.to_string()))?;

        let ctx = AnchorContext::capture(doc, found.span, self.config.context_window);
        let block_id = block_for(doc, found.span.start);

        store.update_span(id, found.span, &ctx.content, &ctx.before, &ctx.after)?;
        store.set_block(id, &block_id)?;
        store.with_record(id, |record| {
            record.status = AnchorStatus::Resolved;
            record.recovery_attempts = 0;
        })?;

        Ok(found)
    }
}

// =============================================================================
// Tests
// =============================================================================
