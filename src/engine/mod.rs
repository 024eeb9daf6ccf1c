//! TagEngine: the host-facing tagging core
//!
//! Owns the active document's registry and anchor store, the persistence
//! bridge, and the retry queue of stale anchors. Every call is synchronous;
//! recovery that the host defers (to let the document settle) goes through a
//! [`RecoveryTicket`] so results for a document that is no longer active are
//! dropped instead of written into the new one.

pub mod events;
mod sweep;

pub use events::TagEvent;
pub use sweep::SweepReport;

use instant::Instant;
use serde::{Deserialize, Serialize};

use crate::anchor::{block_for, AnchorContext, AnchorRecord, AnchorStatus, AnchorStore, StaleReason};
use crate::config::AnchorConfig;
use crate::document::{DocumentEditor, DocumentView, MarkAttrs, Span, TextDocument};
use crate::error::TagError;
use crate::persistence::{DocumentTagState, MemoryStore, PersistenceBridge, TagStateStore};
use crate::recovery::{RecoveryMatch, RecoveryResolver};
use crate::registry::{TagDefinition, TagRegistry, TagScope};
use crate::remap::{remap, ChangeSet};
use crate::search::{self, SearchFilters, TagSearchResult};

// =============================================================================
// Result Types
// =============================================================================

/// A tag definition joined with one of its anchors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedAnchor {
    pub tag: TagDefinition,
    pub anchor: AnchorRecord,
}

/// How `load_state` obtained the document's state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoadOutcome {
    /// A saved snapshot was restored
    Restored,
    /// Nothing was saved; started from the default tags
    Fresh,
    /// The saved entry was unusable; started from the default tags
    FellBack { reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemapSummary {
    pub version: u64,
    pub updated: Vec<String>,
    pub invalidated: Vec<String>,
    pub skipped: usize,
}

/// Deferred recovery work, bound to the document it was issued for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryTicket {
    pub document_id: Option<String>,
    pub generation: u64,
    pub anchor_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecoveryReport {
    pub recovered: Vec<String>,
    pub failed: Vec<String>,
    /// Failed anchors that reached `max_recovery_attempts`
    pub abandoned: Vec<String>,
    /// The ticket was issued for another document or state generation
    pub discarded: bool,
    pub elapsed_us: u64,
}

// =============================================================================
// TagEngine
// =============================================================================

pub struct TagEngine<S: TagStateStore = MemoryStore> {
    config: AnchorConfig,
    resolver: RecoveryResolver,
    bridge: PersistenceBridge<S>,
    default_tags: Vec<TagDefinition>,

    // Active document state, swapped as a unit
    document_id: Option<String>,
    registry: TagRegistry,
    anchors: AnchorStore,
    pending: Vec<String>,

    /// Bumped whenever the active state is replaced or cleared
    generation: u64,
    /// Highest change version seen for the active document
    current_version: u64,
    events: Vec<TagEvent>,
}

impl TagEngine<MemoryStore> {
    pub fn new(config: AnchorConfig) -> Self {
        Self::with_store(config, MemoryStore::new())
    }
}

impl Default for TagEngine<MemoryStore> {
    fn default() -> Self {
        Self::new(AnchorConfig::default())
    }
}

impl<S: TagStateStore> TagEngine<S> {
    pub fn with_store(config: AnchorConfig, store: S) -> Self {
        Self {
            resolver: RecoveryResolver::new(config.clone()),
            config,
            bridge: PersistenceBridge::new(store),
            default_tags: Vec::new(),
            document_id: None,
            registry: TagRegistry::new(),
            anchors: AnchorStore::new(),
            pending: Vec::new(),
            generation: 0,
            current_version: 0,
            events: Vec::new(),
        }
    }

    /// Tags every fresh document state starts with
    pub fn with_default_tags(mut self, tags: Vec<TagDefinition>) -> Self {
        self.set_default_tags(tags);
        self
    }

    /// Replace the default tag set. Before any document is opened the
    /// detached registry picks it up; an open document keeps its own tags.
    pub fn set_default_tags(&mut self, tags: Vec<TagDefinition>) {
        self.default_tags = tags;
        if self.document_id.is_none() {
            self.registry = self.fresh_registry();
        }
    }

    pub fn config(&self) -> &AnchorConfig {
        &self.config
    }

    pub fn document_id(&self) -> Option<&str> {
        self.document_id.as_deref()
    }

    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    pub fn anchors(&self) -> &AnchorStore {
        &self.anchors
    }

    pub fn anchor(&self, anchor_id: &str) -> Option<&AnchorRecord> {
        self.anchors.get(anchor_id)
    }

    /// Stale anchors waiting for recovery, oldest first
    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn store(&self) -> &S {
        self.bridge.store()
    }

    pub fn drain_events(&mut self) -> Vec<TagEvent> {
        std::mem::take(&mut self.events)
    }

    // =========================================================================
    // Tag application
    // =========================================================================

    /// Apply an inline tag to `[start, end)`
    ///
    /// Leading and trailing spaces, tabs and newlines are trimmed from the
    /// range first; a whitespace-only selection is anchored as given.
    pub fn add_tag<D: DocumentEditor + ?Sized>(
        &mut self,
        def: TagDefinition,
        start: usize,
        end: usize,
        doc: &mut D,
    ) -> Result<AnchorRecord, TagError> {
        if start >= end {
            return Err(TagError::InvalidSpan { start, end });
        }
        if end > doc.len() {
            return Err(TagError::SpanOutOfBounds { end, len: doc.len() });
        }

        let span = trim_span(&*doc, Span::new(start, end));
        let tag = self
            .registry
            .add_or_get(TagDefinition { scope: TagScope::Inline, ..def })?
            .clone();

        let ctx = AnchorContext::capture(&*doc, span, self.config.context_window);
        let block_id = block_for(&*doc, span.start);
        let mut record = self
            .anchors
            .create(&tag.id, span, &ctx.content, &ctx.before, &ctx.after, &block_id)?;

        let version = self.current_version;
        self.anchors.with_record(&record.id, |r| r.doc_version = version)?;
        record.doc_version = version;

        doc.apply_mark(span, &mark_attrs(&tag, &record));
        self.events.push(TagEvent::TagApplied {
            anchor_id: record.id.clone(),
            tag_id: tag.id.clone(),
            span,
        });
        console_log!(
            "[TagEngine] Applied '{}' as {} at {}..{}",
            tag.name,
            record.id,
            span.start,
            span.end
        );
        Ok(record)
    }

    /// Remove one tag application. Returns false for unknown ids.
    pub fn remove_tag<D: DocumentEditor + ?Sized>(&mut self, anchor_id: &str, doc: &mut D) -> bool {
        let Some(record) = self.anchors.remove(anchor_id) else {
            return false;
        };
        self.pending.retain(|id| id != anchor_id);
        doc.remove_mark(anchor_id);
        self.events.push(TagEvent::TagRemoved {
            anchor_id: record.id,
            tag_id: record.tag_id,
        });
        true
    }

    pub fn add_document_tag(&mut self, def: TagDefinition) -> Result<TagDefinition, TagError> {
        let tag = self
            .registry
            .add_or_get(TagDefinition { scope: TagScope::Document, ..def })?
            .clone();
        self.notify_document_tags();
        Ok(tag)
    }

    /// Remove a document-scoped tag. Inline and unknown ids are left alone.
    pub fn remove_document_tag(&mut self, tag_id: &str) -> bool {
        let is_document = self
            .registry
            .by_id(tag_id)
            .map_or(false, |def| def.scope == TagScope::Document);
        if !is_document {
            return false;
        }
        self.registry.remove(tag_id);
        self.notify_document_tags();
        true
    }

    /// Remove a definition and leave its anchors in place as orphans
    pub fn remove_tag_definition(&mut self, tag_id: &str) -> Result<TagDefinition, TagError> {
        let def = self
            .registry
            .remove(tag_id)
            .ok_or_else(|| TagError::TagNotFound(tag_id.to_string()))?;

        let orphaned = self.anchors.ids_for_tag(tag_id).len();
        if orphaned > 0 {
            console_warn!("[TagEngine] Removed '{}' leaving {} orphaned anchors", def.name, orphaned);
        }
        if def.scope == TagScope::Document {
            self.notify_document_tags();
        }
        Ok(def)
    }

    /// Remove a definition together with every anchor that references it.
    /// Returns the removed anchor ids.
    pub fn remove_tag_definition_cascade<D: DocumentEditor + ?Sized>(
        &mut self,
        tag_id: &str,
        doc: &mut D,
    ) -> Result<Vec<String>, TagError> {
        self.remove_tag_definition(tag_id)?;
        let ids = self.anchors.ids_for_tag(tag_id);
        for id in &ids {
            self.remove_tag(id, doc);
        }
        Ok(ids)
    }

    fn notify_document_tags(&mut self) {
        let tag_ids = self
            .registry
            .list_document_scoped()
            .iter()
            .map(|def| def.id.clone())
            .collect();
        self.events.push(TagEvent::DocumentTagsUpdated { tag_ids });
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Resolved anchors covering `pos`, in insertion order
    pub fn tags_at_position(&self, pos: usize) -> Vec<TaggedAnchor> {
        self.join(
            self.anchors
                .list_all()
                .into_iter()
                .filter(|a| a.is_resolved() && a.span.contains(pos)),
        )
    }

    /// Every anchor owned by `block_id`, in insertion order
    pub fn tags_in_block(&self, block_id: &str) -> Vec<TaggedAnchor> {
        self.join(self.anchors.list_by_block(block_id).into_iter())
    }

    fn join<'a>(&self, anchors: impl Iterator<Item = &'a AnchorRecord>) -> Vec<TaggedAnchor> {
        anchors
            .filter_map(|anchor| {
                let tag = self.registry.by_id(&anchor.tag_id)?;
                Some(TaggedAnchor { tag: tag.clone(), anchor: anchor.clone() })
            })
            .collect()
    }

    pub fn search(&self, query: &str, filters: &SearchFilters) -> Vec<TagSearchResult> {
        search::search::<TextDocument>(query, filters, &self.registry, &self.anchors, None)
    }

    /// Search with previews read from the live document
    pub fn search_in<D: DocumentView + ?Sized>(
        &self,
        query: &str,
        filters: &SearchFilters,
        doc: &D,
    ) -> Vec<TagSearchResult> {
        search::search(query, filters, &self.registry, &self.anchors, Some(doc))
    }

    // =========================================================================
    // Remapping
    // =========================================================================

    /// Carry every anchor through `change`. `doc` is the post-change document.
    pub fn apply_change<D: DocumentView + ?Sized>(&mut self, change: &ChangeSet, doc: &D) -> RemapSummary {
        if change.version <= self.current_version {
            console_warn!(
                "[TagEngine] Change v{} is not newer than v{}; verifying anchors only",
                change.version,
                self.current_version
            );
        }
        let anchors: Vec<AnchorRecord> = self.anchors.list_all().into_iter().cloned().collect();
        let result = remap(anchors, change, doc, self.config.context_window);

        let mut summary = RemapSummary {
            version: change.version,
            skipped: result.skipped.len(),
            ..Default::default()
        };

        for record in result.updated {
            self.pending.retain(|id| *id != record.id);
            summary.updated.push(record.id.clone());
            self.write_back(record);
        }
        for record in result.invalidated {
            self.queue(&record.id);
            summary.invalidated.push(record.id.clone());
            self.write_back(record);
        }

        self.current_version = self.current_version.max(change.version);

        if !summary.invalidated.is_empty() {
            console_log!(
                "[TagEngine] v{}: {} anchors moved, {} need recovery",
                change.version,
                summary.updated.len(),
                summary.invalidated.len()
            );
            self.events.push(TagEvent::AnchorsInvalidated {
                anchor_ids: summary.invalidated.clone(),
            });
        }
        summary
    }

    fn write_back(&mut self, record: AnchorRecord) {
        if let Err(e) = self.anchors.replace(record) {
            console_warn!("[TagEngine] Remap write-back skipped: {}", e);
        }
    }

    fn queue(&mut self, anchor_id: &str) {
        if !self.pending.iter().any(|id| id == anchor_id) {
            self.pending.push(anchor_id.to_string());
        }
    }

    // =========================================================================
    // Recovery
    // =========================================================================

    /// Run the resolver for one anchor now
    ///
    /// On success the mark is re-applied at the found span. On failure the
    /// anchor stays stale, its mark is hidden, and it remains queued for retry
    /// until `max_recovery_attempts` is reached.
    pub fn recover_anchor<D: DocumentEditor + ?Sized>(
        &mut self,
        anchor_id: &str,
        doc: &mut D,
    ) -> Result<RecoveryMatch, TagError> {
        match self.resolver.resolve(&mut self.anchors, anchor_id, &*doc) {
            Ok(found) => {
                self.pending.retain(|id| id != anchor_id);
                if let Some(record) = self.anchors.get(anchor_id) {
                    if let Some(tag) = self.registry.by_id(&record.tag_id) {
                        doc.apply_mark(found.span, &mark_attrs(tag, record));
                    }
                }
                self.events.push(TagEvent::AnchorRecovered {
                    anchor_id: anchor_id.to_string(),
                    span: found.span,
                    strategy: found.strategy,
                });
                console_log!(
                    "[TagEngine] Recovered {} via {:?} (score {:.2})",
                    anchor_id,
                    found.strategy,
                    found.score
                );
                Ok(found)
            }
            Err(TagError::RecoveryFailed(_)) => {
                let mut attempts = 0;
                self.anchors.with_record(anchor_id, |record| {
                    record.recovery_attempts += 1;
                    attempts = record.recovery_attempts;
                    if record.is_resolved() {
                        record.status = AnchorStatus::Stale(StaleReason::ContentMismatch);
                    }
                })?;

                if doc.marked_ranges().iter().any(|m| m.range_id == anchor_id) {
                    doc.remove_mark(anchor_id);
                }

                let exhausted = self
                    .config
                    .max_recovery_attempts
                    .map_or(false, |max| attempts >= max);
                if exhausted {
                    self.pending.retain(|id| id != anchor_id);
                    console_warn!("[TagEngine] Giving up on {} after {} attempts", anchor_id, attempts);
                } else {
                    self.queue(anchor_id);
                }

                self.events.push(TagEvent::RecoveryFailed {
                    anchor_id: anchor_id.to_string(),
                    attempts,
                });
                Err(TagError::RecoveryFailed(anchor_id.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// Live span of an anchor, recovering it first if it is stale
    pub fn locate<D: DocumentEditor + ?Sized>(&mut self, anchor_id: &str, doc: &mut D) -> Result<Span, TagError> {
        let record = self
            .anchors
            .get(anchor_id)
            .ok_or_else(|| TagError::AnchorNotFound(anchor_id.to_string()))?;
        if record.is_resolved() && record.matches(&*doc) {
            return Ok(record.span);
        }
        self.recover_anchor(anchor_id, doc).map(|found| found.span)
    }

    /// Snapshot the next batch of pending anchors for deferred recovery
    pub fn begin_recovery(&self) -> Option<RecoveryTicket> {
        if self.pending.is_empty() {
            return None;
        }
        let batch = self.config.max_anchors_per_pass.max(1);
        Some(RecoveryTicket {
            document_id: self.document_id.clone(),
            generation: self.generation,
            anchor_ids: self.pending.iter().take(batch).cloned().collect(),
        })
    }

    /// Run a ticket's recovery, unless the active state changed since it was
    /// issued
    pub fn complete_recovery<D: DocumentEditor + ?Sized>(
        &mut self,
        ticket: RecoveryTicket,
        doc: &mut D,
    ) -> RecoveryReport {
        let started = Instant::now();

        if ticket.document_id != self.document_id || ticket.generation != self.generation {
            console_warn!(
                "[TagEngine] Discarding recovery for {:?} (generation {}, now {})",
                ticket.document_id,
                ticket.generation,
                self.generation
            );
            return RecoveryReport { discarded: true, ..Default::default() };
        }

        let mut report = RecoveryReport::default();
        for id in &ticket.anchor_ids {
            if !self.pending.contains(id) || !self.anchors.contains(id) {
                continue;
            }
            match self.recover_anchor(id, doc) {
                Ok(_) => report.recovered.push(id.clone()),
                Err(TagError::RecoveryFailed(_)) => {
                    report.failed.push(id.clone());
                    if !self.pending.contains(id) {
                        report.abandoned.push(id.clone());
                    }
                }
                Err(e) => console_warn!("[TagEngine] Recovery skipped {}: {}", id, e),
            }
        }

        report.elapsed_us = started.elapsed().as_micros() as u64;
        if !report.recovered.is_empty() || !report.failed.is_empty() {
            console_log!(
                "[TagEngine] Recovery pass: {} recovered, {} failed in {}us",
                report.recovered.len(),
                report.failed.len(),
                report.elapsed_us
            );
        }
        report
    }

    /// One bounded recovery pass over the pending queue
    pub fn recover_pending<D: DocumentEditor + ?Sized>(&mut self, doc: &mut D) -> RecoveryReport {
        match self.begin_recovery() {
            Some(ticket) => self.complete_recovery(ticket, doc),
            None => RecoveryReport::default(),
        }
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Current state as a persistable snapshot
    pub fn snapshot(&self) -> Result<DocumentTagState, TagError> {
        let document_id = self.document_id.clone().ok_or(TagError::NoActiveDocument)?;
        Ok(DocumentTagState {
            document_id,
            saved_at: chrono::Utc::now(),
            tag_count: self.anchors.len(),
            next_seq: self.anchors.next_seq(),
            tags: self.registry.to_vec(),
            anchors: self.anchors.list_all().into_iter().cloned().collect(),
            block_index: self.anchors.block_index().to_map(),
        })
    }

    pub fn save_state(&mut self) -> Result<(), TagError> {
        let state = self.snapshot()?;
        self.bridge.save(&state)?;
        console_log!("[TagEngine] Saved {} anchors for {}", state.tag_count, state.document_id);
        Ok(())
    }

    /// Re-verify anchors against the live document, then save
    pub fn save_state_with<D: DocumentView + ?Sized>(&mut self, doc: &D) -> Result<(), TagError> {
        self.document_id.as_ref().ok_or(TagError::NoActiveDocument)?;
        self.synchronize(doc);
        self.save_state()
    }

    /// Align stored anchors with what the document shows
    ///
    /// A rendered mark whose text still reads the anchor's content wins over
    /// the stored span. Returns the number of anchors whose record changed.
    pub fn synchronize<D: DocumentView + ?Sized>(&mut self, doc: &D) -> usize {
        let marks = doc.marked_ranges();
        let mut changed = 0;

        for id in self.anchors.ids() {
            let Some(record) = self.anchors.get(&id) else { continue };

            let from_mark = marks
                .iter()
                .filter(|m| m.range_id == id && m.span.end <= doc.len())
                .map(|m| m.span)
                .find(|span| doc.text_between(span.start, span.end) == record.content);
            let live = from_mark.or_else(|| (record.has_current_span() && record.matches(doc)).then_some(record.span));

            match live {
                Some(span) => {
                    let ctx = AnchorContext::capture(doc, span, self.config.context_window);
                    let unchanged = record.is_resolved()
                        && record.span == span
                        && record.content_before == ctx.before
                        && record.content_after == ctx.after;
                    if unchanged {
                        continue;
                    }
                    let block_id = block_for(doc, span.start);
                    let refreshed = self
                        .anchors
                        .update_span(&id, span, &ctx.content, &ctx.before, &ctx.after)
                        .and_then(|_| self.anchors.set_block(&id, &block_id))
                        .and_then(|_| self.anchors.set_status(&id, AnchorStatus::Resolved));
                    if refreshed.is_ok() {
                        self.pending.retain(|p| *p != id);
                        changed += 1;
                    }
                }
                None if record.is_resolved() => {
                    if self
                        .anchors
                        .set_status(&id, AnchorStatus::Stale(StaleReason::ContentMismatch))
                        .is_ok()
                    {
                        self.queue(&id);
                        changed += 1;
                    }
                }
                None => {}
            }
        }
        changed
    }

    /// Replace the active state with `document_id`'s saved state
    ///
    /// Malformed entries fall back to a fresh state; the reason is reported
    /// in the outcome rather than as an error.
    pub fn load_state(&mut self, document_id: &str) -> LoadOutcome {
        let (registry, anchors, outcome) = match self.bridge.load(document_id) {
            Ok(Some(state)) => {
                let (registry, anchors) = self.restore(state);
                (registry, anchors, LoadOutcome::Restored)
            }
            Ok(None) => (self.fresh_registry(), AnchorStore::new(), LoadOutcome::Fresh),
            Err(e) => {
                console_warn!("[TagEngine] {}; starting empty", e);
                (self.fresh_registry(), AnchorStore::new(), LoadOutcome::FellBack { reason: e.to_string() })
            }
        };

        self.document_id = Some(document_id.to_string());
        self.registry = registry;
        self.pending = anchors.stale_ids();
        self.anchors = anchors;
        self.current_version = 0;
        self.generation += 1;
        // Undrained events belong to the previous state
        self.events.clear();

        console_log!(
            "[TagEngine] Loaded {} ({} tags, {} anchors)",
            document_id,
            self.registry.len(),
            self.anchors.len()
        );
        outcome
    }

    /// Save the active document (if any) and switch to `document_id`
    pub fn open_document(&mut self, document_id: &str) -> Result<LoadOutcome, TagError> {
        if self.document_id.is_some() {
            self.save_state()?;
        }
        Ok(self.load_state(document_id))
    }

    fn restore(&self, state: DocumentTagState) -> (TagRegistry, AnchorStore) {
        let registry = TagRegistry::from_definitions(state.tags);
        let mut anchors = AnchorStore::new();
        for mut record in state.anchors {
            // Change versions restart with the editor session
            record.doc_version = 0;
            if let Err(e) = anchors.restore(record) {
                console_warn!("[TagEngine] Dropping unusable anchor from {}: {}", state.document_id, e);
            }
        }
        anchors.set_next_seq(state.next_seq);
        (registry, anchors)
    }

    fn fresh_registry(&self) -> TagRegistry {
        TagRegistry::from_definitions(self.default_tags.clone())
    }

    // =========================================================================
    // Bulk operations
    // =========================================================================

    /// Remove every anchor and its mark. Returns the number removed.
    pub fn clear_all_tags<D: DocumentEditor + ?Sized>(&mut self, doc: &mut D) -> usize {
        let ids = self.anchors.ids();
        for id in &ids {
            self.remove_tag(id, doc);
        }
        self.pending.clear();
        self.generation += 1;
        ids.len()
    }

    /// Clear all anchors and restore the default tag set
    pub fn reset_tagging_state<D: DocumentEditor + ?Sized>(&mut self, doc: &mut D) {
        self.clear_all_tags(doc);
        self.registry = self.fresh_registry();
        self.notify_document_tags();
        console_log!("[TagEngine] Tagging state reset");
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn is_trimmable(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n')
}

/// Shrink `span` past leading and trailing whitespace. Returns `span`
/// unchanged if nothing but whitespace is selected.
pub fn trim_span<D: DocumentView + ?Sized>(doc: &D, span: Span) -> Span {
    let chars: Vec<char> = doc.text_between(span.start, span.end).chars().collect();
    let lead = chars.iter().take_while(|c| is_trimmable(**c)).count();
    if lead == chars.len() {
        return span;
    }
    let trail = chars.iter().rev().take_while(|c| is_trimmable(**c)).count();
    Span::new(span.start + lead, span.start + chars.len() - trail)
}

/// Attributes for the editor mark of `record`
pub fn mark_attrs(tag: &TagDefinition, record: &AnchorRecord) -> MarkAttrs {
    MarkAttrs {
        range_id: record.id.clone(),
        tag_id: tag.id.clone(),
        block_id: record.block_id.clone(),
        color: tag.color.clone(),
        name: tag.name.clone(),
        description: tag.description.clone(),
        content: record.content.clone(),
        content_before: record.content_before.clone(),
        content_after: record.content_after.clone(),
    }
}

// =============================================================================
// Tests
// =============================================================================
