//! Consistency sweep: make rendered marks agree with the anchor store
//!
//! The host calls [`TagEngine::sweep`] on a timer (`sweep_interval_ms`). A
//! resolved anchor whose text changed is flagged stale and queued. A resolved
//! anchor with no matching mark gets its mark back. Stale anchors and anchors
//! whose tag definition was removed lose their mark. Marks with no anchor are
//! removed. A bounded recovery pass runs last.
//! Running it twice on an unchanged document changes nothing the second time.

use serde::{Deserialize, Serialize};

use super::{mark_attrs, RecoveryReport, TagEngine, TagEvent};
use crate::anchor::{AnchorStatus, StaleReason};
use crate::document::DocumentEditor;
use crate::persistence::TagStateStore;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Nothing to check; no anchors exist
    pub skipped: bool,
    /// Resolved anchors at the start of the sweep
    pub expected: usize,
    /// Resolved anchors whose mark was already in place
    pub visible: usize,
    pub reapplied: Vec<String>,
    pub invalidated: Vec<String>,
    /// Stale or orphaned anchors whose mark was taken down
    pub hidden: Vec<String>,
    pub removed_orphans: Vec<String>,
    pub recovery: RecoveryReport,
}

impl SweepReport {
    pub fn changed_anything(&self) -> bool {
        !self.reapplied.is_empty()
            || !self.invalidated.is_empty()
            || !self.hidden.is_empty()
            || !self.removed_orphans.is_empty()
            || !self.recovery.recovered.is_empty()
    }
}

impl<S: TagStateStore> TagEngine<S> {
    pub fn sweep<D: DocumentEditor + ?Sized>(&mut self, doc: &mut D) -> SweepReport {
        if self.anchors.is_empty() {
            return SweepReport { skipped: true, ..Default::default() };
        }

        let marks = doc.marked_ranges();
        let mut report = SweepReport::default();

        for id in self.anchors.ids() {
            let Some(record) = self.anchors.get(&id) else { continue };
            let mark = marks.iter().find(|m| m.range_id == id);

            let orphaned = self.registry.by_id(&record.tag_id).is_none();
            if orphaned || !record.is_resolved() {
                if mark.is_some() {
                    doc.remove_mark(&id);
                    report.hidden.push(id);
                }
                continue;
            }

            report.expected += 1;
            if !record.matches(&*doc) {
                if mark.is_some() {
                    doc.remove_mark(&id);
                }
                if self
                    .anchors
                    .set_status(&id, AnchorStatus::Stale(StaleReason::ContentMismatch))
                    .is_ok()
                {
                    self.queue(&id);
                    report.invalidated.push(id);
                }
            } else if mark.map_or(false, |m| m.span == record.span) {
                report.visible += 1;
            } else if let Some(tag) = self.registry.by_id(&record.tag_id) {
                doc.apply_mark(record.span, &mark_attrs(tag, record));
                report.reapplied.push(id);
            }
        }

        for mark in &marks {
            if !self.anchors.contains(&mark.range_id) && !report.removed_orphans.contains(&mark.range_id) {
                doc.remove_mark(&mark.range_id);
                report.removed_orphans.push(mark.range_id.clone());
            }
        }

        if !report.invalidated.is_empty() {
            self.events.push(TagEvent::AnchorsInvalidated {
                anchor_ids: report.invalidated.clone(),
            });
        }

        report.recovery = self.recover_pending(doc);

        if report.changed_anything() {
            console_log!(
                "[TagEngine] Sweep: {}/{} visible, {} reapplied, {} invalidated, {} orphans removed",
                report.visible,
                report.expected,
                report.reapplied.len(),
                report.invalidated.len(),
                report.removed_orphans.len()
            );
        }
        report
    }
}

// =============================================================================
// Tests
// =============================================================================
