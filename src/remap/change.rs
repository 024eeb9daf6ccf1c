//! Change descriptors: ordered edits that move positions
//!
//! A [`ChangeSet`] is what the editor emits for one document transaction.
//! Steps apply in order; each step's coordinates refer to the document as it
//! stands after the previous steps. Mapping follows the replace-step rules of
//! the host editor: positions before a step are untouched, positions after it
//! shift by the size difference, and positions strictly inside a replaced
//! range are reported as deleted.

use serde::{Deserialize, Serialize};

use crate::document::Span;

// =============================================================================
// Types
// =============================================================================

/// Which side a position sticks to when text is inserted exactly at it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assoc {
    /// Stay before inserted text
    Left,
    /// Move after inserted text
    Right,
}

/// Result of mapping one position through a change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapResult {
    pub pos: usize,
    /// The original position was inside a deleted range
    pub deleted: bool,
}

/// A single position-affecting edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditStep {
    Insert { at: usize, text: String },
    Delete { start: usize, end: usize },
    Replace { start: usize, end: usize, text: String },
}

impl EditStep {
    pub fn insert(at: usize, text: &str) -> Self {
        EditStep::Insert { at, text: text.to_string() }
    }

    pub fn delete(start: usize, end: usize) -> Self {
        EditStep::Delete { start: start.min(end), end: start.max(end) }
    }

    pub fn replace(start: usize, end: usize, text: &str) -> Self {
        EditStep::Replace { start: start.min(end), end: start.max(end), text: text.to_string() }
    }

    /// Start of the replaced range
    pub fn from(&self) -> usize {
        match self {
            EditStep::Insert { at, .. } => *at,
            EditStep::Delete { start, .. } | EditStep::Replace { start, .. } => *start,
        }
    }

    /// End of the replaced range
    pub fn to(&self) -> usize {
        match self {
            EditStep::Insert { at, .. } => *at,
            EditStep::Delete { start, end } | EditStep::Replace { start, end, .. } => {
                (*end).max(*start)
            }
        }
    }

    pub fn inserted_text(&self) -> &str {
        match self {
            EditStep::Insert { text, .. } | EditStep::Replace { text, .. } => text,
            EditStep::Delete { .. } => "",
        }
    }

    /// Length of inserted text in chars
    pub fn inserted_len(&self) -> usize {
        self.inserted_text().chars().count()
    }

    /// Map a position through this step
    pub fn map(&self, pos: usize, assoc: Assoc) -> MapResult {
        let from = self.from();
        let to = self.to();
        let old_len = to - from;
        let new_len = self.inserted_len();

        if pos < from {
            return MapResult { pos, deleted: false };
        }
        if pos > to {
            return MapResult { pos: pos - old_len + new_len, deleted: false };
        }

        // from <= pos <= to
        if old_len == 0 {
            let pos = match assoc {
                Assoc::Left => from,
                Assoc::Right => from + new_len,
            };
            return MapResult { pos, deleted: false };
        }
        if pos == from {
            return MapResult { pos: from, deleted: false };
        }
        if pos == to {
            return MapResult { pos: from + new_len, deleted: false };
        }

        let pos = match assoc {
            Assoc::Left => from,
            Assoc::Right => from + new_len,
        };
        MapResult { pos, deleted: true }
    }
}

/// One document transaction
///
/// `version` is the document version the change produces. Versions increase
/// monotonically within an editing session; anchors remember the last version
/// applied to them so replaying a change is a no-op.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub version: u64,
    #[serde(default)]
    steps: Vec<EditStep>,
}

impl ChangeSet {
    pub fn new(version: u64) -> Self {
        Self { version, steps: Vec::new() }
    }

    /// Builder-style append
    pub fn with(mut self, step: EditStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn steps(&self) -> &[EditStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Map a position through every step
    pub fn map(&self, pos: usize, assoc: Assoc) -> MapResult {
        let mut result = MapResult { pos, deleted: false };
        for step in &self.steps {
            let next = step.map(result.pos, assoc);
            result = MapResult { pos: next.pos, deleted: result.deleted || next.deleted };
        }
        result
    }

    /// Map a tag span: start moves past insertions at its edge, end stays
    /// before them. `None` when an endpoint was deleted or the span collapsed.
    pub fn map_span(&self, span: Span) -> Option<Span> {
        let start = self.map(span.start, Assoc::Right);
        let end = self.map(span.end, Assoc::Left);
        if start.deleted || end.deleted || start.pos >= end.pos {
            return None;
        }
        Some(Span::new(start.pos, end.pos))
    }
}

// =============================================================================
// Tests
// =============================================================================
