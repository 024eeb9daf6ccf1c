//! Document boundary: what the anchor engine needs from the editor
//!
//! The rich-text editor owns the real document. TagCore sees it through
//! [`DocumentView`] (read paths: text, flattened text nodes, blocks, existing
//! tag marks) and [`DocumentEditor`] (mark application). Positions are offsets
//! in the document's linear text space, counted in chars.
//!
//! [`TextDocument`] is a block-structured plain-text implementation used by the
//! WASM bridge (built from host snapshots) and by tests.

use serde::{Deserialize, Serialize};

use crate::remap::{Assoc, ChangeSet};

/// Characters between consecutive blocks in a [`TextDocument`]
pub const BLOCK_SEPARATOR: char = '\n';

// =============================================================================
// Core Types
// =============================================================================

/// Half-open range `[start, end)` in linear text coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// True if `pos` falls inside `[start, end)`
    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos < self.end
    }
}

/// A run of text at a known position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    /// Linear offset of the first char
    pub pos: usize,
    pub text: String,
    /// Owning block, if the editor knows one
    pub block_id: Option<String>,
}

/// A tag mark currently present in the editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkedRange {
    pub range_id: String,
    pub tag_id: String,
    pub span: Span,
}

/// Attributes carried by an applied tag mark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkAttrs {
    pub range_id: String,
    pub tag_id: String,
    pub block_id: String,
    pub color: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub content: String,
    pub content_before: String,
    pub content_after: String,
}

/// Mark mutation requested of the editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MarkOp {
    Apply { span: Span, attrs: MarkAttrs },
    Remove { range_id: String },
}

// =============================================================================
// Boundary Traits
// =============================================================================

/// Read access to the live document
pub trait DocumentView {
    /// Size of the linear coordinate space
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Text in `[start, end)`, clamped to the document
    fn text_between(&self, start: usize, end: usize) -> String;

    /// All text nodes in document order
    fn text_nodes(&self) -> Vec<TextNode>;

    /// Range covered by a block, if it exists
    fn block_span(&self, block_id: &str) -> Option<Span>;

    /// Block containing `pos`, if any
    fn block_at(&self, pos: usize) -> Option<String>;

    /// Tag marks currently rendered in the document
    fn marked_ranges(&self) -> Vec<MarkedRange> {
        Vec::new()
    }
}

/// Mark mutation on the live document
pub trait DocumentEditor: DocumentView {
    fn apply_mark(&mut self, span: Span, attrs: &MarkAttrs);
    fn remove_mark(&mut self, range_id: &str);
}

// =============================================================================
// TextDocument
// =============================================================================

/// A block of plain text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    #[serde(default)]
    pub id: Option<String>,
    pub text: String,
}

/// Serializable document snapshot sent by the host
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub blocks: Vec<TextBlock>,
    #[serde(default)]
    pub marks: Vec<MarkedRange>,
}

/// Block-structured plain-text document
///
/// Blocks are laid out back to back with a single [`BLOCK_SEPARATOR`] between
/// them, so block `i` starts at the sum of the previous block lengths plus `i`.
#[derive(Debug, Clone, Default)]
pub struct TextDocument {
    blocks: Vec<TextBlock>,
    starts: Vec<usize>,
    chars: Vec<char>,
    marks: Vec<MarkedRange>,
    mark_ops: Vec<MarkOp>,
}

impl TextDocument {
    /// Single anonymous block
    pub fn new(text: &str) -> Self {
        Self::from_blocks(vec![TextBlock { id: None, text: text.to_string() }])
    }

    /// Blocks from `(id, text)` pairs
    pub fn with_blocks(blocks: &[(&str, &str)]) -> Self {
        Self::from_blocks(
            blocks
                .iter()
                .map(|(id, text)| TextBlock { id: Some(id.to_string()), text: text.to_string() })
                .collect(),
        )
    }

    pub fn from_blocks(blocks: Vec<TextBlock>) -> Self {
        let mut doc = Self { blocks, ..Default::default() };
        doc.rebuild();
        doc
    }

    pub fn from_snapshot(snapshot: DocumentSnapshot) -> Self {
        let mut doc = Self::from_blocks(snapshot.blocks);
        doc.marks = snapshot.marks;
        doc
    }

    /// Full linear text
    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn blocks(&self) -> &[TextBlock] {
        &self.blocks
    }

    /// Mark mutations recorded since the last call
    pub fn take_mark_ops(&mut self) -> Vec<MarkOp> {
        std::mem::take(&mut self.mark_ops)
    }

    /// Apply an edit, re-split blocks, and carry marks and block ids forward
    pub fn apply_change(&mut self, change: &ChangeSet) {
        let old_starts: Vec<(usize, Option<String>)> = self
            .starts
            .iter()
            .zip(self.blocks.iter())
            .map(|(start, block)| (*start, block.id.clone()))
            .collect();

        let mut chars = self.chars.clone();
        for step in change.steps() {
            let (from, to) = (step.from().min(chars.len()), step.to().min(chars.len()));
            let inserted: Vec<char> = step.inserted_text().chars().collect();
            drop(chars.splice(from..to.max(from), inserted));
        }

        let text: String = chars.iter().collect();
        let mut blocks: Vec<TextBlock> = text
            .split(BLOCK_SEPARATOR)
            .map(|line| TextBlock { id: None, text: line.to_string() })
            .collect();

        let mut starts = Vec::with_capacity(blocks.len());
        let mut pos = 0;
        for block in &blocks {
            starts.push(pos);
            pos += block.text.chars().count() + 1;
        }

        // An old block keeps its id on whichever new block its start maps into
        for (old_start, id) in old_starts {
            let Some(id) = id else { continue };
            let mapped = change.map(old_start, Assoc::Right).pos;
            let idx = starts.iter().rposition(|s| *s <= mapped).unwrap_or(0);
            if blocks[idx].id.is_none() {
                blocks[idx].id = Some(id);
            }
        }

        self.marks = self
            .marks
            .iter()
            .filter_map(|mark| {
                let span = change.map_span(mark.span)?;
                Some(MarkedRange { span, ..mark.clone() })
            })
            .collect();

        self.blocks = blocks;
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.starts.clear();
        self.chars.clear();
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                self.chars.push(BLOCK_SEPARATOR);
            }
            self.starts.push(self.chars.len());
            self.chars.extend(block.text.chars());
        }
    }

    fn block_index_at(&self, pos: usize) -> Option<usize> {
        if self.blocks.is_empty() || pos > self.chars.len() {
            return None;
        }
        self.starts.iter().rposition(|start| *start <= pos)
    }
}

impl DocumentView for TextDocument {
    fn len(&self) -> usize {
        self.chars.len()
    }

    fn text_between(&self, start: usize, end: usize) -> String {
        let end = end.min(self.chars.len());
        if start >= end {
            return String::new();
        }
        self.chars[start..end].iter().collect()
    }

    fn text_nodes(&self) -> Vec<TextNode> {
        self.blocks
            .iter()
            .zip(self.starts.iter())
            .filter(|(block, _)| !block.text.is_empty())
            .map(|(block, start)| TextNode {
                pos: *start,
                text: block.text.clone(),
                block_id: block.id.clone(),
            })
            .collect()
    }

    fn block_span(&self, block_id: &str) -> Option<Span> {
        let idx = self.blocks.iter().position(|b| b.id.as_deref() == Some(block_id))?;
        let start = self.starts[idx];
        Some(Span::new(start, start + self.blocks[idx].text.chars().count()))
    }

    fn block_at(&self, pos: usize) -> Option<String> {
        let idx = self.block_index_at(pos)?;
        self.blocks[idx].id.clone()
    }

    fn marked_ranges(&self) -> Vec<MarkedRange> {
        self.marks.clone()
    }
}

impl DocumentEditor for TextDocument {
    fn apply_mark(&mut self, span: Span, attrs: &MarkAttrs) {
        self.marks.retain(|m| m.range_id != attrs.range_id);
        self.marks.push(MarkedRange {
            range_id: attrs.range_id.clone(),
            tag_id: attrs.tag_id.clone(),
            span,
        });
        self.mark_ops.push(MarkOp::Apply { span, attrs: attrs.clone() });
    }

    fn remove_mark(&mut self, range_id: &str) {
        self.marks.retain(|m| m.range_id != range_id);
        self.mark_ops.push(MarkOp::Remove { range_id: range_id.to_string() });
    }
}

// =============================================================================
// Tests
// =============================================================================
