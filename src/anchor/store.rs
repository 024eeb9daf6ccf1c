//! Anchor Store: records keyed by range id, plus the block index

use chrono::Utc;
use std::collections::{BTreeMap, HashMap};

use crate::anchor::record::{AnchorRecord, AnchorStatus};
use crate::document::Span;
use crate::error::TagError;

// =============================================================================
// BlockIndex
// =============================================================================

/// Block id -> anchor ids in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockIndex {
    blocks: HashMap<String, Vec<String>>,
}

impl BlockIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, block_id: &str, anchor_id: &str) {
        let ids = self.blocks.entry(block_id.to_string()).or_default();
        if !ids.iter().any(|id| id == anchor_id) {
            ids.push(anchor_id.to_string());
        }
    }

    pub fn remove(&mut self, block_id: &str, anchor_id: &str) {
        if let Some(ids) = self.blocks.get_mut(block_id) {
            ids.retain(|id| id != anchor_id);
            if ids.is_empty() {
                self.blocks.remove(block_id);
            }
        }
    }

    /// Move an anchor between blocks (appended at the end of the new block)
    pub fn relocate(&mut self, from: &str, to: &str, anchor_id: &str) {
        if from == to {
            return;
        }
        self.remove(from, anchor_id);
        self.insert(to, anchor_id);
    }

    pub fn ids(&self, block_id: &str) -> &[String] {
        self.blocks.get(block_id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    /// Ordered copy for snapshots
    pub fn to_map(&self) -> BTreeMap<String, Vec<String>> {
        self.blocks.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

// =============================================================================
// AnchorStore
// =============================================================================

/// Owns every anchor of the active document
#[derive(Debug, Clone, Default)]
pub struct AnchorStore {
    records: HashMap<String, AnchorRecord>,
    order: Vec<String>,
    block_index: BlockIndex,
    next_seq: u64,
}

impl AnchorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and index a new anchor
    pub fn create(
        &mut self,
        tag_id: &str,
        span: Span,
        content: &str,
        content_before: &str,
        content_after: &str,
        block_id: &str,
    ) -> Result<AnchorRecord, TagError> {
        if span.start >= span.end {
            return Err(TagError::InvalidSpan { start: span.start, end: span.end });
        }

        let id = self.fresh_id();
        let now = Utc::now();
        let record = AnchorRecord {
            id: id.clone(),
            tag_id: tag_id.to_string(),
            span,
            block_id: block_id.to_string(),
            content: content.to_string(),
            content_before: content_before.to_string(),
            content_after: content_after.to_string(),
            status: AnchorStatus::Resolved,
            doc_version: 0,
            recovery_attempts: 0,
            created_at: now,
            updated_at: now,
        };

        self.block_index.insert(block_id, &id);
        self.order.push(id.clone());
        self.records.insert(id, record.clone());
        Ok(record)
    }

    /// Insert a record restored from a snapshot. Rejects collapsed spans and
    /// duplicate ids.
    pub fn restore(&mut self, record: AnchorRecord) -> Result<(), TagError> {
        if record.span.start >= record.span.end {
            return Err(TagError::InvalidSpan { start: record.span.start, end: record.span.end });
        }
        if self.records.contains_key(&record.id) {
            return Ok(());
        }
        self.block_index.insert(&record.block_id, &record.id);
        self.order.push(record.id.clone());
        self.records.insert(record.id.clone(), record);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&AnchorRecord> {
        self.records.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// Update span, content and context in place
    pub fn update_span(
        &mut self,
        id: &str,
        span: Span,
        content: &str,
        content_before: &str,
        content_after: &str,
    ) -> Result<(), TagError> {
        let record = self
            .records
            .get_mut(id)
            .ok_or_else(|| TagError::AnchorNotFound(id.to_string()))?;
        record.span = span;
        record.content = content.to_string();
        record.content_before = content_before.to_string();
        record.content_after = content_after.to_string();
        record.touch();
        Ok(())
    }

    pub fn set_status(&mut self, id: &str, status: AnchorStatus) -> Result<(), TagError> {
        let record = self
            .records
            .get_mut(id)
            .ok_or_else(|| TagError::AnchorNotFound(id.to_string()))?;
        record.status = status;
        Ok(())
    }

    /// Move an anchor to another block, keeping the index in step
    pub fn set_block(&mut self, id: &str, block_id: &str) -> Result<(), TagError> {
        let record = self
            .records
            .get_mut(id)
            .ok_or_else(|| TagError::AnchorNotFound(id.to_string()))?;
        let old = std::mem::replace(&mut record.block_id, block_id.to_string());
        self.block_index.relocate(&old, block_id, id);
        Ok(())
    }

    /// Write back a record produced elsewhere (remap output)
    pub fn replace(&mut self, record: AnchorRecord) -> Result<(), TagError> {
        let existing = self
            .records
            .get_mut(&record.id)
            .ok_or_else(|| TagError::AnchorNotFound(record.id.clone()))?;
        let old_block = existing.block_id.clone();
        let id = record.id.clone();
        let new_block = record.block_id.clone();
        *existing = record;
        self.block_index.relocate(&old_block, &new_block, &id);
        Ok(())
    }

    /// Mutate a record in place
    pub fn with_record<F>(&mut self, id: &str, f: F) -> Result<(), TagError>
    where
        F: FnOnce(&mut AnchorRecord),
    {
        let record = self
            .records
            .get_mut(id)
            .ok_or_else(|| TagError::AnchorNotFound(id.to_string()))?;
        f(record);
        Ok(())
    }

    /// Delete and unindex. No-op if already absent.
    pub fn remove(&mut self, id: &str) -> Option<AnchorRecord> {
        let record = self.records.remove(id)?;
        self.block_index.remove(&record.block_id, id);
        self.order.retain(|existing| existing != id);
        Some(record)
    }

    /// Anchors in a block, in insertion order
    pub fn list_by_block(&self, block_id: &str) -> Vec<&AnchorRecord> {
        self.block_index
            .ids(block_id)
            .iter()
            .filter_map(|id| self.records.get(id))
            .collect()
    }

    /// All anchors in insertion order
    pub fn list_all(&self) -> Vec<&AnchorRecord> {
        self.order.iter().filter_map(|id| self.records.get(id)).collect()
    }

    pub fn ids(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn ids_for_tag(&self, tag_id: &str) -> Vec<String> {
        self.list_all()
            .into_iter()
            .filter(|r| r.tag_id == tag_id)
            .map(|r| r.id.clone())
            .collect()
    }

    pub fn stale_ids(&self) -> Vec<String> {
        self.list_all()
            .into_iter()
            .filter(|r| r.is_stale())
            .map(|r| r.id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.order.clear();
        self.block_index.clear();
    }

    pub fn block_index(&self) -> &BlockIndex {
        &self.block_index
    }

    /// Next id sequence number (persisted so ids stay unique after reload)
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    pub fn set_next_seq(&mut self, seq: u64) {
        self.next_seq = self.next_seq.max(seq);
    }

    fn fresh_id(&mut self) -> String {
        loop {
            self.next_seq += 1;
            let id = format!("range_{}", self.next_seq);
            if !self.records.contains_key(&id) {
                return id;
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
