//! Persistence Bridge: per-document tag state in a host key-value store
//!
//! State is serialized to JSON (serde_json) under `tagcore:{document_id}`.
//! The host supplies the store; [`MemoryStore`] is the in-process default.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::anchor::AnchorRecord;
use crate::error::TagError;
use crate::registry::TagDefinition;

const KEY_PREFIX: &str = "tagcore:";

// =============================================================================
// Snapshot
// =============================================================================

/// Everything the engine knows about one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentTagState {
    pub document_id: String,
    pub saved_at: DateTime<Utc>,
    /// Number of anchors in the snapshot
    #[serde(default)]
    pub tag_count: usize,
    /// Next anchor id sequence number
    #[serde(default)]
    pub next_seq: u64,
    #[serde(default)]
    pub tags: Vec<TagDefinition>,
    #[serde(default)]
    pub anchors: Vec<AnchorRecord>,
    /// Block id -> anchor ids
    #[serde(default)]
    pub block_index: BTreeMap<String, Vec<String>>,
}

impl DocumentTagState {
    pub fn empty(document_id: &str) -> Self {
        Self {
            document_id: document_id.to_string(),
            saved_at: Utc::now(),
            tag_count: 0,
            next_seq: 0,
            tags: Vec::new(),
            anchors: Vec::new(),
            block_index: BTreeMap::new(),
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// String key-value storage supplied by the host
pub trait TagStateStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<(), String>;
    fn remove(&mut self, key: &str);
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TagStateStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), String> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

// =============================================================================
// Bridge
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct PersistenceBridge<S: TagStateStore> {
    store: S,
}

impl<S: TagStateStore> PersistenceBridge<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn key(document_id: &str) -> String {
        format!("{}{}", KEY_PREFIX, document_id)
    }

    pub fn save(&mut self, state: &DocumentTagState) -> Result<(), TagError> {
        let json = serde_json::to_string(state).map_err(|e| TagError::StateSaveFailed {
            document_id: state.document_id.clone(),
            reason: e.to_string(),
        })?;
        self.store
            .set(&Self::key(&state.document_id), json)
            .map_err(|reason| TagError::StateSaveFailed { document_id: state.document_id.clone(), reason })
    }

    /// `Ok(None)` when nothing was ever saved for this document
    pub fn load(&self, document_id: &str) -> Result<Option<DocumentTagState>, TagError> {
        let Some(json) = self.store.get(&Self::key(document_id)) else {
            return Ok(None);
        };

        let state: DocumentTagState = serde_json::from_str(&json).map_err(|e| TagError::StateLoadFailed {
            document_id: document_id.to_string(),
            reason: e.to_string(),
        })?;

        if state.document_id != document_id {
            return Err(TagError::StateLoadFailed {
                document_id: document_id.to_string(),
                reason: format!("entry belongs to {}", state.document_id),
            });
        }
        Ok(Some(state))
    }

    pub fn remove(&mut self, document_id: &str) {
        self.store.remove(&Self::key(document_id));
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

// =============================================================================
// Tests
// =============================================================================
