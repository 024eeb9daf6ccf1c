//! WASM bridge: `TagCortex` wraps a [`TagEngine`] for the editor host
//!
//! Documents cross the boundary as [`DocumentSnapshot`] objects
//! (`{ blocks: [{id, text}], marks: [{range_id, tag_id, span}] }`). Calls that
//! touch marks return the mark mutations the editor should perform as
//! `markOps`.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::config::AnchorConfig;
use crate::document::{DocumentSnapshot, MarkOp, TextDocument};
use crate::engine::{RecoveryTicket, TagEngine};
use crate::persistence::TagStateStore;
use crate::registry::TagDefinition;
use crate::remap::ChangeSet;
use crate::search::SearchFilters;

// =============================================================================
// Host-backed store
// =============================================================================

/// [`TagStateStore`] over a JS `Map<string, string>` owned by the host
pub struct JsMapStore {
    map: js_sys::Map,
}

impl JsMapStore {
    pub fn new(map: js_sys::Map) -> Self {
        Self { map }
    }
}

impl TagStateStore for JsMapStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.get(&JsValue::from_str(key)).as_string()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), String> {
        self.map.set(&JsValue::from_str(key), &JsValue::from_str(&value));
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.map.delete(&JsValue::from_str(key));
    }
}

// =============================================================================
// Conversions
// =============================================================================

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn from_js<T: serde::de::DeserializeOwned>(value: JsValue, what: &str) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&format!("Invalid {}: {}", what, e)))
}

fn document(snapshot: JsValue) -> Result<TextDocument, JsValue> {
    let snapshot: DocumentSnapshot = from_js(snapshot, "document snapshot")?;
    Ok(TextDocument::from_snapshot(snapshot))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WithMarkOps<T: Serialize> {
    result: T,
    mark_ops: Vec<MarkOp>,
}

fn with_ops<T: Serialize>(result: T, doc: &mut TextDocument) -> Result<JsValue, JsValue> {
    to_js(&WithMarkOps { result, mark_ops: doc.take_mark_ops() })
}

// =============================================================================
// TagCortex
// =============================================================================

#[wasm_bindgen]
pub struct TagCortex {
    engine: TagEngine<JsMapStore>,
}

#[wasm_bindgen]
impl TagCortex {
    /// Create a cortex. `config` may be undefined; `store` is the host's
    /// persistence map (a fresh one is created when omitted).
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue, store: Option<js_sys::Map>) -> TagCortex {
        let config = if config.is_undefined() || config.is_null() {
            AnchorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).unwrap_or_else(|e| {
                console_warn!("[TagCortex] Invalid config, using defaults: {}", e);
                AnchorConfig::default()
            })
        };
        let store = JsMapStore::new(store.unwrap_or_else(js_sys::Map::new));
        console_log!("[TagCortex] Initialized");
        TagCortex { engine: TagEngine::with_store(config, store) }
    }

    /// Seed default tags (used by fresh documents and reset)
    #[wasm_bindgen(js_name = setDefaultTags)]
    pub fn set_default_tags(&mut self, tags: JsValue) -> Result<(), JsValue> {
        let tags: Vec<TagDefinition> = from_js(tags, "tag list")?;
        self.engine.set_default_tags(tags);
        Ok(())
    }

    #[wasm_bindgen(js_name = getConfig)]
    pub fn get_config(&self) -> Result<JsValue, JsValue> {
        to_js(self.engine.config())
    }

    #[wasm_bindgen(js_name = documentId)]
    pub fn document_id(&self) -> Option<String> {
        self.engine.document_id().map(str::to_string)
    }

    // -------------------------------------------------------------------------
    // Documents and persistence
    // -------------------------------------------------------------------------

    #[wasm_bindgen(js_name = openDocument)]
    pub fn open_document(&mut self, document_id: &str) -> Result<JsValue, JsValue> {
        let outcome = self
            .engine
            .open_document(document_id)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        to_js(&outcome)
    }

    #[wasm_bindgen(js_name = loadState)]
    pub fn load_state(&mut self, document_id: &str) -> Result<JsValue, JsValue> {
        let outcome = self.engine.load_state(document_id);
        to_js(&outcome)
    }

    /// Save the active document. With a snapshot, anchors are first checked
    /// against the live document.
    #[wasm_bindgen(js_name = saveState)]
    pub fn save_state(&mut self, snapshot: JsValue) -> Result<(), JsValue> {
        let result = if snapshot.is_undefined() || snapshot.is_null() {
            self.engine.save_state()
        } else {
            let doc = document(snapshot)?;
            self.engine.save_state_with(&doc)
        };
        result.map_err(|e| JsValue::from_str(&e.to_string()))
    }

    // -------------------------------------------------------------------------
    // Tags
    // -------------------------------------------------------------------------

    #[wasm_bindgen(js_name = addTag)]
    pub fn add_tag(&mut self, def: JsValue, start: usize, end: usize, snapshot: JsValue) -> Result<JsValue, JsValue> {
        let def: TagDefinition = from_js(def, "tag definition")?;
        let mut doc = document(snapshot)?;
        let record = self
            .engine
            .add_tag(def, start, end, &mut doc)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        with_ops(record, &mut doc)
    }

    #[wasm_bindgen(js_name = removeTag)]
    pub fn remove_tag(&mut self, anchor_id: &str, snapshot: JsValue) -> Result<JsValue, JsValue> {
        let mut doc = document(snapshot)?;
        let removed = self.engine.remove_tag(anchor_id, &mut doc);
        with_ops(removed, &mut doc)
    }

    #[wasm_bindgen(js_name = addDocumentTag)]
    pub fn add_document_tag(&mut self, def: JsValue) -> Result<JsValue, JsValue> {
        let def: TagDefinition = from_js(def, "tag definition")?;
        let tag = self
            .engine
            .add_document_tag(def)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        to_js(&tag)
    }

    #[wasm_bindgen(js_name = removeDocumentTag)]
    pub fn remove_document_tag(&mut self, tag_id: &str) -> bool {
        self.engine.remove_document_tag(tag_id)
    }

    /// Remove a definition; `cascade` also removes its anchors
    #[wasm_bindgen(js_name = removeTagDefinition)]
    pub fn remove_tag_definition(&mut self, tag_id: &str, cascade: bool, snapshot: JsValue) -> Result<JsValue, JsValue> {
        if cascade {
            let mut doc = document(snapshot)?;
            let removed = self
                .engine
                .remove_tag_definition_cascade(tag_id, &mut doc)
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
            with_ops(removed, &mut doc)
        } else {
            let def = self
                .engine
                .remove_tag_definition(tag_id)
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
            to_js(&def)
        }
    }

    #[wasm_bindgen(js_name = listTags)]
    pub fn list_tags(&self) -> Result<JsValue, JsValue> {
        to_js(&self.engine.registry().to_vec())
    }

    #[wasm_bindgen(js_name = listAnchors)]
    pub fn list_anchors(&self) -> Result<JsValue, JsValue> {
        to_js(&self.engine.anchors().list_all())
    }

    #[wasm_bindgen(js_name = tagsAtPosition)]
    pub fn tags_at_position(&self, pos: usize) -> JsValue {
        to_js(&self.engine.tags_at_position(pos)).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = tagsInBlock)]
    pub fn tags_in_block(&self, block_id: &str) -> JsValue {
        to_js(&self.engine.tags_in_block(block_id)).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen]
    pub fn search(&self, query: &str, filters: JsValue) -> Result<JsValue, JsValue> {
        let filters: SearchFilters = if filters.is_undefined() || filters.is_null() {
            SearchFilters::default()
        } else {
            from_js(filters, "search filters")?
        };
        to_js(&self.engine.search(query, &filters))
    }

    // -------------------------------------------------------------------------
    // Edits and recovery
    // -------------------------------------------------------------------------

    /// Remap anchors through a change. `snapshot` is the post-change document.
    #[wasm_bindgen(js_name = applyChange)]
    pub fn apply_change(&mut self, change: JsValue, snapshot: JsValue) -> Result<JsValue, JsValue> {
        let change: ChangeSet = from_js(change, "change set")?;
        let doc = document(snapshot)?;
        to_js(&self.engine.apply_change(&change, &doc))
    }

    #[wasm_bindgen(js_name = recoverPending)]
    pub fn recover_pending(&mut self, snapshot: JsValue) -> Result<JsValue, JsValue> {
        let mut doc = document(snapshot)?;
        let report = self.engine.recover_pending(&mut doc);
        with_ops(report, &mut doc)
    }

    /// Ticket for a deferred recovery pass, or null when nothing is pending
    #[wasm_bindgen(js_name = beginRecovery)]
    pub fn begin_recovery(&self) -> JsValue {
        match self.engine.begin_recovery() {
            Some(ticket) => to_js(&ticket).unwrap_or(JsValue::NULL),
            None => JsValue::NULL,
        }
    }

    #[wasm_bindgen(js_name = completeRecovery)]
    pub fn complete_recovery(&mut self, ticket: JsValue, snapshot: JsValue) -> Result<JsValue, JsValue> {
        let ticket: RecoveryTicket = from_js(ticket, "recovery ticket")?;
        let mut doc = document(snapshot)?;
        let report = self.engine.complete_recovery(ticket, &mut doc);
        with_ops(report, &mut doc)
    }

    #[wasm_bindgen]
    pub fn locate(&mut self, anchor_id: &str, snapshot: JsValue) -> Result<JsValue, JsValue> {
        let mut doc = document(snapshot)?;
        let span = self
            .engine
            .locate(anchor_id, &mut doc)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        with_ops(span, &mut doc)
    }

    #[wasm_bindgen]
    pub fn sweep(&mut self, snapshot: JsValue) -> Result<JsValue, JsValue> {
        let mut doc = document(snapshot)?;
        let report = self.engine.sweep(&mut doc);
        with_ops(report, &mut doc)
    }

    #[wasm_bindgen(js_name = clearAllTags)]
    pub fn clear_all_tags(&mut self, snapshot: JsValue) -> Result<JsValue, JsValue> {
        let mut doc = document(snapshot)?;
        let removed = self.engine.clear_all_tags(&mut doc);
        with_ops(removed, &mut doc)
    }

    #[wasm_bindgen(js_name = resetTaggingState)]
    pub fn reset_tagging_state(&mut self, snapshot: JsValue) -> Result<JsValue, JsValue> {
        let mut doc = document(snapshot)?;
        self.engine.reset_tagging_state(&mut doc);
        with_ops((), &mut doc)
    }

    #[wasm_bindgen(js_name = drainEvents)]
    pub fn drain_events(&mut self) -> JsValue {
        let events = self.engine.drain_events();
        to_js(&events).unwrap_or_else(|e| {
            console_error!("[TagCortex] Failed to serialize events: {:?}", e);
            JsValue::NULL
        })
    }
}
