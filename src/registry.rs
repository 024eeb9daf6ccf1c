//! Tag Registry: tag definitions by id
//!
//! A definition is either document-scoped (applies to the whole note) or
//! inline (applied to spans through anchors). Ids are unique across both
//! scopes; the registry keeps insertion order for listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::TagError;

pub const DEFAULT_TAG_COLOR: &str = "#3B82F6";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagScope {
    Document,
    Inline,
}

impl TagScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagScope::Document => "document",
            TagScope::Inline => "inline",
        }
    }
}

/// A named, colored tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagDefinition {
    /// Generated from the name when left empty
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub scope: TagScope,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

fn default_color() -> String {
    DEFAULT_TAG_COLOR.to_string()
}

impl TagDefinition {
    pub fn new(name: &str, color: &str, scope: TagScope) -> Self {
        Self {
            id: slug(name),
            name: name.to_string(),
            color: color.to_string(),
            description: None,
            scope,
            created_at: Utc::now(),
        }
    }

    pub fn inline(name: &str, color: &str) -> Self {
        Self::new(name, color, TagScope::Inline)
    }

    pub fn document(name: &str, color: &str) -> Self {
        Self::new(name, color, TagScope::Document)
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

/// Lowercase alphanumeric runs joined by `-`
pub fn slug(name: &str) -> String {
    let parts: Vec<String> = name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_lowercase())
        .collect();
    if parts.is_empty() {
        "tag".to_string()
    } else {
        parts.join("-")
    }
}

// =============================================================================
// Registry
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct TagRegistry {
    tags: HashMap<String, TagDefinition>,
    order: Vec<String>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_definitions(definitions: Vec<TagDefinition>) -> Self {
        let mut registry = Self::new();
        for def in definitions {
            if let Err(e) = registry.add_or_get(def) {
                console_warn!("[TagRegistry] Skipping definition: {}", e);
            }
        }
        registry
    }

    /// Register `def`, or return the existing definition with the same id
    /// unchanged. A blank id is derived from the name.
    pub fn add_or_get(&mut self, mut def: TagDefinition) -> Result<&TagDefinition, TagError> {
        if def.id.trim().is_empty() {
            def.id = slug(&def.name);
        }

        if let Some(existing) = self.tags.get(&def.id) {
            if existing.scope != def.scope {
                return Err(TagError::ScopeConflict {
                    tag_id: def.id,
                    existing: existing.scope.as_str().to_string(),
                });
            }
        } else {
            self.order.push(def.id.clone());
            self.tags.insert(def.id.clone(), def.clone());
        }

        self.tags.get(&def.id).ok_or(TagError::TagNotFound(def.id))
    }

    /// Explicit edit of name, color and description. The scope is fixed at
    /// creation.
    pub fn update(&mut self, def: TagDefinition) -> Result<&TagDefinition, TagError> {
        let existing = self
            .tags
            .get_mut(&def.id)
            .ok_or_else(|| TagError::TagNotFound(def.id.clone()))?;
        if existing.scope != def.scope {
            return Err(TagError::ScopeConflict {
                tag_id: def.id,
                existing: existing.scope.as_str().to_string(),
            });
        }
        existing.name = def.name;
        existing.color = def.color;
        existing.description = def.description;
        Ok(existing)
    }

    /// Drop a definition. Anchors referencing it are not touched here.
    pub fn remove(&mut self, tag_id: &str) -> Option<TagDefinition> {
        let def = self.tags.remove(tag_id)?;
        self.order.retain(|id| id != tag_id);
        Some(def)
    }

    pub fn by_id(&self, tag_id: &str) -> Option<&TagDefinition> {
        self.tags.get(tag_id)
    }

    pub fn contains(&self, tag_id: &str) -> bool {
        self.tags.contains_key(tag_id)
    }

    pub fn list_all(&self) -> Vec<&TagDefinition> {
        self.order.iter().filter_map(|id| self.tags.get(id)).collect()
    }

    pub fn list_document_scoped(&self) -> Vec<&TagDefinition> {
        self.list_scope(TagScope::Document)
    }

    pub fn list_inline_scoped(&self) -> Vec<&TagDefinition> {
        self.list_scope(TagScope::Inline)
    }

    fn list_scope(&self, scope: TagScope) -> Vec<&TagDefinition> {
        self.list_all().into_iter().filter(|def| def.scope == scope).collect()
    }

    pub fn to_vec(&self) -> Vec<TagDefinition> {
        self.list_all().into_iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn clear(&mut self) {
        self.tags.clear();
        self.order.clear();
    }
}

// =============================================================================
// Tests
// =============================================================================
