//! Tag search over the registry and anchor store
//!
//! Document tags match on name. Inline tags produce one result per anchor and
//! match on tag name or covered content. Matching is case-insensitive.

use serde::{Deserialize, Serialize};

use crate::anchor::{AnchorRecord, AnchorStore};
use crate::document::{DocumentView, Span};
use crate::registry::{TagDefinition, TagRegistry, TagScope};

/// Chars of context shown on each side of a preview
pub const PREVIEW_CONTEXT: usize = 25;

/// Better matches sort first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRank {
    ExactName,
    NamePrefix,
    NameSubstring,
    Content,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default)]
    pub scope: Option<TagScope>,
    #[serde(default)]
    pub tag_ids: Option<Vec<String>>,
}

impl SearchFilters {
    fn admits(&self, def: &TagDefinition) -> bool {
        if self.scope.map_or(false, |scope| scope != def.scope) {
            return false;
        }
        match &self.tag_ids {
            Some(ids) => ids.iter().any(|id| *id == def.id),
            None => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagSearchResult {
    pub tag: TagDefinition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    pub rank: MatchRank,
    /// False for stale anchors that are not currently rendered
    pub visible: bool,
}

fn rank_name(name: &str, query: &str) -> Option<MatchRank> {
    let name = name.to_lowercase();
    if name == query {
        Some(MatchRank::ExactName)
    } else if name.starts_with(query) {
        Some(MatchRank::NamePrefix)
    } else if name.contains(query) {
        Some(MatchRank::NameSubstring)
    } else {
        None
    }
}

/// `...before[content]after...` with up to `PREVIEW_CONTEXT` chars per side
pub fn preview(content: &str, before: &str, after: &str) -> String {
    let before_chars: Vec<char> = before.chars().collect();
    let after_chars: Vec<char> = after.chars().collect();

    let lead: String = before_chars[before_chars.len().saturating_sub(PREVIEW_CONTEXT)..].iter().collect();
    let tail: String = after_chars[..after_chars.len().min(PREVIEW_CONTEXT)].iter().collect();

    let mut out = String::new();
    if before_chars.len() > PREVIEW_CONTEXT {
        out.push_str("...");
    }
    out.push_str(&lead);
    out.push('[');
    out.push_str(content);
    out.push(']');
    out.push_str(&tail);
    if after_chars.len() > PREVIEW_CONTEXT {
        out.push_str("...");
    }
    out
}

fn live_preview<D: DocumentView + ?Sized>(anchor: &AnchorRecord, doc: &D) -> String {
    let span = anchor.span;
    let before = doc.text_between(span.start.saturating_sub(PREVIEW_CONTEXT + 1), span.start);
    let after = doc.text_between(span.end, span.end + PREVIEW_CONTEXT + 1);
    preview(&anchor.content, &before, &after)
}

/// Ranked search. When `doc` is given, previews of resolved anchors are read
/// from live text; otherwise from stored context.
pub fn search<D: DocumentView + ?Sized>(
    query: &str,
    filters: &SearchFilters,
    registry: &TagRegistry,
    anchors: &AnchorStore,
    doc: Option<&D>,
) -> Vec<TagSearchResult> {
    let query = query.trim().to_lowercase();
    let mut results = Vec::new();

    for def in registry.list_document_scoped() {
        if !filters.admits(def) {
            continue;
        }
        let rank = if query.is_empty() { Some(MatchRank::Content) } else { rank_name(&def.name, &query) };
        if let Some(rank) = rank {
            results.push(TagSearchResult {
                tag: def.clone(),
                anchor_id: None,
                span: None,
                block_id: None,
                preview: None,
                rank,
                visible: true,
            });
        }
    }

    for anchor in anchors.list_all() {
        let Some(def) = registry.by_id(&anchor.tag_id) else { continue };
        if def.scope != TagScope::Inline || !filters.admits(def) {
            continue;
        }

        let rank = if query.is_empty() {
            Some(MatchRank::Content)
        } else {
            rank_name(&def.name, &query).or_else(|| {
                anchor.content.to_lowercase().contains(&query).then_some(MatchRank::Content)
            })
        };
        let Some(rank) = rank else { continue };

        let text = match doc {
            Some(doc) if anchor.is_resolved() && anchor.matches(doc) => live_preview(anchor, doc),
            _ => preview(&anchor.content, &anchor.content_before, &anchor.content_after),
        };

        results.push(TagSearchResult {
            tag: def.clone(),
            anchor_id: Some(anchor.id.clone()),
            span: anchor.has_current_span().then_some(anchor.span),
            block_id: Some(anchor.block_id.clone()),
            preview: Some(text),
            rank,
            visible: anchor.is_resolved(),
        });
    }

    // Stable: equal ranks keep registry/anchor order
    results.sort_by_key(|r| r.rank);
    results
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::{AnchorStatus, StaleReason};
    use crate::document::TextDocument;

    fn fixture() -> (TagRegistry, AnchorStore) {
        let mut registry = TagRegistry::new();
        registry.add_or_get(TagDefinition::document("Project", "#1")).unwrap();
        registry.add_or_get(TagDefinition::inline("Projection", "#2")).unwrap();
        registry.add_or_get(TagDefinition::inline("Idea", "#3")).unwrap();

        let mut anchors = AnchorStore::new();
        anchors
            .create("idea", Span::new(0, 12), "project plan", "", " for Q3", "root")
            .unwrap();
        anchors
            .create("projection", Span::new(20, 25), "sales", "the ", "", "root")
            .unwrap();
        (registry, anchors)
    }

    fn run(query: &str, filters: &SearchFilters, registry: &TagRegistry, anchors: &AnchorStore) -> Vec<TagSearchResult> {
        search::<TextDocument>(query, filters, registry, anchors, None)
    }

    #[test]
    fn test_ranking_order() {
        let (registry, anchors) = fixture();
        let results = run("project", &SearchFilters::default(), &registry, &anchors);

        let ranks: Vec<MatchRank> = results.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![MatchRank::ExactName, MatchRank::NamePrefix, MatchRank::Content]);
        assert_eq!(results[0].tag.id, "project");
        assert_eq!(results[1].tag.id, "projection");
        assert_eq!(results[2].tag.id, "idea", "matched on covered content");
    }

    #[test]
    fn test_document_tags_match_name_only() {
        let (registry, anchors) = fixture();
        let filters = SearchFilters { scope: Some(TagScope::Document), tag_ids: None };
        assert!(run("sales", &filters, &registry, &anchors).is_empty());
    }

    #[test]
    fn test_tag_id_filter() {
        let (registry, anchors) = fixture();
        let filters = SearchFilters { scope: None, tag_ids: Some(vec!["idea".into()]) };
        let results = run("", &filters, &registry, &anchors);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].anchor_id.as_deref(), Some("range_1"));
    }

    #[test]
    fn test_stale_anchor_flagged_invisible() {
        let (registry, mut anchors) = fixture();
        anchors
            .set_status("range_2", AnchorStatus::Stale(StaleReason::Unmapped))
            .unwrap();
        let results = run("sales", &SearchFilters::default(), &registry, &anchors);
        assert_eq!(results.len(), 1);
        assert!(!results[0].visible);
        assert_eq!(results[0].span, None);
    }

    #[test]
    fn test_preview_truncation() {
        let long = "a".repeat(30);
        assert_eq!(preview("x", "ab", "cd"), "ab[x]cd");
        let text = preview("x", &long, &long);
        assert!(text.starts_with("..."));
        assert!(text.ends_with("..."));
        assert_eq!(text.chars().count(), 3 + 25 + 3 + 25 + 3);
    }

    #[test]
    fn test_live_preview_reads_document() {
        let doc = TextDocument::new("Before text hello after text");
        let mut registry = TagRegistry::new();
        registry.add_or_get(TagDefinition::inline("Greeting", "#4")).unwrap();
        let mut anchors = AnchorStore::new();
        anchors
            .create("greeting", Span::new(12, 17), "hello", "stale ctx ", "", "root")
            .unwrap();

        let results = search("hello", &SearchFilters::default(), &registry, &anchors, Some(&doc));
        assert_eq!(results[0].preview.as_deref(), Some("Before text [hello] after text"));
    }
}
