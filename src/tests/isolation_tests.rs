use crate::config::AnchorConfig;
use crate::document::{DocumentView, Span, TextDocument};
use crate::engine::{LoadOutcome, TagEngine, TagEvent};
use crate::persistence::{MemoryStore, TagStateStore};
use crate::registry::TagDefinition;
use crate::remap::{ChangeSet, EditStep};
use crate::search::SearchFilters;

fn tag() -> TagDefinition {
    TagDefinition::inline("Secret", "#EF4444")
}

// =============================================================================
// Document isolation
// =============================================================================

#[test]
fn test_unsaved_document_starts_empty() {
    let mut engine = TagEngine::new(AnchorConfig::default());
    engine.open_document("doc-a").unwrap();
    let mut doc_a = TextDocument::new("classified material");
    engine.add_tag(tag(), 0, 10, &mut doc_a).unwrap();
    engine.add_document_tag(TagDefinition::document("Archive", "#6B7280")).unwrap();

    let outcome = engine.open_document("doc-b").unwrap();
    assert_eq!(outcome, LoadOutcome::Fresh);
    assert!(engine.anchors().is_empty());
    assert!(engine.registry().is_empty());
    assert!(engine.search("secret", &SearchFilters::default()).is_empty());
    assert!(engine.tags_at_position(3).is_empty());
}

#[test]
fn test_switching_back_restores_only_own_state() {
    let mut engine = TagEngine::new(AnchorConfig::default());
    engine.open_document("doc-a").unwrap();
    let mut doc_a = TextDocument::new("classified material");
    let a = engine.add_tag(tag(), 0, 10, &mut doc_a).unwrap();

    engine.open_document("doc-b").unwrap();
    let mut doc_b = TextDocument::new("public notes");
    let b = engine
        .add_tag(TagDefinition::inline("Public", "#22C55E"), 0, 6, &mut doc_b)
        .unwrap();

    assert_eq!(engine.open_document("doc-a").unwrap(), LoadOutcome::Restored);
    assert!(engine.anchor(&a.id).is_some());
    assert_eq!(engine.anchors().len(), 1);
    assert!(!engine.registry().contains("public"));

    assert_eq!(engine.open_document("doc-b").unwrap(), LoadOutcome::Restored);
    assert_eq!(engine.anchor(&b.id).unwrap().content, "public");
    assert!(!engine.registry().contains("secret"));
}

#[test]
fn test_corrupt_entry_does_not_leak_previous_state() {
    let mut store = MemoryStore::new();
    store.set("tagcore:doc-b", "{\"document_id\": 7}".to_string()).unwrap();
    let mut engine = TagEngine::with_store(AnchorConfig::default(), store);

    engine.open_document("doc-a").unwrap();
    engine.add_tag(tag(), 0, 10, &mut TextDocument::new("classified material")).unwrap();

    match engine.open_document("doc-b").unwrap() {
        LoadOutcome::FellBack { .. } => {}
        other => panic!("expected fallback, got {:?}", other),
    }
    assert!(engine.anchors().is_empty());
    assert!(engine.registry().is_empty());
}

#[test]
fn test_undrained_events_do_not_follow_document_switch() {
    let mut engine = TagEngine::new(AnchorConfig::default());
    engine.open_document("doc-a").unwrap();
    engine.add_tag(tag(), 0, 10, &mut TextDocument::new("classified material")).unwrap();

    engine.open_document("doc-b").unwrap();
    assert!(engine.drain_events().is_empty());

    let mut doc_b = TextDocument::new("public notes");
    let b = engine
        .add_tag(TagDefinition::inline("Public", "#22C55E"), 0, 6, &mut doc_b)
        .unwrap();
    assert_eq!(
        engine.drain_events(),
        vec![TagEvent::TagApplied { anchor_id: b.id, tag_id: "public".into(), span: Span::new(0, 6) }]
    );
}

#[test]
fn test_saved_state_is_keyed_by_document() {
    let mut engine = TagEngine::new(AnchorConfig::default());
    engine.open_document("doc-a").unwrap();
    engine.add_tag(tag(), 0, 10, &mut TextDocument::new("classified material")).unwrap();
    engine.save_state().unwrap();

    assert!(engine.store().get("tagcore:doc-a").is_some());
    assert!(engine.store().get("tagcore:doc-b").is_none());
}

// =============================================================================
// Cancellation of deferred recovery
// =============================================================================

fn stale_engine() -> (TagEngine, TextDocument, String) {
    let mut engine = TagEngine::new(AnchorConfig::default());
    engine.open_document("doc-a").unwrap();
    let mut doc = TextDocument::new("hello world");
    let record = engine.add_tag(tag(), 0, 5, &mut doc).unwrap();

    let change = ChangeSet::new(1)
        .with(EditStep::delete(0, 6))
        .with(EditStep::insert(5, " hello"));
    doc.apply_change(&change);
    engine.apply_change(&change, &doc);
    doc.take_mark_ops();
    (engine, doc, record.id)
}

#[test]
fn test_ticket_completes_for_same_document() {
    let (mut engine, mut doc, id) = stale_engine();
    let ticket = engine.begin_recovery().unwrap();
    assert_eq!(ticket.document_id.as_deref(), Some("doc-a"));
    assert_eq!(ticket.anchor_ids, vec![id.clone()]);

    let report = engine.complete_recovery(ticket, &mut doc);
    assert!(!report.discarded);
    assert_eq!(report.recovered, vec![id]);
}

#[test]
fn test_ticket_discarded_after_document_switch() {
    let (mut engine, _doc_a, _id) = stale_engine();
    let ticket = engine.begin_recovery().unwrap();

    engine.open_document("doc-b").unwrap();
    let mut doc_b = TextDocument::new("hello from b");
    let report = engine.complete_recovery(ticket, &mut doc_b);

    assert!(report.discarded);
    assert!(report.recovered.is_empty());
    assert!(engine.anchors().is_empty());
    assert!(doc_b.take_mark_ops().is_empty());
    assert!(doc_b.marked_ranges().is_empty());
}

#[test]
fn test_ticket_discarded_after_reopening_same_document() {
    let (mut engine, mut doc, id) = stale_engine();
    let ticket = engine.begin_recovery().unwrap();

    engine.open_document("doc-b").unwrap();
    engine.open_document("doc-a").unwrap();
    let report = engine.complete_recovery(ticket, &mut doc);
    assert!(report.discarded);

    // The reloaded state re-queues its stale anchor
    assert_eq!(engine.pending(), &[id.clone()]);
    let fresh = engine.recover_pending(&mut doc);
    assert_eq!(fresh.recovered, vec![id]);
}

#[test]
fn test_ticket_discarded_after_clear() {
    let (mut engine, mut doc, _id) = stale_engine();
    let ticket = engine.begin_recovery().unwrap();
    engine.clear_all_tags(&mut doc);
    doc.take_mark_ops();

    let report = engine.complete_recovery(ticket, &mut doc);
    assert!(report.discarded);
    assert!(doc.take_mark_ops().is_empty());
}

#[test]
fn test_batch_is_bounded() {
    let config = AnchorConfig { max_anchors_per_pass: 2, ..AnchorConfig::default() };
    let mut engine = TagEngine::new(config);
    engine.open_document("doc-a").unwrap();
    let mut doc = TextDocument::new("one two three four");
    for (start, end) in [(0, 3), (4, 7), (8, 13), (14, 18)] {
        engine.add_tag(tag(), start, end, &mut doc).unwrap();
    }

    let change = ChangeSet::new(1).with(EditStep::replace(0, 18, "four three two one"));
    doc.apply_change(&change);
    engine.apply_change(&change, &doc);
    assert_eq!(engine.pending().len(), 4);

    let first = engine.recover_pending(&mut doc);
    assert_eq!(first.recovered.len(), 2);
    assert_eq!(engine.pending().len(), 2);
    let second = engine.recover_pending(&mut doc);
    assert_eq!(second.recovered.len(), 2);
    assert!(engine.pending().is_empty());
}
