use crate::config::AnchorConfig;
use crate::document::{DocumentView, Span, TextDocument};
use crate::engine::{TagEngine, TagEvent};
use crate::recovery::RecoveryStrategy;
use crate::registry::TagDefinition;
use crate::remap::{ChangeSet, EditStep};

fn engine() -> TagEngine {
    let mut engine = TagEngine::new(AnchorConfig::default());
    engine.load_state("note-1");
    engine
}

fn tag() -> TagDefinition {
    TagDefinition::inline("Review", "#10B981")
}

/// Apply `change` to the document and let the engine remap
fn edit(engine: &mut TagEngine, doc: &mut TextDocument, change: &ChangeSet) {
    doc.apply_change(change);
    engine.apply_change(change, doc);
}

// =============================================================================
// Round trip and pure remapping
// =============================================================================

#[test]
fn test_unchanged_document_round_trip() {
    let mut engine = engine();
    let mut doc = TextDocument::new("keep this phrase intact");
    let record = engine.add_tag(tag(), 5, 16, &mut doc).unwrap();
    assert_eq!(record.content, "this phrase");

    assert_eq!(engine.locate(&record.id, &mut doc).unwrap(), Span::new(5, 16));
    let stored = engine.anchor(&record.id).unwrap();
    assert_eq!(stored.content, "this phrase");
    assert!(stored.is_resolved());
}

#[test]
fn test_constant_shift_without_recovery() {
    let mut engine = engine();
    let mut doc = TextDocument::new("alpha beta gamma");
    let record = engine.add_tag(tag(), 6, 10, &mut doc).unwrap();

    let change = ChangeSet::new(1).with(EditStep::insert(2, "1234"));
    doc.apply_change(&change);
    let summary = engine.apply_change(&change, &doc);

    assert_eq!(summary.updated, vec![record.id.clone()]);
    assert!(summary.invalidated.is_empty());
    assert!(engine.pending().is_empty());
    let moved = engine.anchor(&record.id).unwrap();
    assert_eq!(moved.span, Span::new(10, 14));
    assert_eq!(moved.content, "beta");
}

// =============================================================================
// Scenario A: insert before the anchor
// =============================================================================

#[test]
fn test_scenario_a_insert_before() {
    let mut engine = engine();
    let mut doc = TextDocument::new("hello world");
    let record = engine.add_tag(tag(), 0, 5, &mut doc).unwrap();

    edit(&mut engine, &mut doc, &ChangeSet::new(1).with(EditStep::insert(0, "XX ")));

    assert_eq!(doc.text(), "XX hello world");
    let anchor = engine.anchor(&record.id).unwrap();
    assert_eq!(anchor.span, Span::new(3, 8));
    assert_eq!(doc.text_between(3, 8), "hello");
    assert!(anchor.is_resolved());
}

// =============================================================================
// Scenario B: delete and re-append
// =============================================================================

#[test]
fn test_scenario_b_moved_text_is_recovered() {
    let mut engine = engine();
    let mut doc = TextDocument::new("hello world");
    let record = engine.add_tag(tag(), 0, 5, &mut doc).unwrap();
    engine.drain_events();

    let change = ChangeSet::new(1)
        .with(EditStep::delete(0, 6))
        .with(EditStep::insert(5, " hello"));
    edit(&mut engine, &mut doc, &change);
    assert_eq!(doc.text(), "world hello");
    assert!(engine.anchor(&record.id).unwrap().is_stale());

    let report = engine.recover_pending(&mut doc);
    assert_eq!(report.recovered, vec![record.id.clone()]);
    assert_eq!(engine.anchor(&record.id).unwrap().span, Span::new(6, 11));

    let events = engine.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        TagEvent::AnchorRecovered { strategy: RecoveryStrategy::DocumentExact, .. }
    )));
}

#[test]
fn test_same_block_reinsert_uses_block_scope() {
    let mut engine = engine();
    let mut doc = TextDocument::with_blocks(&[("p1", "beta intro"), ("p2", "alpha beta gamma")]);
    let record = engine.add_tag(tag(), 17, 21, &mut doc).unwrap();
    assert_eq!(record.block_id, "p2");

    // Move "beta" to the end of p2
    let change = ChangeSet::new(1)
        .with(EditStep::delete(17, 22))
        .with(EditStep::insert(22, " beta"));
    edit(&mut engine, &mut doc, &change);
    assert_eq!(doc.text(), "beta intro\nalpha gamma beta");

    let found = engine.recover_anchor(&record.id, &mut doc).unwrap();
    assert_eq!(found.strategy, RecoveryStrategy::BlockExact);
    assert_eq!(found.span, Span::new(23, 27));
}

// =============================================================================
// Scenario C: context recovery after rewording
// =============================================================================

#[test]
fn test_scenario_c_context_window_match() {
    let mut engine = engine();
    let mut doc = TextDocument::new("This is an Important note to remember. Other text.");
    let record = engine.add_tag(tag(), 11, 25, &mut doc).unwrap();
    assert_eq!(record.content, "Important note");

    let rewritten = "Intro paragraph added here. This is an Important memo to remember.";
    let change = ChangeSet::new(1).with(EditStep::replace(0, doc.len(), rewritten));
    edit(&mut engine, &mut doc, &change);

    let found = engine.recover_anchor(&record.id, &mut doc).unwrap();
    assert_eq!(found.strategy, RecoveryStrategy::ContextFuzzy);
    assert!(found.score > 0.6);
    assert_eq!(found.span, Span::new(39, 53));

    let anchor = engine.anchor(&record.id).unwrap();
    assert_eq!(anchor.content, "Important memo");
    assert!(anchor.is_resolved());
}

// =============================================================================
// Scenario D: duplicate content resolves to the first occurrence
// =============================================================================

#[test]
fn test_scenario_d_first_occurrence_wins() {
    let mut engine = engine();
    let mut doc = TextDocument::with_blocks(&[("p1", "TODO first, TODO second")]);
    let first = engine.add_tag(tag(), 0, 4, &mut doc).unwrap();
    let second = engine.add_tag(tag(), 12, 16, &mut doc).unwrap();

    let change = ChangeSet::new(1).with(EditStep::replace(0, 23, "Now: TODO one and TODO two"));
    edit(&mut engine, &mut doc, &change);
    assert_eq!(engine.pending().len(), 2);

    for id in [&first.id, &second.id] {
        let found = engine.recover_anchor(id, &mut doc).unwrap();
        assert_eq!(found.strategy, RecoveryStrategy::BlockExact);
        assert_eq!(found.span, Span::new(5, 9), "first TODO by document order");
    }
}

// =============================================================================
// Idempotence
// =============================================================================

#[test]
fn test_replayed_change_does_not_double_shift() {
    let mut engine = engine();
    let mut doc = TextDocument::new("hello world");
    let record = engine.add_tag(tag(), 6, 11, &mut doc).unwrap();

    let change = ChangeSet::new(1).with(EditStep::insert(0, "XX "));
    doc.apply_change(&change);
    engine.apply_change(&change, &doc);
    let replay = engine.apply_change(&change, &doc);

    assert_eq!(replay.skipped, 1);
    assert_eq!(engine.anchor(&record.id).unwrap().span, Span::new(9, 14));
}

#[test]
fn test_undo_after_typo_resolves_again() {
    let mut engine = engine();
    let mut doc = TextDocument::new("hello world");
    let record = engine.add_tag(tag(), 0, 5, &mut doc).unwrap();

    edit(&mut engine, &mut doc, &ChangeSet::new(1).with(EditStep::replace(1, 2, "a")));
    assert_eq!(engine.pending(), &[record.id.clone()]);

    edit(&mut engine, &mut doc, &ChangeSet::new(2).with(EditStep::replace(1, 2, "e")));
    assert!(engine.pending().is_empty());
    assert!(engine.anchor(&record.id).unwrap().is_resolved());
}
