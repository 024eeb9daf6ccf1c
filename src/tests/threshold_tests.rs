use crate::anchor::{AnchorStatus, AnchorStore, StaleReason};
use crate::config::AnchorConfig;
use crate::document::{Span, TextDocument};
use crate::recovery::{RecoveryResolver, RecoveryStrategy};
use crate::similarity::similarity;

/// `n` distinct CJK code points starting at `base`
fn distinct(base: u32, n: u32) -> String {
    (0..n).filter_map(|i| char::from_u32(base + i)).collect()
}

fn stale_anchor(store: &mut AnchorStore, content: &str) -> String {
    let len = content.chars().count();
    let record = store.create("t1", Span::new(0, len), content, "", "", "root").unwrap();
    store
        .set_status(&record.id, AnchorStatus::Stale(StaleReason::Unmapped))
        .unwrap();
    record.id
}

/// Content of 100 distinct chars, and a candidate sharing its first `keep`
fn fixture(keep: u32) -> (String, String) {
    let content = distinct(0x4E00, 100);
    let head: String = content.chars().take(keep as usize).collect();
    let candidate = format!("{}{}", head, distinct(0x6000, 100 - keep));
    (content, candidate)
}

// =============================================================================
// Content-only fuzzy threshold is strict
// =============================================================================

#[test]
fn test_similarity_fixture_values() {
    let (content, candidate) = fixture(60);
    assert!((similarity(&content, &candidate) - 0.60).abs() < 1e-9);
    let (content, candidate) = fixture(61);
    assert!((similarity(&content, &candidate) - 0.61).abs() < 1e-9);
}

#[test]
fn test_exactly_threshold_is_rejected() {
    let (content, candidate) = fixture(60);
    let doc = TextDocument::new(&candidate);
    let mut store = AnchorStore::new();
    let id = stale_anchor(&mut store, &content);

    let resolver = RecoveryResolver::new(AnchorConfig::default());
    assert!(resolver.recover(store.get(&id).unwrap(), &doc).is_none());
}

#[test]
fn test_just_above_threshold_is_accepted() {
    let (content, candidate) = fixture(61);
    let doc = TextDocument::new(&candidate);
    let mut store = AnchorStore::new();
    let id = stale_anchor(&mut store, &content);

    let resolver = RecoveryResolver::new(AnchorConfig::default());
    let found = resolver.recover(store.get(&id).unwrap(), &doc).unwrap();
    assert_eq!(found.strategy, RecoveryStrategy::ContentFuzzy);
    assert!((found.score - 0.61).abs() < 1e-9);
}

#[test]
fn test_short_content_uses_higher_threshold() {
    let mut store = AnchorStore::new();
    let id = stale_anchor(&mut store, "hello");
    let resolver = RecoveryResolver::new(AnchorConfig::default());

    // 0.8 similarity is enough for long content but not for short
    let doc = TextDocument::new("helpo");
    assert!(resolver.recover(store.get(&id).unwrap(), &doc).is_none());

    let lenient = RecoveryResolver::new(AnchorConfig::lenient());
    let found = lenient.recover(store.get(&id).unwrap(), &doc).unwrap();
    assert_eq!(found.span, Span::new(0, 5));
}

#[test]
fn test_thresholds_are_configurable() {
    let (content, candidate) = fixture(70);
    let doc = TextDocument::new(&candidate);
    let mut store = AnchorStore::new();
    let id = stale_anchor(&mut store, &content);

    assert!(RecoveryResolver::new(AnchorConfig::default())
        .recover(store.get(&id).unwrap(), &doc)
        .is_some());
    assert!(RecoveryResolver::new(AnchorConfig::strict())
        .recover(store.get(&id).unwrap(), &doc)
        .is_none());
}
