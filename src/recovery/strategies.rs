//! Individual recovery strategies
//!
//! Each strategy takes the anchor's stored seed (content and context) and the
//! live document, and returns a candidate span. Offsets are chars.

use crate::config::AnchorConfig;
use crate::document::{DocumentView, Span};
use crate::similarity::similarity_chars;

/// A scored candidate location
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub span: Span,
    pub score: f64,
}

/// First occurrence of `needle` in `haystack`, as a char index
pub fn find_chars(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}

// =============================================================================
// Exact matching
// =============================================================================

/// Strategy 1: exact content inside the anchor's block
pub fn block_exact<D: DocumentView + ?Sized>(doc: &D, block_id: &str, content: &str) -> Option<Span> {
    let block = doc.block_span(block_id)?;
    exact_in(doc, block, content)
}

/// Strategy 2: exact content anywhere in the document
pub fn document_exact<D: DocumentView + ?Sized>(doc: &D, content: &str) -> Option<Span> {
    exact_in(doc, Span::new(0, doc.len()), content)
}

fn exact_in<D: DocumentView + ?Sized>(doc: &D, range: Span, content: &str) -> Option<Span> {
    let needle: Vec<char> = content.chars().collect();
    let haystack: Vec<char> = doc.text_between(range.start, range.end).chars().collect();
    let offset = find_chars(&haystack, &needle)?;
    let start = range.start + offset;
    Some(Span::new(start, start + needle.len()))
}

// =============================================================================
// Fuzzy matching
// =============================================================================

/// Strategy 3: before + content + after as one pattern
///
/// Both sides of the stored context must be non-empty; an anchor at the very
/// start or end of the document skips this strategy. Context is trimmed to
/// `context_match_window` chars on each side. At each
/// candidate start `i` inside a text node the compared chunk runs from
/// `i - before.len()` to `i + content.len() + after.len()`, clamped to the
/// node. The best score strictly above `context_threshold` wins; ties keep the
/// earliest position.
pub fn context_fuzzy<D: DocumentView + ?Sized>(
    doc: &D,
    content: &str,
    content_before: &str,
    content_after: &str,
    config: &AnchorConfig,
) -> Option<Candidate> {
    let content: Vec<char> = content.chars().collect();
    let before: Vec<char> = content_before.chars().collect();
    let after: Vec<char> = content_after.chars().collect();

    let window = config.context_match_window;
    let before = &before[before.len().saturating_sub(window)..];
    let after = &after[..after.len().min(window)];
    if content.is_empty() || before.is_empty() || after.is_empty() {
        return None;
    }

    let pattern: Vec<char> = before.iter().chain(content.iter()).chain(after.iter()).copied().collect();

    let mut best: Option<Candidate> = None;
    for node in doc.text_nodes() {
        let text: Vec<char> = node.text.chars().collect();
        if text.len() < content.len() {
            continue;
        }
        for i in 0..=(text.len() - content.len()) {
            let chunk_start = i.saturating_sub(before.len());
            let chunk_end = (i + content.len() + after.len()).min(text.len());
            let score = similarity_chars(&text[chunk_start..chunk_end], &pattern);
            if score > config.context_threshold && best.map_or(true, |b| score > b.score) {
                let start = node.pos + i;
                best = Some(Candidate { span: Span::new(start, start + content.len()), score });
            }
        }
    }
    best
}

/// Strategy 4: windowed similarity against the content alone
///
/// Window sizes cover `fuzzy_window_range(len)`. Candidates are visited by
/// position, then by size, so ties keep the earliest and then the shortest.
pub fn content_fuzzy<D: DocumentView + ?Sized>(
    doc: &D,
    content: &str,
    config: &AnchorConfig,
) -> Option<Candidate> {
    let content: Vec<char> = content.chars().collect();
    if content.is_empty() {
        return None;
    }

    let (min_size, max_size) = config.fuzzy_window_range(content.len());
    let mut best: Option<Candidate> = None;

    for node in doc.text_nodes() {
        let text: Vec<char> = node.text.chars().collect();
        for i in 0..text.len() {
            for size in min_size..=max_size {
                if i + size > text.len() {
                    break;
                }
                let score = similarity_chars(&text[i..i + size], &content);
                if config.accepts_fuzzy(content.len(), score) && best.map_or(true, |b| score > b.score) {
                    let start = node.pos + i;
                    best = Some(Candidate { span: Span::new(start, start + size), score });
                }
            }
        }
    }
    best
}

// =============================================================================
// Tests
// =============================================================================
