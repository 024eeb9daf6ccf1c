//! Similarity Scorer: normalized Levenshtein similarity
//!
//! `similarity(a, b) = (max_len - levenshtein(a, b)) / max_len`, measured in
//! chars. Both empty scores 1.0; exactly one empty scores 0.0.

/// Levenshtein edit distance over char slices (two-row DP)
pub fn levenshtein(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Keep the shorter sequence on the inner loop
    let (outer, inner) = if a.len() >= b.len() { (a, b) } else { (b, a) };

    let mut prev: Vec<usize> = (0..=inner.len()).collect();
    let mut curr = vec![0usize; inner.len() + 1];

    for (i, oc) in outer.iter().enumerate() {
        curr[0] = i + 1;
        for (j, ic) in inner.iter().enumerate() {
            let cost = if oc == ic { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1) // deletion
                .min(curr[j] + 1) // insertion
                .min(prev[j] + cost); // substitution
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[inner.len()]
}

/// Similarity of two char slices in [0, 1]
pub fn similarity_chars(a: &[char], b: &[char]) -> f64 {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return 1.0,
        (true, false) | (false, true) => return 0.0,
        _ => {}
    }
    if a == b {
        return 1.0;
    }

    let max_len = a.len().max(b.len());
    let distance = levenshtein(a, b);
    (max_len - distance) as f64 / max_len as f64
}

/// Similarity of two strings in [0, 1]
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    similarity_chars(&a, &b)
}

// =============================================================================
// Tests
// =============================================================================
