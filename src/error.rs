//! Error types for TagCore
//!
//! Remapping and recovery never surface these; they report failure through
//! their return values. Errors are reserved for host-facing operations that
//! the caller asked for explicitly.

/// TagCore errors
#[derive(Debug, Clone, PartialEq)]
pub enum TagError {
    /// `start >= end` when creating an anchor
    InvalidSpan { start: usize, end: usize },
    /// Span end lies past the end of the document
    SpanOutOfBounds { end: usize, len: usize },
    AnchorNotFound(String),
    TagNotFound(String),
    /// Tag id already registered with a different scope
    ScopeConflict { tag_id: String, existing: String },
    /// All recovery strategies exhausted; the anchor stays stale
    RecoveryFailed(String),
    StateLoadFailed { document_id: String, reason: String },
    StateSaveFailed { document_id: String, reason: String },
    NoActiveDocument,
}

impl std::fmt::Display for TagError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagError::InvalidSpan { start, end } => {
                write!(f, "Invalid span: start {} must be before end {}", start, end)
            }
            TagError::SpanOutOfBounds { end, len } => {
                write!(f, "Span end {} exceeds document length {}", end, len)
            }
            TagError::AnchorNotFound(id) => write!(f, "Anchor not found: {}", id),
            TagError::TagNotFound(id) => write!(f, "Tag not found: {}", id),
            TagError::ScopeConflict { tag_id, existing } => {
                write!(f, "Tag {} is already registered as a {} tag", tag_id, existing)
            }
            TagError::RecoveryFailed(id) => write!(f, "Recovery failed for anchor {}", id),
            TagError::StateLoadFailed { document_id, reason } => {
                write!(f, "Failed to load tag state for {}: {}", document_id, reason)
            }
            TagError::StateSaveFailed { document_id, reason } => {
                write!(f, "Failed to save tag state for {}: {}", document_id, reason)
            }
            TagError::NoActiveDocument => write!(f, "No active document"),
        }
    }
}

impl std::error::Error for TagError {}
