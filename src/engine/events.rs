//! Engine events drained by the host

use serde::{Deserialize, Serialize};

use crate::document::Span;
use crate::recovery::RecoveryStrategy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TagEvent {
    TagApplied { anchor_id: String, tag_id: String, span: Span },
    TagRemoved { anchor_id: String, tag_id: String },
    DocumentTagsUpdated { tag_ids: Vec<String> },
    AnchorRecovered { anchor_id: String, span: Span, strategy: RecoveryStrategy },
    RecoveryFailed { anchor_id: String, attempts: u32 },
    AnchorsInvalidated { anchor_ids: Vec<String> },
}
