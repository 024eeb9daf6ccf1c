//! TagCore: Edit-Resilient Tag Anchors
//!
//! A Rust/WASM implementation of the KittClouds tagging layer: tags applied to
//! spans of editor text survive insertions, deletions, block splits and undo,
//! and are relocated by exact or fuzzy matching when position mapping fails.
//!
//! # Architecture
//!
//! - `similarity.rs` - Normalized Levenshtein similarity
//! - `anchor/` - AnchorRecord, context capture, AnchorStore + BlockIndex
//! - `remap/` - ChangeSet position mapping and the Span Remapper
//! - `recovery/` - RecoveryResolver: block exact, document exact, context fuzzy, content fuzzy
//! - `registry.rs` - TagRegistry: document-scoped and inline tag definitions
//! - `persistence.rs` - PersistenceBridge over a host key-value store
//! - `search.rs` - Ranked tag search with previews
//! - `engine/` - TagEngine: host API, recovery queue, consistency sweep
//! - `wasm.rs` - TagCortex: JS bindings
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { TagCortex } from 'tagcore';
//!
//! await init();
//!
//! const store = new Map();
//! const cortex = new TagCortex(undefined, store);
//! cortex.openDocument('note-1');
//!
//! const doc = { blocks: [{ id: 'p1', text: 'hello world' }], marks: [] };
//! const { result: anchor, markOps } = cortex.addTag(
//!   { name: 'Greeting', color: '#F59E0B', scope: 'inline' }, 0, 5, doc
//! );
//!
//! // After an editor transaction
//! cortex.applyChange({ version: 1, steps: [{ type: 'insert', at: 0, text: 'XX ' }] }, nextDoc);
//!
//! // Later, once the document settles
//! const ticket = cortex.beginRecovery();
//! if (ticket) cortex.completeRecovery(ticket, nextDoc);
//! ```

#[macro_use]
mod console;

pub mod anchor;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod persistence;
pub mod recovery;
pub mod registry;
pub mod remap;
pub mod search;
pub mod similarity;
pub mod wasm;

#[cfg(test)]
mod tests;

// Public exports
pub use anchor::{AnchorRecord, AnchorStatus, AnchorStore, BlockIndex, StaleReason};
pub use config::AnchorConfig;
pub use document::{DocumentEditor, DocumentView, MarkAttrs, MarkOp, Span, TextDocument};
pub use engine::{LoadOutcome, RecoveryReport, RecoveryTicket, SweepReport, TagEngine, TagEvent, TaggedAnchor};
pub use error::TagError;
pub use persistence::{DocumentTagState, MemoryStore, PersistenceBridge, TagStateStore};
pub use recovery::{RecoveryMatch, RecoveryResolver, RecoveryStrategy};
pub use registry::{TagDefinition, TagRegistry, TagScope};
pub use remap::{remap, ChangeSet, EditStep};
pub use search::{SearchFilters, TagSearchResult};
pub use similarity::similarity;
pub use wasm::TagCortex;

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("tagcore v{}", env!("CARGO_PKG_VERSION"))
}
