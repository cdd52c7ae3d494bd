//! Collection sources and filesystem discovery.
//!
//! # Data Flow
//! ```text
//! config `collections` table (name → string | list | mapping)
//!     + programmatic pre-built handlers
//!     + discover.rs (scan of `collections_root`)
//!     → ordered (name, CollectionSource) list
//!     → normalize.rs (shorthand → {index_paths: ...} overlay)
//!     → LayeredConfig per collection, consumed by the factory
//! ```
//!
//! # Design Decisions
//! - Discovery returns its results (collections and static routes) as
//!   values; the assembler merges them, so no shared state is mutated
//!   from inside the scan
//! - Directory entries are processed in lexicographic order so route
//!   order is stable across filesystems

pub mod discover;
pub mod normalize;

use std::sync::Arc;

use serde_yaml::Value;

use crate::handlers::Handler;

/// What a collection name maps to before construction: a raw config
/// value, or a handler built by the caller. Exactly one of the two.
#[derive(Debug, Clone)]
pub enum CollectionSource {
    /// Raw YAML value: path string, list of paths, or mapping.
    Raw(Value),
    /// Pre-built handler, used as-is with no further configuration
    /// resolution.
    Handler(Arc<Handler>),
}
