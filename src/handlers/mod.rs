//! Request handler families.
//!
//! # Data Flow
//! ```text
//! normalized collection config
//!     → factory.rs (decision: pre-built | live-web | replay+engine)
//!     → Handler variant, one per collection
//!     → owned by a Route, shared with the HandlerRegistry
//!     → resolve_refs pass (after every handler exists)
//!     → frozen; read-only during request serving
//! ```
//!
//! # Design Decisions
//! - Handlers are a closed set of variants, not trait objects: the
//!   assembly core matches on the family, the transport maps each
//!   family to a response shape
//! - The cross-reference capability is a method on the enum with a
//!   no-op default; no attribute probing
//! - A handler is constructed exactly once; reference resolution
//!   fills a write-once cell before the router is returned

pub mod cdx;
pub mod debug;
pub mod factory;
pub mod live;
pub mod replay;
pub mod statics;

use std::sync::Arc;

pub use cdx::CdxApiHandler;
pub use debug::{EchoEnvHandler, EchoReqHandler};
pub use live::LiveHandler;
pub use replay::ReplayHandler;
pub use statics::StaticHandler;

/// The closed set of handler families a route can own.
#[derive(Debug)]
pub enum Handler {
    /// Archival replay backed by a query engine.
    Replay(ReplayHandler),
    /// Live-web passthrough fetch.
    Live(LiveHandler),
    /// CDX API sibling of a replay collection.
    CdxApi(CdxApiHandler),
    /// Fixed filesystem assets.
    Static(StaticHandler),
    /// Environment echo (debug).
    EchoEnv(EchoEnvHandler),
    /// Request echo (debug).
    EchoReq(EchoReqHandler),
}

impl Handler {
    /// Short family tag for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Handler::Replay(_) => "replay",
            Handler::Live(_) => "live",
            Handler::CdxApi(_) => "cdx-api",
            Handler::Static(_) => "static",
            Handler::EchoEnv(_) => "echo-env",
            Handler::EchoReq(_) => "echo-req",
        }
    }

    /// Resolve references to sibling handlers by name. Runs once,
    /// after every handler exists; a no-op for families without
    /// cross-references.
    pub fn resolve_refs(&self, registry: &HandlerRegistry) {
        if let Handler::Replay(handler) = self {
            handler.resolve_refs(registry);
        }
    }
}

/// Name → handler map over all collections, built once every handler
/// exists. Consumed only by the reference-resolution pass, immutable
/// afterwards.
#[derive(Debug, Default)]
pub struct HandlerRegistry {
    entries: Vec<(String, Arc<Handler>)>,
}

impl HandlerRegistry {
    pub fn new(entries: Vec<(String, Arc<Handler>)>) -> Self {
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Handler>> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, handler)| handler)
    }

    /// Collection names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
