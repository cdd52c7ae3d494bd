//! Archival replay handler.

use std::sync::{Arc, OnceLock};

use crate::config::LayeredConfig;
use crate::handlers::HandlerRegistry;
use crate::query::QueryEngine;

/// Serves a collection from its archival index.
///
/// After assembly the handler knows the names of every sibling
/// collection, so a miss can point at collections that do hold the
/// requested URL.
#[derive(Debug)]
pub struct ReplayHandler {
    engine: Arc<QueryEngine>,
    config: LayeredConfig,
    siblings: OnceLock<Vec<String>>,
}

impl ReplayHandler {
    pub fn new(engine: Arc<QueryEngine>, config: LayeredConfig) -> Self {
        Self {
            engine,
            config,
            siblings: OnceLock::new(),
        }
    }

    pub fn engine(&self) -> &Arc<QueryEngine> {
        &self.engine
    }

    pub fn config(&self) -> &LayeredConfig {
        &self.config
    }

    /// Capture the full collection name list. Write-once; a second
    /// resolution pass over identical input is a no-op.
    pub fn resolve_refs(&self, registry: &HandlerRegistry) {
        let names = registry.names().map(str::to_string).collect();
        let _ = self.siblings.set(names);
    }

    /// Names of all collections in the router, empty before the
    /// resolution pass has run.
    pub fn siblings(&self) -> &[String] {
        self.siblings.get().map(Vec::as_slice).unwrap_or(&[])
    }
}
