//! CDX API handler.

use std::sync::Arc;

use crate::query::{CdxCapture, QueryEngine, QueryError};

/// Exposes a collection's query engine over the CDX API. Shares the
/// engine with the collection's replay handler.
#[derive(Debug)]
pub struct CdxApiHandler {
    engine: Arc<QueryEngine>,
}

impl CdxApiHandler {
    pub fn new(engine: Arc<QueryEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<QueryEngine> {
        &self.engine
    }

    pub async fn lookup(&self, url: &str, limit: usize) -> Result<Vec<CdxCapture>, QueryError> {
        self.engine.lookup(url, limit).await
    }
}
