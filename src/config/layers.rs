//! Layered configuration lookup.
//!
//! # Responsibilities
//! - Compose N immutable config mappings into one fallback chain
//! - Resolve a key to the first present, non-null value
//! - Derive new chains by overlaying a higher-priority layer
//!
//! # Design Decisions
//! - Layers are `Arc`-shared and never merged or mutated; overlaying
//!   clones only the layer vector, not the mappings
//! - Null is treated the same as absent, so a layer can't mask a
//!   lower layer with `key: ~`
//! - This is the sole precedence mechanism in the system: explicit
//!   overrides > passed config > built-in defaults

use std::sync::Arc;

use serde_yaml::{Mapping, Value};

/// One immutable configuration layer.
pub type Layer = Arc<Mapping>;

/// An ordered fallback chain of configuration layers.
///
/// Lookup walks layers in construction order and returns the first
/// non-null value found.
#[derive(Debug, Clone, Default)]
pub struct LayeredConfig {
    layers: Vec<Layer>,
}

impl LayeredConfig {
    /// Build a chain from highest to lowest priority.
    pub fn new(layers: Vec<Layer>) -> Self {
        Self { layers }
    }

    /// Return a new chain with `overlay` as its highest-priority
    /// layer. Existing layers are shared, not copied.
    pub fn with_overlay(&self, overlay: Mapping) -> Self {
        let mut layers = Vec::with_capacity(self.layers.len() + 1);
        layers.push(Arc::new(overlay));
        layers.extend(self.layers.iter().cloned());
        Self { layers }
    }

    /// First present, non-null value for `key`, in layer priority
    /// order.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.layers
            .iter()
            .filter_map(|layer| layer.get(key))
            .find(|value| !value.is_null())
    }

    /// String value for `key`, if any layer provides one.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Boolean value for `key`, else `default`.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    /// Port-sized integer value for `key`, else `default`.
    pub fn get_u16(&self, key: &str, default: u16) -> u16 {
        self.get(key)
            .and_then(Value::as_u64)
            .and_then(|n| u16::try_from(n).ok())
            .unwrap_or(default)
    }

    /// Nested mapping value for `key`, if any layer provides one.
    pub fn get_mapping(&self, key: &str) -> Option<&Mapping> {
        self.get(key).and_then(Value::as_mapping)
    }
}
