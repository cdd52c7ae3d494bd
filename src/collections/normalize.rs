//! Collection value normalization.

use serde_yaml::{Mapping, Value};

use crate::config::{ConfigError, LayeredConfig, Result};

/// Normalize a raw collection value into a per-route configuration
/// chain. A path string or list of paths is shorthand for
/// `{index_paths: value}`; a mapping passes through unchanged as the
/// top-priority layer over the governing config.
pub fn route_config(name: &str, value: &Value, config: &LayeredConfig) -> Result<LayeredConfig> {
    let overlay = match value {
        Value::String(_) | Value::Sequence(_) => {
            let mut mapping = Mapping::new();
            mapping.insert("index_paths".into(), value.clone());
            mapping
        }
        Value::Mapping(mapping) => mapping.clone(),
        _ => {
            return Err(ConfigError::InvalidCollection {
                collection: name.to_string(),
            })
        }
    };

    Ok(config.with_overlay(overlay))
}
