//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use serde_yaml::{Mapping, Value};

use crate::config::error::{ConfigError, Result};

/// Built-in defaults, embedded at compile time. Always the
/// lowest-priority layer of an assembled configuration.
const DEFAULT_CONFIG: &str = include_str!("default_config.yaml");

/// Parse the embedded default configuration. Parsed once, shared
/// afterwards.
pub fn default_config() -> &'static Mapping {
    static DEFAULTS: OnceLock<Mapping> = OnceLock::new();
    DEFAULTS.get_or_init(|| {
        serde_yaml::from_str(DEFAULT_CONFIG)
            .expect("embedded default_config.yaml must be a valid mapping")
    })
}

/// Load a YAML config file and require it to be a mapping.
pub fn load_yaml_config(path: &Path) -> Result<Mapping> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let value: Value = serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;

    match value {
        Value::Mapping(mapping) => Ok(mapping),
        // an empty file parses as null; treat it as an empty mapping
        Value::Null => Ok(Mapping::new()),
        _ => Err(ConfigError::NotAMapping {
            path: path.to_path_buf(),
        }),
    }
}
