//! Configuration error taxonomy.
//!
//! # Responsibilities
//! - Fatal startup errors: missing required collection paths,
//!   malformed config files, unknown class tags, engine init failures
//! - Carry enough context (collection name, offending key) for
//!   operator diagnosis
//!
//! # Design Decisions
//! - One enum for the whole assembly pipeline; no partial router is
//!   ever returned alongside an error
//! - Non-fatal conditions (missing optional path, non-directory scan
//!   entry) are logged or skipped, never represented here

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort router assembly.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file could not be read.
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A config file could not be parsed as YAML.
    #[error("failed to parse {}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A config document was valid YAML but not a mapping.
    #[error("config file {} is not a mapping", path.display())]
    NotAMapping { path: PathBuf },

    /// No relative segment is configured in the `paths` table for a
    /// required directory key.
    #[error("collection '{collection}': no '{key}' segment configured under 'paths'")]
    MissingPathKey {
        collection: String,
        key: &'static str,
    },

    /// A required collection directory does not exist on disk.
    #[error("collection '{collection}': directory {} does not exist for '{key}'", dir.display())]
    MissingDir {
        collection: String,
        key: &'static str,
        dir: PathBuf,
    },

    /// A collection value was neither a path, a list of paths, nor a
    /// mapping.
    #[error("collection '{collection}': value must be a path, a list of paths, or a mapping")]
    InvalidCollection { collection: String },

    /// A configuration value had the wrong type.
    #[error("'{key}' must be {expected}")]
    InvalidValue {
        key: String,
        expected: &'static str,
    },

    /// An unrecognized class tag was supplied for a pluggable
    /// component.
    #[error("unknown {kind} '{tag}'")]
    UnknownClass { kind: &'static str, tag: String },

    /// A configured index location is missing or unreadable.
    #[error("index path {path} is not readable")]
    UnreadableIndex { path: String },

    /// A configured rules file does not exist.
    #[error("rules file {} does not exist", path.display())]
    MissingRulesFile { path: PathBuf },

    /// A configured template could not be loaded.
    #[error("failed to load template {}", path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Wraps any of the above with the collection it occurred in.
    #[error("collection '{collection}': {source}")]
    Collection {
        collection: String,
        #[source]
        source: Box<ConfigError>,
    },
}

impl ConfigError {
    /// Attach a collection name to an error raised below the
    /// per-collection level. Errors that already name their collection
    /// are passed through untouched.
    pub fn for_collection(collection: &str, err: ConfigError) -> ConfigError {
        match err {
            e @ (ConfigError::MissingPathKey { .. }
            | ConfigError::MissingDir { .. }
            | ConfigError::InvalidCollection { .. }
            | ConfigError::Collection { .. }) => e,
            other => ConfigError::Collection {
                collection: collection.to_string(),
                source: Box::new(other),
            },
        }
    }
}

/// Result alias for assembly operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
