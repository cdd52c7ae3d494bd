//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! built-in defaults (embedded YAML)
//!     + passed config (file or programmatic mapping)
//!     → LayeredConfig (ordered fallback chain)
//!     + per-collection overlay (normalized collection value)
//!     → LayeredConfig per route
//!     → consumed by discovery, handler factory, route assembly
//! ```
//!
//! # Design Decisions
//! - Config values stay dynamic (`serde_yaml::Value`): the collection
//!   table is heterogeneous (string | list | mapping) by contract
//! - Layers are immutable once loaded; precedence is expressed by
//!   lookup order, never by merging
//! - Fatal errors carry the collection name and offending key

pub mod error;
pub mod layers;
pub mod loader;

pub use error::{ConfigError, Result};
pub use layers::{Layer, LayeredConfig};
pub use loader::{default_config, load_yaml_config};
