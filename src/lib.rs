//! Web Archive Replay Gateway Library
//!
//! Bootstrap layer of a web-archive replay service: turns a
//! declarative YAML configuration (explicit values plus
//! filesystem-discovered collections) into an ordered, immutable
//! route table.
//!
//! ```text
//! passed config + embedded defaults
//!     → LayeredConfig
//!     → collections (declared, programmatic, discovered on disk)
//!     → handler factory (replay | live-web | pre-built)
//!     → ordered route list + cross-reference resolution
//!     → Router (archival | proxy-capable)
//!     → http transport
//! ```

pub mod collections;
pub mod config;
pub mod handlers;
pub mod http;
pub mod query;
pub mod routing;
pub mod views;

pub use config::{ConfigError, LayeredConfig};
pub use handlers::{Handler, HandlerRegistry};
pub use query::{CdxCapture, QueryEngine};
pub use routing::{create_cdx_router, create_router, create_router_with_handlers};
pub use routing::{Route, Router, RouterKind};
