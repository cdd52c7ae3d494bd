//! Route definition and matching.
//!
//! # Responsibilities
//! - Pair a route name (URL path prefix) with its handler and the
//!   config used to build it
//! - Match request paths by prefix or exact name (`route_class`)
//!
//! # Design Decisions
//! - A prefix route matches only on a segment boundary: `a` captures
//!   `a` and `a/...` but never `a-cdx/...`
//! - Order is owned by the assembler; a route knows nothing about its
//!   position

use std::sync::Arc;

use crate::config::{ConfigError, LayeredConfig, Result};
use crate::handlers::Handler;

/// Path-matching behavior, keyed by the `route_class` config tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouteClass {
    /// Match the name itself and anything below `name/`.
    #[default]
    Prefix,
    /// Match the name only, no subpaths.
    Exact,
}

impl RouteClass {
    pub fn from_tag(tag: Option<&str>) -> Result<Self> {
        match tag {
            None | Some("prefix") => Ok(RouteClass::Prefix),
            Some("exact") => Ok(RouteClass::Exact),
            Some(other) => Err(ConfigError::UnknownClass {
                kind: "route_class",
                tag: other.to_string(),
            }),
        }
    }
}

/// Request-parsing variant, selected globally by `enable_memento`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestKind {
    #[default]
    Plain,
    /// Honor RFC 7089 datetime negotiation headers.
    Memento,
}

/// A name → handler binding with positional priority in dispatch.
#[derive(Debug, Clone)]
pub struct Route {
    name: String,
    handler: Arc<Handler>,
    config: LayeredConfig,
    class: RouteClass,
    request_kind: RequestKind,
}

impl Route {
    pub fn new(
        name: String,
        handler: Arc<Handler>,
        config: LayeredConfig,
        class: RouteClass,
        request_kind: RequestKind,
    ) -> Self {
        Self {
            name,
            handler,
            config,
            class,
            request_kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handler(&self) -> &Arc<Handler> {
        &self.handler
    }

    pub fn config(&self) -> &LayeredConfig {
        &self.config
    }

    pub fn class(&self) -> RouteClass {
        self.class
    }

    pub fn request_kind(&self) -> RequestKind {
        self.request_kind
    }

    /// Match `path` (no leading slash) against this route's name.
    /// Returns the remainder below the name on a hit.
    pub fn match_path<'a>(&self, path: &'a str) -> Option<&'a str> {
        if path == self.name {
            return Some("");
        }
        match self.class {
            RouteClass::Prefix => path
                .strip_prefix(self.name.as_str())
                .and_then(|rest| rest.strip_prefix('/')),
            RouteClass::Exact => None,
        }
    }
}
