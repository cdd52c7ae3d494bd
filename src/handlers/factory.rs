//! Collection handler construction.
//!
//! # Responsibilities
//! - Decide the handler family for a normalized collection config:
//!   live-web passthrough (`$liveweb` sentinel) or archival replay
//!   backed by a query engine (pre-built handlers bypass this module
//!   entirely)
//! - Resolve pluggable class tags (`wb_handler_class`, `server_cls`)
//!   through constructor registries
//! - Derive CDX API sibling suffixes from `enable_cdx_api`
//!
//! # Design Decisions
//! - Engine construction failures are startup-fatal and name the
//!   collection; they are not discovery-time skips
//! - Exactly one construction per collection: the decision order is
//!   fixed and the first match wins

use std::sync::Arc;

use serde_yaml::Value;

use crate::config::{ConfigError, LayeredConfig, Result};
use crate::handlers::{Handler, LiveHandler, ReplayHandler};
use crate::query::{QueryEngine, ServerClass};
use crate::views::TemplateEnv;

/// `index_paths` sentinel selecting the live-web family.
pub const LIVEWEB_SENTINEL: &str = "$liveweb";

/// Constructor signature for replay-family handlers, keyed by the
/// `wb_handler_class` tag.
type ReplayCtor = fn(Arc<QueryEngine>, LayeredConfig) -> Handler;

fn replay_ctor(tag: Option<&str>) -> Result<ReplayCtor> {
    match tag.unwrap_or("replay") {
        "replay" => Ok(|engine, config| Handler::Replay(ReplayHandler::new(engine, config))),
        other => Err(ConfigError::UnknownClass {
            kind: "wb_handler_class",
            tag: other.to_string(),
        }),
    }
}

/// A constructed collection: the handler plus, for indexed
/// collections, the query engine its CDX siblings share.
#[derive(Debug)]
pub struct BuiltCollection {
    pub handler: Arc<Handler>,
    pub engine: Option<Arc<QueryEngine>>,
}

/// Build the query engine for one collection from its normalized
/// config.
pub fn init_query_engine(
    name: &str,
    route_config: &LayeredConfig,
    env: &TemplateEnv,
) -> Result<Arc<QueryEngine>> {
    let rules_file = route_config.get_str("domain_specific_rules");

    let html_view = env
        .create_template(route_config.get_str("query_html"), "Captures Page")
        .map_err(|e| ConfigError::for_collection(name, e))?;

    let server = ServerClass::from_tag(route_config.get_str("server_cls"))
        .map_err(|e| ConfigError::for_collection(name, e))?;

    let engine = QueryEngine::from_config(route_config, rules_file, html_view, server)
        .map_err(|e| ConfigError::for_collection(name, e))?;

    Ok(Arc::new(engine))
}

/// Decide and construct the handler for one collection.
pub fn build_collection_handler(
    name: &str,
    route_config: &LayeredConfig,
    env: &TemplateEnv,
) -> Result<BuiltCollection> {
    if route_config.get_str("index_paths") == Some(LIVEWEB_SENTINEL) {
        return Ok(BuiltCollection {
            handler: Arc::new(Handler::Live(LiveHandler::new(route_config.clone()))),
            engine: None,
        });
    }

    let engine = init_query_engine(name, route_config, env)?;

    let ctor = replay_ctor(route_config.get_str("wb_handler_class"))
        .map_err(|e| ConfigError::for_collection(name, e))?;

    Ok(BuiltCollection {
        handler: Arc::new(ctor(engine.clone(), route_config.clone())),
        engine: Some(engine),
    })
}

/// Expand `enable_cdx_api` into route-name suffixes: boolean `true`
/// means `-cdx`, a string is used verbatim, a list yields one sibling
/// per entry. `default_enabled` governs the absent case (the CDX-only
/// assembly defaults to on).
pub fn cdx_suffixes(value: Option<&Value>, default_enabled: bool) -> Result<Vec<String>> {
    match value {
        None => Ok(if default_enabled {
            vec!["-cdx".to_string()]
        } else {
            Vec::new()
        }),
        Some(Value::Bool(true)) => Ok(vec!["-cdx".to_string()]),
        Some(Value::Bool(false)) => Ok(Vec::new()),
        Some(Value::String(suffix)) => Ok(vec![suffix.clone()]),
        Some(Value::Sequence(suffixes)) => suffixes
            .iter()
            .map(|entry| {
                entry
                    .as_str()
                    .map(str::to_string)
                    .ok_or(ConfigError::InvalidValue {
                        key: "enable_cdx_api".to_string(),
                        expected: "a bool, suffix string, or list of suffixes",
                    })
            })
            .collect(),
        Some(_) => Err(ConfigError::InvalidValue {
            key: "enable_cdx_api".to_string(),
            expected: "a bool, suffix string, or list of suffixes",
        }),
    }
}
