//! Route-list assembly.
//!
//! # Responsibilities
//! - Merge explicit, programmatic, and discovered collections into
//!   one ordered table
//! - Build one route per collection, CDX siblings immediately after
//!   their collection, then debug routes, then static routes
//! - Run the reference-resolution pass once every handler exists
//!
//! # Design Decisions
//! - Route order is match priority; within a step, iteration order is
//!   insertion order of the source mapping
//! - Assembly either returns a complete router or an error, never a
//!   partial one
//! - Re-running assembly on identical inputs yields an equal route
//!   list (no hidden state)

use std::sync::Arc;

use serde_yaml::{Mapping, Value};

use crate::collections::discover::scan_collections;
use crate::collections::normalize::route_config;
use crate::collections::CollectionSource;
use crate::config::{default_config, ConfigError, LayeredConfig, Result};
use crate::handlers::factory::{build_collection_handler, cdx_suffixes, init_query_engine};
use crate::handlers::{
    CdxApiHandler, EchoEnvHandler, EchoReqHandler, Handler, HandlerRegistry, StaticHandler,
};
use crate::routing::route::{RequestKind, Route, RouteClass};
use crate::routing::router::{build_router, Router};
use crate::views::TemplateEnv;

/// Used when neither the passed config nor the defaults carry a port.
const FALLBACK_PORT: u16 = 8080;

/// Assemble the full replay router from a passed configuration
/// mapping layered over the built-in defaults.
pub fn create_router(passed: Mapping) -> Result<Router> {
    create_router_with_handlers(passed, Vec::new())
}

/// Like [`create_router`], with pre-built handlers merged into the
/// collection table. A pre-built handler replaces a same-name config
/// entry in place.
pub fn create_router_with_handlers(
    passed: Mapping,
    prebuilt: Vec<(String, Arc<Handler>)>,
) -> Result<Router> {
    let config = base_config(passed);
    let port = config.get_u16("port", FALLBACK_PORT);

    let mut collections = declared_collections(&config)?;
    for (name, handler) in prebuilt {
        upsert(&mut collections, name, CollectionSource::Handler(handler));
    }

    let discovered = scan_collections(&config)?;
    for (name, mapping) in discovered.collections {
        upsert(
            &mut collections,
            name,
            CollectionSource::Raw(Value::Mapping(mapping)),
        );
    }

    let mut static_routes = declared_static_routes(&config)?;
    for (name, path) in discovered.static_routes {
        upsert(&mut static_routes, name, path);
    }

    let template_env = TemplateEnv::new(config.get_mapping("template_globals"));

    let request_kind = if config.get_bool("enable_memento", false) {
        RequestKind::Memento
    } else {
        RequestKind::Plain
    };

    let mut routes: Vec<Route> = Vec::new();
    let mut registry_entries: Vec<(String, Arc<Handler>)> = Vec::new();

    for (name, source) in collections {
        match source {
            CollectionSource::Handler(handler) => {
                registry_entries.push((name.clone(), handler.clone()));
                routes.push(Route::new(
                    name,
                    handler,
                    config.clone(),
                    RouteClass::Prefix,
                    request_kind,
                ));
            }
            CollectionSource::Raw(value) => {
                let route_cfg = route_config(&name, &value, &config)?;
                let built = build_collection_handler(&name, &route_cfg, &template_env)?;

                tracing::debug!(collection = %name, kind = built.handler.kind(), "adding collection");

                let route_class = RouteClass::from_tag(route_cfg.get_str("route_class"))
                    .map_err(|e| ConfigError::for_collection(&name, e))?;

                registry_entries.push((name.clone(), built.handler.clone()));
                routes.push(Route::new(
                    name.clone(),
                    built.handler.clone(),
                    route_cfg.clone(),
                    route_class,
                    request_kind,
                ));

                // CDX siblings directly after their collection
                if let Some(engine) = built.engine {
                    for suffix in cdx_suffixes(route_cfg.get("enable_cdx_api"), false)? {
                        routes.push(Route::new(
                            format!("{name}{suffix}"),
                            Arc::new(Handler::CdxApi(CdxApiHandler::new(engine.clone()))),
                            route_cfg.clone(),
                            RouteClass::Prefix,
                            RequestKind::Plain,
                        ));
                    }
                }
            }
        }
    }

    if config.get_bool("debug_echo_env", false) {
        routes.push(Route::new(
            "echo_env".to_string(),
            Arc::new(Handler::EchoEnv(EchoEnvHandler::new())),
            config.clone(),
            RouteClass::Prefix,
            RequestKind::Plain,
        ));
    }

    if config.get_bool("debug_echo_req", false) {
        routes.push(Route::new(
            "echo_req".to_string(),
            Arc::new(Handler::EchoReq(EchoReqHandler::new())),
            config.clone(),
            RouteClass::Prefix,
            RequestKind::Plain,
        ));
    }

    for (name, path) in static_routes {
        routes.push(Route::new(
            name,
            Arc::new(Handler::Static(StaticHandler::new(path))),
            config.clone(),
            RouteClass::Prefix,
            RequestKind::Plain,
        ));
    }

    // cross-handler references resolve only once every handler exists
    let registry = HandlerRegistry::new(registry_entries);
    for route in &routes {
        route.handler().resolve_refs(&registry);
    }

    build_router(routes, registry, &template_env, config, port)
}

/// Assemble a CDX-API-only router: one `<name><suffix>` access point
/// per declared collection, `enable_cdx_api` defaulting to on. No
/// replay routes, no discovery, no router-wide views.
pub fn create_cdx_router(passed: Mapping) -> Result<Router> {
    let config = base_config(passed);
    let port = config.get_u16("port", FALLBACK_PORT);

    let template_env = TemplateEnv::new(config.get_mapping("template_globals"));

    let mut routes: Vec<Route> = Vec::new();

    for (name, source) in declared_collections(&config)? {
        let CollectionSource::Raw(value) = source else {
            continue;
        };
        let route_cfg = route_config(&name, &value, &config)?;
        let engine = init_query_engine(&name, &route_cfg, &template_env)?;

        for suffix in cdx_suffixes(route_cfg.get("enable_cdx_api"), true)? {
            routes.push(Route::new(
                format!("{name}{suffix}"),
                Arc::new(Handler::CdxApi(CdxApiHandler::new(engine.clone()))),
                route_cfg.clone(),
                RouteClass::Prefix,
                RequestKind::Plain,
            ));
        }
    }

    build_router(routes, HandlerRegistry::default(), &template_env, config, port)
}

/// Layer the passed config over the embedded defaults.
fn base_config(passed: Mapping) -> LayeredConfig {
    LayeredConfig::new(vec![
        Arc::new(passed),
        Arc::new(default_config().clone()),
    ])
}

/// The `collections` table as an ordered source list.
fn declared_collections(config: &LayeredConfig) -> Result<Vec<(String, CollectionSource)>> {
    let Some(mapping) = config.get_mapping("collections") else {
        return Ok(Vec::new());
    };

    mapping
        .iter()
        .map(|(name, value)| {
            let name = name.as_str().ok_or(ConfigError::InvalidValue {
                key: "collections".to_string(),
                expected: "string collection names",
            })?;
            Ok((name.to_string(), CollectionSource::Raw(value.clone())))
        })
        .collect()
}

/// The global `static_routes` table, in declaration order.
fn declared_static_routes(config: &LayeredConfig) -> Result<Vec<(String, String)>> {
    let Some(mapping) = config.get_mapping("static_routes") else {
        return Ok(Vec::new());
    };

    mapping
        .iter()
        .map(|(name, path)| {
            let (Some(name), Some(path)) = (name.as_str(), path.as_str()) else {
                return Err(ConfigError::InvalidValue {
                    key: "static_routes".to_string(),
                    expected: "a mapping of route names to paths",
                });
            };
            Ok((name.to_string(), path.to_string()))
        })
        .collect()
}

/// Insert or replace by key, preserving the existing position on
/// replacement (dict-update semantics).
fn upsert<T>(entries: &mut Vec<(String, T)>, name: String, value: T) {
    match entries.iter_mut().find(|(existing, _)| *existing == name) {
        Some((_, slot)) => *slot = value,
        None => entries.push((name, value)),
    }
}
