//! Top-level router construction.
//!
//! # Responsibilities
//! - Select the archival vs. proxy-capable variant from
//!   `enable_http_proxy`
//! - Build router-wide views (home, error, proxy selector, cert
//!   download)
//! - Expose ordered first-match dispatch over the route list
//!
//! # Design Decisions
//! - Immutable after construction; shared with the transport via Arc
//! - Explicit no-match (`None`) rather than a silent default route

use crate::config::{LayeredConfig, Result};
use crate::handlers::HandlerRegistry;
use crate::routing::route::Route;
use crate::views::{TemplateEnv, View};

/// Router variant. Proxy mode carries the two proxy-specific UI
/// views.
#[derive(Debug)]
pub enum RouterKind {
    Archival,
    Proxy {
        select_view: Option<View>,
        cert_download_view: Option<View>,
    },
}

/// The assembled router: ordered routes plus everything a transport
/// needs to dispatch and introspect.
#[derive(Debug)]
pub struct Router {
    kind: RouterKind,
    routes: Vec<Route>,
    registry: HandlerRegistry,
    port: u16,
    abs_path: bool,
    home_view: Option<View>,
    error_view: Option<View>,
    config: LayeredConfig,
}

impl Router {
    pub fn kind(&self) -> &RouterKind {
        &self.kind
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Whether rewritten links should prefer absolute paths.
    pub fn abs_path(&self) -> bool {
        self.abs_path
    }

    pub fn home_view(&self) -> Option<&View> {
        self.home_view.as_ref()
    }

    pub fn error_view(&self) -> Option<&View> {
        self.error_view.as_ref()
    }

    /// The fully resolved configuration, for transport introspection.
    pub fn config(&self) -> &LayeredConfig {
        &self.config
    }

    /// First route matching `path` (no leading slash), in route
    /// order, with the remainder below the route name. Route order is
    /// match priority.
    pub fn match_path<'a>(&self, path: &'a str) -> Option<(&Route, &'a str)> {
        self.routes
            .iter()
            .find_map(|route| route.match_path(path).map(|rest| (route, rest)))
    }
}

/// Assemble the router around an already-built route list.
pub fn build_router(
    routes: Vec<Route>,
    registry: HandlerRegistry,
    env: &TemplateEnv,
    config: LayeredConfig,
    port: u16,
) -> Result<Router> {
    let kind = if config.get_bool("enable_http_proxy", false) {
        RouterKind::Proxy {
            select_view: env.create_template(
                config.get_str("proxy_select_html"),
                "Proxy Coll Selector",
            )?,
            cert_download_view: env.create_template(
                config.get_str("proxy_cert_download_html"),
                "Proxy Cert Download",
            )?,
        }
    } else {
        RouterKind::Archival
    };

    let home_view = env.create_template(config.get_str("home_html"), "Home Page")?;
    let error_view = env.create_template(config.get_str("error_html"), "Error Page")?;
    let abs_path = config.get_bool("absolute_paths", true);

    Ok(Router {
        kind,
        routes,
        registry,
        port,
        abs_path,
        home_view,
        error_view,
        config,
    })
}
