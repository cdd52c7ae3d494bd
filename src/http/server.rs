//! HTTP server setup and request dispatch.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    CdxApiHandler, EchoReqHandler, Handler, LiveHandler, ReplayHandler, StaticHandler,
};
use crate::query::QueryError;
use crate::routing::{RequestKind, Route, Router};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound on captures returned for one replay or CDX request.
const CAPTURE_LIMIT: usize = 1000;

/// Application state injected into the dispatch handler.
#[derive(Clone)]
struct AppState {
    router: Arc<Router>,
}

/// Bind the router's configured port and serve until shutdown.
pub async fn serve(router: Router) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], router.port()));
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(address = %listener.local_addr()?, "listening for connections");

    serve_on(router, listener).await
}

/// Serve on an already-bound listener.
pub async fn serve_on(router: Router, listener: TcpListener) -> std::io::Result<()> {
    let state = AppState {
        router: Arc::new(router),
    };

    let app = axum::Router::new()
        .fallback(dispatch)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .with_state(state);

    axum::serve(listener, app).await
}

/// Route-order first-match dispatch over the assembled route table.
async fn dispatch(State(state): State<AppState>, req: Request) -> Response {
    let path = req.uri().path().trim_start_matches('/').to_string();
    let query = req.uri().query().map(str::to_string);

    let Some((route, rest)) = state.router.match_path(&path) else {
        return unrouted_response(&state.router, &path);
    };

    match route.handler().as_ref() {
        Handler::Replay(handler) => {
            let vary_accept_datetime = route.request_kind() == RequestKind::Memento
                && req.headers().contains_key("accept-datetime");
            replay_response(handler, route, rest, vary_accept_datetime).await
        }
        Handler::Live(handler) => live_response(handler, rest, query.as_deref()).await,
        Handler::CdxApi(handler) => cdx_response(handler, query.as_deref()).await,
        Handler::Static(handler) => static_response(handler, rest).await,
        Handler::EchoEnv(handler) => text_response(StatusCode::OK, handler.render()),
        Handler::EchoReq(handler) => echo_req_response(handler, &req),
    }
}

/// Home page at the root, error page (or plain 404) elsewhere.
fn unrouted_response(router: &Router, path: &str) -> Response {
    if path.is_empty() {
        if let Some(view) = router.home_view() {
            return html_response(StatusCode::OK, view.render(&[("title", view.title())]));
        }
        let names: Vec<&str> = router.routes().iter().map(Route::name).collect();
        return json_response(StatusCode::OK, serde_json::json!({ "routes": names }));
    }

    match router.error_view() {
        Some(view) => html_response(
            StatusCode::NOT_FOUND,
            view.render(&[("title", view.title()), ("url", path)]),
        ),
        None => text_response(StatusCode::NOT_FOUND, format!("no route for {path}\n")),
    }
}

async fn replay_response(
    handler: &ReplayHandler,
    route: &Route,
    rest: &str,
    vary_accept_datetime: bool,
) -> Response {
    let (timestamp, target) = split_timestamp(rest);
    if target.is_empty() {
        return text_response(
            StatusCode::BAD_REQUEST,
            format!("usage: /{}/[timestamp/]url\n", route.name()),
        );
    }

    let captures = match handler.engine().lookup(target, CAPTURE_LIMIT).await {
        Ok(captures) => captures,
        Err(err) => return query_error_response(err),
    };

    let captures: Vec<_> = match timestamp {
        Some(ts) => captures
            .into_iter()
            .filter(|capture| capture.timestamp.starts_with(ts))
            .collect(),
        None => captures,
    };

    if captures.is_empty() {
        let mut body = format!("no captures of {target} in collection '{}'\n", route.name());
        let others: Vec<&str> = handler
            .siblings()
            .iter()
            .map(String::as_str)
            .filter(|name| *name != route.name())
            .collect();
        if !others.is_empty() {
            body.push_str(&format!("known collections: {}\n", others.join(", ")));
        }
        return text_response(StatusCode::NOT_FOUND, body);
    }

    let count = captures.len().to_string();
    let mut response = match handler.engine().html_view() {
        Some(view) => html_response(
            StatusCode::OK,
            view.render(&[("url", target), ("count", &count)]),
        ),
        None => json_response(
            StatusCode::OK,
            serde_json::json!({ "url": target, "captures": captures }),
        ),
    };

    if vary_accept_datetime {
        response
            .headers_mut()
            .insert(header::VARY, HeaderValue::from_static("accept-datetime"));
    }

    response
}

async fn live_response(handler: &LiveHandler, rest: &str, query: Option<&str>) -> Response {
    if rest.is_empty() {
        return text_response(StatusCode::BAD_REQUEST, "no target url\n".to_string());
    }

    let target = match query {
        Some(query) => format!("{rest}?{query}"),
        None => rest.to_string(),
    };

    match handler.fetch(&target).await {
        Ok(live) => {
            let status =
                StatusCode::from_u16(live.status).unwrap_or(StatusCode::BAD_GATEWAY);
            let content_type = live
                .content_type
                .as_deref()
                .unwrap_or("application/octet-stream")
                .to_string();
            (status, [(header::CONTENT_TYPE, content_type)], live.body).into_response()
        }
        Err(err) => {
            tracing::warn!(target, error = %err, "live fetch failed");
            text_response(StatusCode::BAD_GATEWAY, format!("live fetch failed: {err}\n"))
        }
    }
}

async fn cdx_response(handler: &CdxApiHandler, query: Option<&str>) -> Response {
    let mut url = None;
    let mut limit = CAPTURE_LIMIT;

    if let Some(query) = query {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "url" => url = Some(value.into_owned()),
                "limit" => {
                    if let Ok(parsed) = value.parse() {
                        limit = parsed;
                    }
                }
                _ => {}
            }
        }
    }

    let Some(url) = url else {
        return text_response(StatusCode::BAD_REQUEST, "url parameter required\n".to_string());
    };

    match handler.lookup(&url, limit.min(CAPTURE_LIMIT)).await {
        Ok(captures) => {
            let mut body = String::new();
            for capture in captures {
                body.push_str(&capture.urlkey);
                body.push(' ');
                body.push_str(&capture.timestamp);
                body.push(' ');
                body.push_str(&capture.original);
                for field in [&capture.mimetype, &capture.statuscode, &capture.digest, &capture.filename]
                    .into_iter()
                    .flatten()
                {
                    body.push(' ');
                    body.push_str(field);
                }
                body.push('\n');
            }
            text_response(StatusCode::OK, body)
        }
        Err(err) => query_error_response(err),
    }
}

async fn static_response(handler: &StaticHandler, rest: &str) -> Response {
    let Some(path) = (!rest.is_empty()).then(|| handler.resolve(rest)).flatten() else {
        return text_response(StatusCode::NOT_FOUND, "not found\n".to_string());
    };

    match tokio::fs::read(&path).await {
        Ok(body) => (
            [(header::CONTENT_TYPE, content_type_for(rest))],
            body,
        )
            .into_response(),
        Err(_) => text_response(StatusCode::NOT_FOUND, "not found\n".to_string()),
    }
}

fn echo_req_response(handler: &EchoReqHandler, req: &Request) -> Response {
    let headers: Vec<(String, String)> = req
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();

    text_response(
        StatusCode::OK,
        handler.render(req.method().as_str(), req.uri().path(), &headers),
    )
}

fn query_error_response(err: QueryError) -> Response {
    tracing::warn!(error = %err, "index lookup failed");
    text_response(StatusCode::BAD_GATEWAY, format!("index lookup failed: {err}\n"))
}

/// Leading `[timestamp/]` segment of an archival request path.
fn split_timestamp(rest: &str) -> (Option<&str>, &str) {
    if let Some((first, remainder)) = rest.split_once('/') {
        if (4..=14).contains(&first.len()) && first.bytes().all(|b| b.is_ascii_digit()) {
            return (Some(first), remainder);
        }
    }
    (None, rest)
}

fn content_type_for(path: &str) -> &'static str {
    match path.rsplit('.').next() {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

fn text_response(status: StatusCode, body: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}

fn html_response(status: StatusCode, body: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        body,
    )
        .into_response()
}

fn json_response(status: StatusCode, value: serde_json::Value) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        value.to_string(),
    )
        .into_response()
}
