//! End-to-end dispatch through the HTTP transport.

mod common;

use std::net::SocketAddr;

use common::{make_collection, write_index, ConfigBuilder};
use replay_gateway::http::serve_on;
use replay_gateway::routing::create_router;
use replay_gateway::Router;

/// Spawn the transport on an ephemeral port.
async fn spawn_gateway(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = serve_on(router, listener).await;
    });
    addr
}

#[tokio::test]
async fn dispatches_by_route_prefix() {
    let root = tempfile::tempdir().unwrap();
    let dir = make_collection(root.path(), "web", &["indexes", "archive", "static"]);
    write_index(
        &dir.join("indexes"),
        "http://example.com/",
        &["20140101000000", "20150101000000"],
    );
    std::fs::write(dir.join("static/site.css"), "body { margin: 0 }\n").unwrap();

    std::fs::write(dir.join("config.yaml"), "enable_cdx_api: true\n").unwrap();

    let passed = ConfigBuilder::new()
        .set("collections_root", root.path().to_str().unwrap())
        .set("debug_echo_req", true)
        .build();

    let router = create_router(passed).unwrap();
    let addr = spawn_gateway(router).await;
    let client = reqwest::Client::new();

    // home: no view configured, so the route listing answers
    let home = client
        .get(format!("http://{addr}/"))
        .send()
        .await
        .unwrap();
    assert_eq!(home.status(), 200);
    let listing: serde_json::Value = home.json().await.unwrap();
    let names: Vec<&str> = listing["routes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|name| name.as_str().unwrap())
        .collect();
    assert_eq!(names, ["web", "web-cdx", "echo_req", "static/web"]);

    // replay: capture list as JSON
    let replay = client
        .get(format!("http://{addr}/web/http://example.com/"))
        .send()
        .await
        .unwrap();
    assert_eq!(replay.status(), 200);
    let body: serde_json::Value = replay.json().await.unwrap();
    assert_eq!(body["captures"].as_array().unwrap().len(), 2);

    // replay with timestamp prefix narrows the list
    let narrowed = client
        .get(format!("http://{addr}/web/2014/http://example.com/"))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = narrowed.json().await.unwrap();
    assert_eq!(body["captures"].as_array().unwrap().len(), 1);

    // cdx sibling shares the same engine
    let cdx = client
        .get(format!("http://{addr}/web-cdx?url=http://example.com/&limit=1"))
        .send()
        .await
        .unwrap();
    assert_eq!(cdx.status(), 200);
    let body = cdx.text().await.unwrap();
    assert_eq!(body.lines().count(), 1);
    assert!(body.contains("20140101000000"));

    // static assets under the discovered static route
    let css = client
        .get(format!("http://{addr}/static/web/site.css"))
        .send()
        .await
        .unwrap();
    assert_eq!(css.status(), 200);
    assert_eq!(css.headers()["content-type"], "text/css");

    // debug echo
    let echo = client
        .get(format!("http://{addr}/echo_req"))
        .send()
        .await
        .unwrap();
    assert!(echo.text().await.unwrap().starts_with("GET /echo_req"));

    // miss in the archive names the collection
    let miss = client
        .get(format!("http://{addr}/web/http://missing.example/"))
        .send()
        .await
        .unwrap();
    assert_eq!(miss.status(), 404);

    // unknown route
    let unrouted = client
        .get(format!("http://{addr}/nowhere"))
        .send()
        .await
        .unwrap();
    assert_eq!(unrouted.status(), 404);
}

#[tokio::test]
async fn static_handler_refuses_traversal() {
    let assets = tempfile::tempdir().unwrap();
    std::fs::write(assets.path().join("ok.txt"), "ok\n").unwrap();

    let mut statics = serde_yaml::Mapping::new();
    statics.insert("files".into(), assets.path().to_str().unwrap().into());

    let passed = ConfigBuilder::new()
        .set("static_routes", serde_yaml::Value::Mapping(statics))
        .build();

    let router = create_router(passed).unwrap();
    let addr = spawn_gateway(router).await;
    let client = reqwest::Client::new();

    let ok = client
        .get(format!("http://{addr}/files/ok.txt"))
        .send()
        .await
        .unwrap();
    assert_eq!(ok.status(), 200);

    let traversal = client
        .get(format!("http://{addr}/files/%2e%2e/secret"))
        .send()
        .await
        .unwrap();
    assert_eq!(traversal.status(), 404);
}
