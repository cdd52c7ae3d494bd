//! Router assembly: ordering, merging, cross-references, fatal errors.

mod common;

use std::sync::Arc;

use serde_yaml::{Mapping, Value};

use common::{make_collection, route_names, ConfigBuilder};
use replay_gateway::config::ConfigError;
use replay_gateway::handlers::{EchoEnvHandler, Handler};
use replay_gateway::routing::{
    create_cdx_router, create_router, create_router_with_handlers, RequestKind,
};

#[test]
fn cdx_siblings_follow_their_collection() {
    let idx_a = tempfile::tempdir().unwrap();
    let idx_b = tempfile::tempdir().unwrap();

    let mut coll_a = Mapping::new();
    coll_a.insert("index_paths".into(), idx_a.path().to_str().unwrap().into());
    coll_a.insert("enable_cdx_api".into(), true.into());

    let passed = ConfigBuilder::new()
        .collection("a", Value::Mapping(coll_a))
        .collection("b", idx_b.path().to_str().unwrap())
        .build();

    let router = create_router(passed).unwrap();
    assert_eq!(route_names(&router), ["a", "a-cdx", "b"]);
}

#[test]
fn custom_and_multiple_cdx_suffixes() {
    let idx = tempfile::tempdir().unwrap();

    let mut coll = Mapping::new();
    coll.insert("index_paths".into(), idx.path().to_str().unwrap().into());
    coll.insert(
        "enable_cdx_api".into(),
        Value::Sequence(vec!["-cdx".into(), "-api".into()]),
    );

    let passed = ConfigBuilder::new()
        .collection("web", Value::Mapping(coll))
        .build();

    let router = create_router(passed).unwrap();
    assert_eq!(route_names(&router), ["web", "web-cdx", "web-api"]);
}

#[test]
fn end_to_end_single_collection() {
    let idx = tempfile::tempdir().unwrap();
    let index_path = idx.path().to_str().unwrap();

    let passed = ConfigBuilder::new()
        .set("port", 9090)
        .collection("demo", index_path)
        .build();

    let router = create_router(passed).unwrap();

    assert_eq!(router.port(), 9090);
    assert_eq!(route_names(&router), ["demo"]);

    let Handler::Replay(handler) = router.registry().get("demo").unwrap().as_ref() else {
        panic!("expected a replay handler");
    };
    assert_eq!(handler.engine().index_paths(), [index_path]);
}

#[test]
fn debug_and_static_routes_come_last() {
    let idx = tempfile::tempdir().unwrap();
    let assets = tempfile::tempdir().unwrap();

    let mut statics = Mapping::new();
    statics.insert("static".into(), assets.path().to_str().unwrap().into());

    let passed = ConfigBuilder::new()
        .set("debug_echo_env", true)
        .set("debug_echo_req", true)
        .set("static_routes", Value::Mapping(statics))
        .collection("web", idx.path().to_str().unwrap())
        .build();

    let router = create_router(passed).unwrap();
    assert_eq!(route_names(&router), ["web", "echo_env", "echo_req", "static"]);
}

#[test]
fn liveweb_sentinel_selects_the_live_family() {
    let passed = ConfigBuilder::new().collection("live", "$liveweb").build();

    let router = create_router(passed).unwrap();
    let handler = router.registry().get("live").unwrap();
    assert!(matches!(handler.as_ref(), Handler::Live(_)));
    // no query engine behind it, so no cdx sibling either
    assert_eq!(route_names(&router), ["live"]);
}

#[test]
fn prebuilt_handlers_are_used_as_is() {
    let prebuilt: Arc<Handler> = Arc::new(Handler::EchoEnv(EchoEnvHandler::new()));

    let router =
        create_router_with_handlers(Mapping::new(), vec![("custom".to_string(), prebuilt)])
            .unwrap();

    assert_eq!(route_names(&router), ["custom"]);
    assert!(matches!(
        router.registry().get("custom").unwrap().as_ref(),
        Handler::EchoEnv(_)
    ));
}

#[test]
fn discovery_merges_after_declared_collections() {
    let root = tempfile::tempdir().unwrap();
    let dir = make_collection(root.path(), "found", &["indexes", "archive", "static"]);
    std::fs::write(dir.join("static/site.css"), "body {}\n").unwrap();

    let declared_idx = tempfile::tempdir().unwrap();

    let passed = ConfigBuilder::new()
        .set("collections_root", root.path().to_str().unwrap())
        .collection("declared", declared_idx.path().to_str().unwrap())
        .build();

    let router = create_router(passed).unwrap();
    assert_eq!(route_names(&router), ["declared", "found", "static/found"]);

    // the discovered collection's handler is a replay handler over
    // the resolved absolute index dir
    let Handler::Replay(handler) = router.registry().get("found").unwrap().as_ref() else {
        panic!("expected a replay handler");
    };
    let resolved = &handler.engine().index_paths()[0];
    assert!(resolved.ends_with(std::path::MAIN_SEPARATOR));
    assert!(resolved.contains("indexes"));
}

#[test]
fn discovery_failure_aborts_assembly() {
    let root = tempfile::tempdir().unwrap();
    make_collection(root.path(), "broken", &["indexes"]);

    let passed = ConfigBuilder::new()
        .set("collections_root", root.path().to_str().unwrap())
        .build();

    let err = create_router(passed).unwrap_err();
    match err {
        ConfigError::MissingDir { collection, key, .. } => {
            assert_eq!(collection, "broken");
            assert_eq!(key, "archive_paths");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn reference_resolution_sees_later_collections() {
    let idx_a = tempfile::tempdir().unwrap();
    let idx_z = tempfile::tempdir().unwrap();

    let passed = ConfigBuilder::new()
        .collection("alpha", idx_a.path().to_str().unwrap())
        .collection("zulu", idx_z.path().to_str().unwrap())
        .build();

    let router = create_router(passed).unwrap();

    // the first-built handler still sees the collection built after it
    let Handler::Replay(handler) = router.registry().get("alpha").unwrap().as_ref() else {
        panic!("expected a replay handler");
    };
    assert_eq!(handler.siblings(), ["alpha", "zulu"]);
}

#[test]
fn assembly_is_idempotent() {
    let root = tempfile::tempdir().unwrap();
    make_collection(root.path(), "web", &["indexes", "archive"]);
    let idx = tempfile::tempdir().unwrap();

    let passed = ConfigBuilder::new()
        .set("collections_root", root.path().to_str().unwrap())
        .set("enable_memento", true)
        .collection("declared", idx.path().to_str().unwrap())
        .build();

    let first = create_router(passed.clone()).unwrap();
    let second = create_router(passed).unwrap();

    assert_eq!(route_names(&first), route_names(&second));
    assert_eq!(first.port(), second.port());

    for (a, b) in first.routes().iter().zip(second.routes()) {
        assert_eq!(a.request_kind(), b.request_kind());
        assert_eq!(
            a.config().get_str("index_paths"),
            b.config().get_str("index_paths")
        );
    }
}

#[test]
fn memento_flag_tags_collection_routes_only() {
    let idx = tempfile::tempdir().unwrap();

    let mut coll = Mapping::new();
    coll.insert("index_paths".into(), idx.path().to_str().unwrap().into());
    coll.insert("enable_cdx_api".into(), true.into());

    let passed = ConfigBuilder::new()
        .set("enable_memento", true)
        .collection("web", Value::Mapping(coll))
        .build();

    let router = create_router(passed).unwrap();

    assert_eq!(router.routes()[0].request_kind(), RequestKind::Memento);
    // cdx siblings never negotiate datetimes
    assert_eq!(router.routes()[1].request_kind(), RequestKind::Plain);
}

#[test]
fn cdx_only_router_exposes_api_access_points() {
    let idx_a = tempfile::tempdir().unwrap();
    let idx_b = tempfile::tempdir().unwrap();

    let passed = ConfigBuilder::new()
        .collection("a", idx_a.path().to_str().unwrap())
        .collection("b", idx_b.path().to_str().unwrap())
        .build();

    let router = create_cdx_router(passed).unwrap();

    assert_eq!(route_names(&router), ["a-cdx", "b-cdx"]);
    assert!(router.registry().is_empty());
}

#[test]
fn unreadable_index_names_the_collection() {
    let passed = ConfigBuilder::new()
        .collection("ghost", "/no/such/index")
        .build();

    let err = create_router(passed).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("ghost"), "missing collection name: {message}");
}
