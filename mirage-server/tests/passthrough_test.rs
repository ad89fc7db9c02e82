mod support;

use std::sync::Arc;

use serde_json::Value;

use mirage_core::options::ProxyOptions;
use mirage_core::token;
use mirage_core::upstream::RawResponse;
use mirage_model::CollectionId;
use support::{
    StubMembership, StubUpstream, member_missing, member_present, test_server,
};

fn raw_json(body: &str) -> RawResponse {
    RawResponse {
        status: 200,
        headers: vec![
            ("content-type".to_string(), "application/json".to_string()),
            ("x-upstream-marker".to_string(), "42".to_string()),
        ],
        body: body.as_bytes().to_vec(),
    }
}

#[tokio::test]
async fn native_view_items_pass_through_verbatim() {
    let body = r#"{"Items":[{"Id":"u9","Name":"Upstream Answer"}],"TotalRecordCount":1}"#;
    let upstream = Arc::new(
        StubUpstream::default().with_raw("/views/nat-movies/items", raw_json(body)),
    );
    let server = test_server(
        upstream,
        Arc::new(StubMembership::default()),
        ProxyOptions::default(),
    );

    let response = server.get("/views/nat-movies/items").await;
    response.assert_status_ok();
    assert_eq!(
        response.header("x-upstream-marker"),
        "42",
        "protocol-relevant upstream headers must survive passthrough"
    );
    assert_eq!(response.text(), body);
}

#[tokio::test]
async fn passthrough_preserves_the_original_query() {
    let path = "/views/nat-movies/items?StartIndex=40&Limit=20&SortBy=SortName";
    let upstream = Arc::new(StubUpstream::default().with_raw(path, raw_json("{}")));
    let upstream_probe = Arc::clone(&upstream);
    let server = test_server(
        upstream,
        Arc::new(StubMembership::default()),
        ProxyOptions::default(),
    );

    server
        .get("/views/nat-movies/items")
        .add_query_param("StartIndex", 40)
        .add_query_param("Limit", 20)
        .add_query_param("SortBy", "SortName")
        .await
        .assert_status_ok();

    let proxied = upstream_probe.proxied.lock().await;
    assert_eq!(proxied.as_slice(), [path.to_string()]);
}

#[tokio::test]
async fn upstream_error_statuses_pass_through_unmodified() {
    let upstream = Arc::new(StubUpstream::default().with_raw(
        "/items/deadbeef",
        RawResponse {
            status: 404,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: b"{\"error\":\"not here\"}".to_vec(),
        },
    ));
    let server = test_server(
        upstream,
        Arc::new(StubMembership::default()),
        ProxyOptions::default(),
    );

    let response = server.get("/items/deadbeef").await;
    response.assert_status_not_found();
    assert_eq!(response.text(), "{\"error\":\"not here\"}");
}

#[tokio::test]
async fn placeholder_item_is_synthesized_locally() {
    let noir = CollectionId::new();
    let membership = Arc::new(StubMembership::default().with_collection(
        noir,
        "Noir Essentials",
        vec![
            member_present("tmdb:901", "u1"),
            member_missing("tmdb:902", "Beta", 1945),
        ],
    ));
    let upstream = Arc::new(StubUpstream::default());
    let upstream_probe = Arc::clone(&upstream);
    let server = test_server(upstream, membership, ProxyOptions::default());

    let token = token::item_token("tmdb:902");
    let response = server.get(&format!("/items/{token}")).await;
    response.assert_status_ok();
    let body: Value = response.json();

    assert_eq!(body["Id"], token);
    assert_eq!(body["Name"], "Beta");
    assert_eq!(body["ProductionYear"], 1945);
    assert_eq!(body["LocationType"], "Virtual");
    // No playback-capable fields on placeholders.
    assert!(body.get("MediaSources").is_none());
    // Synthesized entirely locally.
    assert!(upstream_probe.proxied.lock().await.is_empty());
    assert_eq!(upstream_probe.batch_calls(), 0);
}

#[tokio::test]
async fn unknown_placeholder_token_is_not_found() {
    let server = test_server(
        Arc::new(StubUpstream::default()),
        Arc::new(StubMembership::default()),
        ProxyOptions::default(),
    );

    let token = token::item_token("tmdb:404");
    server
        .get(&format!("/items/{token}"))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn view_token_on_the_item_endpoint_returns_a_folder_record() {
    let noir = CollectionId::new();
    let membership = Arc::new(StubMembership::default().with_collection(
        noir,
        "Noir Essentials",
        Vec::new(),
    ));
    let server = test_server(
        Arc::new(StubUpstream::default()),
        membership,
        ProxyOptions::default(),
    );

    let body: Value = server
        .get(&format!("/items/{}", token::view_token(&noir)))
        .await
        .json();
    assert_eq!(body["Name"], "Noir Essentials");
    assert_eq!(body["Type"], "BoxSet");
    assert_eq!(body["LocationType"], "Virtual");
}

#[tokio::test]
async fn corrupt_item_token_is_not_found() {
    let upstream = Arc::new(StubUpstream::default());
    let upstream_probe = Arc::clone(&upstream);
    let server = test_server(
        upstream,
        Arc::new(StubMembership::default()),
        ProxyOptions::default(),
    );

    server
        .get("/items/mrg1.item")
        .await
        .assert_status_not_found();
    assert!(upstream_probe.proxied.lock().await.is_empty());
}
