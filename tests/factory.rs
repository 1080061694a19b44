//! Per-key client caching against a live mock server.

use emailit::{testing::test_factory, Error};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn each_tenant_authenticates_with_its_own_key() {
    let server = MockServer::start().await;
    for key in ["em_tenant_a", "em_tenant_b"] {
        Mock::given(method("GET"))
            .and(path("/v2/domains/dom_1"))
            .and(header("authorization", format!("Bearer {key}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "dom_1",
                "name": format!("{key}.example.com"),
                "status": "verified"
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let factory = test_factory(&server.uri());
    let a = factory.create_client("em_tenant_a").expect("client a");
    let b = factory.create_client("em_tenant_b").expect("client b");

    assert_eq!(
        a.domains().get("dom_1").await.expect("get a").name,
        "em_tenant_a.example.com"
    );
    assert_eq!(
        b.domains().get("dom_1").await.expect("get b").name,
        "em_tenant_b.example.com"
    );
    assert!(factory
        .create_client("em_tenant_a")
        .expect("cached")
        .ptr_eq(&a));
}

#[tokio::test]
async fn cached_clients_share_rate_limit_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/domains"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": []}))
                .insert_header("ratelimit-remaining", "8"),
        )
        .mount(&server)
        .await;

    let factory = test_factory(&server.uri());
    let first = factory.create_client("em_tenant").expect("client");
    first.test_connection().await.expect("reachable");

    let second = factory.create_client("em_tenant").expect("client");
    assert_eq!(second.last_rate_limit().map(|r| r.remaining), Some(8));
}

#[tokio::test]
async fn empty_key_is_rejected_before_any_request() {
    let server = MockServer::start().await;
    let factory = test_factory(&server.uri());

    let err = factory.create_client("").unwrap_err();
    assert!(matches!(err, Error::InvalidInput(ref msg) if msg == "API key is required"));
    assert!(server
        .received_requests()
        .await
        .expect("recorded")
        .is_empty());
}
