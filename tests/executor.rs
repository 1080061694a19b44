//! Request executor behavior: auth, rate-limit capture, error classification,
//! cancellation.

use std::time::Duration;

use emailit::{
    testing::{rate_limit_headers, test_client, TEST_API_KEY},
    ApiError, CancellationToken, Error, RateLimitInfo, SendEmailRequest, TransportErrorKind,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn hello() -> SendEmailRequest {
    SendEmailRequest::new(
        "sender@example.com",
        vec!["recipient@example.com".into()],
        "Hello",
    )
    .with_html("<p>Hi</p>")
}

#[tokio::test]
async fn send_embeds_rate_limit_from_response_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/emails"))
        .and(header("authorization", format!("Bearer {TEST_API_KEY}").as_str()))
        .and(header("content-type", "application/json"))
        .and(header("accept", "application/json"))
        .and(body_json(json!({
            "from": "sender@example.com",
            "to": ["recipient@example.com"],
            "subject": "Hello",
            "html": "<p>Hi</p>"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "em_123", "status": "queued"}))
                .insert_header("ratelimit-remaining", "1")
                .insert_header("ratelimit-daily-remaining", "4999"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let email = client.emails().send(&hello()).await.expect("send");

    assert_eq!(email.id, "em_123");
    assert_eq!(email.status, "queued");
    let embedded = email.rate_limit.expect("rate limit attached");
    assert_eq!(embedded.remaining, 1);
    assert_eq!(embedded.daily_remaining, 4999);
    assert_eq!(embedded.limit, 0);
    assert_eq!(embedded.retry_after_seconds, None);

    let direct = RateLimitInfo::from_header_pairs([
        ("ratelimit-remaining", "1"),
        ("ratelimit-daily-remaining", "4999"),
    ]);
    assert_eq!(embedded, direct);
    assert_eq!(client.last_rate_limit(), Some(direct));
}

#[tokio::test]
async fn idempotency_key_is_forwarded_only_when_set() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/emails"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "em_1"})))
        .expect(3)
        .mount(&server)
        .await;

    let emails = test_client(&server.uri()).emails();
    emails
        .send_with_idempotency_key(&hello(), "order-42")
        .await
        .expect("send with key");
    emails
        .send_with_idempotency_key(&hello(), "")
        .await
        .expect("send with blank key");
    emails.send(&hello()).await.expect("send");

    let requests = server.received_requests().await.expect("recorded");
    let keys: Vec<Option<String>> = requests
        .iter()
        .map(|r| {
            r.headers
                .get("idempotency-key")
                .map(|v| v.to_str().unwrap().to_string())
        })
        .collect();
    assert_eq!(keys, vec![Some("order-42".to_string()), None, None]);
}

#[tokio::test]
async fn unauthorized_is_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/domains/dom_1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid API key"})))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .domains()
        .get("dom_1")
        .await
        .unwrap_err();
    match err {
        Error::Api(ApiError::Authentication { message }) => assert_eq!(message, "Invalid API key"),
        other => panic!("expected authentication error, got {other:?}"),
    }
}

#[tokio::test]
async fn validation_errors_carry_field_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/emails"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "The given data was invalid.",
            "errors": {"from": ["The from field is required."]}
        })))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .emails()
        .send(&hello())
        .await
        .unwrap_err();
    let api = err.as_api().expect("api error");
    assert_eq!(api.status(), 400);
    assert_eq!(api.message(), "The given data was invalid.");
    assert_eq!(
        api.field_errors().expect("field errors")["from"],
        vec!["The from field is required."]
    );
}

#[tokio::test]
async fn forbidden_surfaces_as_generic_error_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v2/api-keys/key_1"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"error": "Insufficient scope"})))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .api_keys()
        .delete("key_1")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(403));
    let api = err.as_api().expect("api error");
    assert!(api.is_forbidden());
    assert_eq!(api.message(), "Insufficient scope");
}

#[tokio::test]
async fn too_many_requests_distinguishes_daily_quota() {
    let server = MockServer::start().await;
    let mut daily = ResponseTemplate::new(429).set_body_json(json!({"message": "slow down"}));
    for (name, value) in rate_limit_headers(2, 0, 5000, 0) {
        daily = daily.insert_header(name, value.as_str());
    }
    Mock::given(method("POST"))
        .and(path("/v2/emails"))
        .respond_with(daily)
        .mount(&server)
        .await;

    let mut per_second = ResponseTemplate::new(429).insert_header("retry-after", "3");
    for (name, value) in rate_limit_headers(2, 0, 5000, 120) {
        per_second = per_second.insert_header(name, value.as_str());
    }
    Mock::given(method("GET"))
        .and(path("/v2/emails/em_1"))
        .respond_with(per_second)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());

    let err = client.emails().send(&hello()).await.unwrap_err();
    match err.as_api() {
        Some(ApiError::DailyLimitExceeded { rate_limit }) => {
            assert_eq!(rate_limit.daily_limit, 5000);
            assert_eq!(rate_limit.daily_remaining, 0);
        }
        other => panic!("expected daily limit error, got {other:?}"),
    }
    assert!(err.as_api().and_then(ApiError::time_until_reset).is_some());

    let err = client.emails().get("em_1").await.unwrap_err();
    match err.as_api() {
        Some(ApiError::RateLimited { rate_limit }) => {
            assert_eq!(rate_limit.daily_remaining, 120);
            assert_eq!(rate_limit.retry_after_seconds, Some(3));
        }
        other => panic!("expected rate limited error, got {other:?}"),
    }
    assert_eq!(
        err.as_api().and_then(ApiError::retry_after),
        Some(Duration::from_secs(3))
    );
}

#[tokio::test]
async fn failed_calls_still_update_rate_limit_snapshot() {
    let server = MockServer::start().await;
    let mut template = ResponseTemplate::new(500).set_body_string("upstream exploded");
    for (name, value) in rate_limit_headers(10, 7, 5000, 4200) {
        template = template.insert_header(name, value.as_str());
    }
    Mock::given(method("GET"))
        .and(path("/v2/templates/tmpl_1"))
        .respond_with(template)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.templates().get("tmpl_1").await.unwrap_err();

    match err {
        Error::Api(ApiError::Server { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(
                message,
                "Server error: request failed with status code 500 (Internal Server Error)"
            );
        }
        other => panic!("expected server error, got {other:?}"),
    }
    let snapshot = client.last_rate_limit().expect("snapshot");
    assert_eq!(snapshot.limit, 10);
    assert_eq!(snapshot.remaining, 7);
    assert_eq!(snapshot.daily_remaining, 4200);
}

#[tokio::test]
async fn response_keys_match_case_insensitively() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/emails/em_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Id": "em_1", "Status": "sent"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/emails"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Data": [{"ID": "em_2", "STATUS": "delivered"}],
            "Has_More": false
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/domains/dom_1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"Message": "Invalid API key"})))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let email = client.emails().get("em_1").await.expect("get");
    assert_eq!(email.id, "em_1");
    assert_eq!(email.status, "sent");

    let page = client
        .emails()
        .list(&Default::default())
        .await
        .expect("list");
    assert_eq!(page.data[0].id, "em_2");
    assert_eq!(page.data[0].status, "delivered");

    let err = client.domains().get("dom_1").await.unwrap_err();
    match err {
        Error::Api(ApiError::Authentication { message }) => assert_eq!(message, "Invalid API key"),
        other => panic!("expected authentication error, got {other:?}"),
    }
}

#[tokio::test]
async fn mismatched_success_body_is_deserialization_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/emails/em_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .emails()
        .get("em_1")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Deserialization(_)), "got {err:?}");
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn cancelled_call_leaves_snapshot_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/emails/em_slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "em_slow", "status": "sent"}))
                .insert_header("ratelimit-remaining", "9")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let token = CancellationToken::new();
    let cancellable = client.with_cancellation(token.clone());

    let trigger = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
    });

    let err = cancellable.emails().get("em_slow").await.unwrap_err();
    trigger.await.expect("trigger task");

    assert!(err.is_cancelled(), "got {err:?}");
    assert!(client.last_rate_limit().is_none());
    assert!(cancellable.last_rate_limit().is_none());
}

#[tokio::test]
async fn cancel_propagates_caller_cancellation() {
    let server = MockServer::start().await;
    let client = test_client(&server.uri());
    let token = CancellationToken::new();
    token.cancel();

    let err = client
        .with_cancellation(token)
        .emails()
        .cancel("em_1")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled));
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    // Nothing listens on port 1.
    let client = test_client("http://127.0.0.1:1");
    let err = client.emails().get("em_1").await.unwrap_err();
    match err {
        Error::Transport(transport) => assert_eq!(transport.kind, TransportErrorKind::Connect),
        other => panic!("expected transport error, got {other:?}"),
    }
    assert!(client.last_rate_limit().is_none());
}

#[tokio::test]
async fn blank_ids_fail_before_any_request() {
    let server = MockServer::start().await;
    let client = test_client(&server.uri());

    let err = client.emails().get(" ").await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
    let err = client.emails().cancel("").await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    let requests = server.received_requests().await.expect("recorded");
    assert!(requests.is_empty());
}
