use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use reelchat_engine::{
    DispatchError, DispatchSettings, FailureKind, Payload, ReqwestDispatcher, WebhookDispatcher,
};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn dispatcher(endpoints: Vec<String>) -> ReqwestDispatcher {
    ReqwestDispatcher::new(DispatchSettings {
        endpoints,
        ..DispatchSettings::default()
    })
}

#[tokio::test]
async fn posts_json_body_with_headers_and_extracts_url() {
    let server = MockServer::start().await;
    let now = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(header("content-type", "application/json"))
        .and(header("accept", "application/json"))
        .and(body_partial_json(json!({
            "chatInput": "lighthouses",
            "message": "lighthouses",
            "timestamp": "2026-01-02T03:04:05.000Z",
            "sessionId": format!("session_{}", now.timestamp_millis()),
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "publicUrl": "https://x/a.mp4"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = dispatcher(vec![format!("{}/hook", server.uri())])
        .with_clock(Arc::new(move || now));
    let delivery = dispatcher
        .dispatch("lighthouses", &CancellationToken::new())
        .await
        .expect("dispatch ok");

    assert_eq!(delivery.status, 200);
    assert_eq!(delivery.video_url.as_deref(), Some("https://x/a.mp4"));
    assert_eq!(delivery.payload, Payload::Json(json!({"publicUrl": "https://x/a.mp4"})));
}

#[tokio::test]
async fn failing_endpoints_are_skipped_until_one_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/up"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "response": {"url": "https://x/b.mov"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/never"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dispatcher = dispatcher(vec![
        "not a url".to_string(),
        "http://127.0.0.1:9/refused".to_string(),
        format!("{}/down", server.uri()),
        format!("{}/up", server.uri()),
        format!("{}/never", server.uri()),
    ]);
    let delivery = dispatcher
        .dispatch("bridges", &CancellationToken::new())
        .await
        .expect("dispatch ok");

    assert_eq!(delivery.endpoint, format!("{}/up", server.uri()));
    assert_eq!(delivery.status, 201);
    assert_eq!(delivery.video_url.as_deref(), Some("https://x/b.mov"));
}

#[tokio::test]
async fn all_endpoints_failing_aggregates_reasons() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let a = format!("{}/a", server.uri());
    let b = format!("{}/b", server.uri());
    let err = dispatcher(vec![a.clone(), b.clone()])
        .dispatch("x", &CancellationToken::new())
        .await
        .unwrap_err();

    let DispatchError::AllEndpointsFailed(failures) = &err else {
        panic!("unexpected error: {err:?}");
    };
    let kinds: Vec<_> = failures.iter().map(|f| f.kind.clone()).collect();
    assert_eq!(kinds, vec![FailureKind::HttpStatus(500), FailureKind::HttpStatus(404)]);
    assert_eq!(
        err.to_string(),
        format!("All webhook URLs failed ({a}: http status 500; {b}: http status 404)")
    );
}

#[tokio::test]
async fn slow_endpoint_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(2))
                .set_body_string("late"),
        )
        .mount(&server)
        .await;

    let dispatcher = ReqwestDispatcher::new(DispatchSettings {
        endpoints: vec![format!("{}/slow", server.uri())],
        request_timeout: Duration::from_millis(100),
        ..DispatchSettings::default()
    });
    let err = dispatcher
        .dispatch("x", &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err, DispatchError::Timeout);
    assert_eq!(err.to_string(), "Request timeout");
}

#[tokio::test]
async fn text_body_is_searched_for_video_links() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "Uploaded to https://acct.blob.core.windows.net/c.mp4 just now",
            "text/plain",
        ))
        .mount(&server)
        .await;

    let delivery = dispatcher(vec![server.uri()])
        .dispatch("x", &CancellationToken::new())
        .await
        .expect("dispatch ok");
    assert_eq!(
        delivery.video_url.as_deref(),
        Some("https://acct.blob.core.windows.net/c.mp4")
    );
}

#[tokio::test]
async fn oversized_body_counts_as_endpoint_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("0123456789abcdef"))
        .mount(&server)
        .await;

    let dispatcher = ReqwestDispatcher::new(DispatchSettings {
        endpoints: vec![server.uri()],
        max_bytes: 8,
        ..DispatchSettings::default()
    });
    let err = dispatcher
        .dispatch("x", &CancellationToken::new())
        .await
        .unwrap_err();
    let DispatchError::AllEndpointsFailed(failures) = err else {
        panic!("expected endpoint failure");
    };
    assert!(matches!(failures[0].kind, FailureKind::TooLarge { max_bytes: 8, .. }));
}

#[tokio::test]
async fn no_endpoints_and_cancellation_fail_fast() {
    let err = dispatcher(Vec::new())
        .dispatch("x", &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err, DispatchError::NoEndpoints);

    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = dispatcher(vec!["http://127.0.0.1:9/".to_string()])
        .dispatch("x", &cancel)
        .await
        .unwrap_err();
    assert_eq!(err, DispatchError::Cancelled);
}
