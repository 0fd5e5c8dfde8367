//! Failure translation: every failure surfaces as one of the four error kinds.

use crate::mock_server::{truncating_server, MockStack};
use serde_json::json;
use stack_client::{Error, ErrorKind, Pipeline, StackClientBuilder, TraceRequest};
use std::io::Write;
use std::time::Duration;

#[tokio::test]
async fn test_rate_limited_ask_is_api_error() {
    let mut stack = MockStack::start().await;
    let _mock = stack
        .mock_json(
            "POST",
            "/ask",
            429,
            json!({"code": "rate_limited", "message": "slow down"}),
        )
        .await;

    let client = stack.client().await;
    match client.ask("q", Pipeline::Standard).await {
        Err(Error::Api {
            status,
            code,
            message,
        }) => {
            assert_eq!(status, 429);
            assert_eq!(code.as_deref(), Some("rate_limited"));
            assert_eq!(message, "slow down");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unstructured_server_error_is_api_error() {
    let mut stack = MockStack::start().await;
    let _mock = stack
        .server
        .mock("POST", "/forecast")
        .with_status(500)
        .with_header("content-type", "text/html")
        .with_body("<h1>Internal Server Error</h1>")
        .create_async()
        .await;

    let client = stack.client().await;
    let err = client.forecast("cpu_load", 300, 20).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Api);
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.code(), None);
}

#[tokio::test]
async fn test_missing_answer_is_decode_error() {
    let mut stack = MockStack::start().await;
    let _mock = stack
        .mock_json("POST", "/ask", 200, json!({"sources": [{"source": "a.md"}]}))
        .await;

    let client = stack.client().await;
    let err = client.ask("q", Pipeline::Standard).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert_eq!(
        err.context().and_then(|c| c.field_path.as_deref()),
        Some("answer")
    );
}

#[tokio::test]
async fn test_non_json_success_is_decode_error() {
    let mut stack = MockStack::start().await;
    let _mock = stack
        .server
        .mock("POST", "/chat")
        .with_status(200)
        .with_body("pong")
        .create_async()
        .await;

    let client = stack.client().await;
    let err = client
        .chat(
            &[stack_client::Message::user("ping")],
            stack_client::ChatOptions::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[tokio::test]
async fn test_timeout_is_connection_error_and_session_survives() {
    let mut stack = MockStack::start().await;
    let _slow = stack
        .server
        .mock("POST", "/trace")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_chunked_body(|w| {
            std::thread::sleep(Duration::from_millis(1500));
            w.write_all(br#"{"answer": "late"}"#)
        })
        .create_async()
        .await;
    let _health = stack
        .mock_json("GET", "/health", 200, json!({"status": "ok"}))
        .await;

    let client = stack.client().await;
    let err = client
        .execute_with_timeout(&TraceRequest::new("slow one"), Duration::from_millis(200))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
    assert!(err.to_string().contains("timed out"), "{}", err);

    assert!(client.is_open());
    assert_eq!(client.health_check().await.unwrap().status, "ok");
}

#[tokio::test]
async fn test_truncated_response_is_connection_error() {
    let base_url = truncating_server().await;
    let client = StackClientBuilder::new()
        .base_url(&base_url)
        .verify_on_open(false)
        .timeout(Duration::from_secs(5))
        .build()
        .await
        .unwrap();

    let err = client.trace("Analyze the auth logic").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
}

#[tokio::test]
async fn test_callers_can_branch_on_kind() {
    let mut stack = MockStack::start().await;
    let _mock = stack
        .mock_json("POST", "/trace", 503, json!({"detail": "model loading"}))
        .await;

    let client = stack.client().await;
    let verdict = match client.trace("q").await {
        Ok(_) => "ok",
        Err(e) => match e.kind() {
            ErrorKind::Connection => "stack not running",
            ErrorKind::Api => "request rejected",
            ErrorKind::InvalidArgument => "fix the input",
            ErrorKind::Decode => "client and stack disagree",
        },
    };
    assert_eq!(verdict, "request rejected");
}
