//! The five capability calls against a mock stack.

use crate::mock_server::MockStack;
use mockito::Matcher;
use serde_json::json;
use stack_client::{
    AgentStep, ChatOptions, EndpointPaths, ErrorKind, Message, Pipeline, TraceResult,
    DEFAULT_THINKING_BUDGET,
};

#[tokio::test]
async fn test_health_check() {
    let mut stack = MockStack::start().await;
    let mock = stack
        .mock_json(
            "GET",
            "/health",
            200,
            json!({"status": "ok", "services": {"llm": "up", "forecast": "up"}}),
        )
        .await;

    let client = stack.client().await;
    let health = client.health_check().await.unwrap();
    assert_eq!(health.status, "ok");
    assert!(health.is_healthy());
    assert_eq!(health.details["services"]["llm"], "up");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_trace_round_trip() {
    let mut stack = MockStack::start().await;
    let mock = stack
        .mock_exchange(
            "/trace",
            json!({"query": "Analyze the auth logic"}),
            json!({"answer": "X", "steps": [{"tool": "grep", "args": {"pattern": "auth"}}]}),
        )
        .await;

    let client = stack.client().await;
    let result = client.trace("Analyze the auth logic").await.unwrap();

    let mut args = serde_json::Map::new();
    args.insert("pattern".to_string(), json!("auth"));
    assert_eq!(
        result,
        TraceResult {
            answer: "X".to_string(),
            steps: vec![AgentStep {
                tool: "grep".to_string(),
                args,
            }],
        }
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_trace_keeps_step_order() {
    let mut stack = MockStack::start().await;
    let tools = ["list_files", "grep", "read_file", "grep", "summarize"];
    let steps: Vec<_> = tools
        .iter()
        .map(|t| json!({"tool": t, "args": {}}))
        .collect();
    let _mock = stack
        .mock_json("POST", "/trace", 200, json!({"answer": "done", "steps": steps}))
        .await;

    let client = stack.client().await;
    let result = client.trace("map the repo").await.unwrap();
    let got: Vec<&str> = result.steps.iter().map(|s| s.tool.as_str()).collect();
    assert_eq!(got, tools);
}

#[tokio::test]
async fn test_ask_with_pipeline() {
    let mut stack = MockStack::start().await;
    let mock = stack
        .mock_exchange(
            "/ask",
            json!({"query": "How are tokens refreshed?", "pipeline": "reranking"}),
            json!({
                "answer": "Hourly, by the refresh worker.",
                "sources": [
                    {"source": "docs/auth.md", "excerpt": "refreshed every hour", "score": 0.91},
                    {"source": "src/refresh.rs", "score": 0.47}
                ]
            }),
        )
        .await;

    let client = stack.client().await;
    let result = client
        .ask("How are tokens refreshed?", Pipeline::Reranking)
        .await
        .unwrap();
    assert_eq!(result.answer, "Hourly, by the refresh worker.");
    assert_eq!(result.pipeline, Pipeline::Reranking);
    let sources: Vec<&str> = result.sources.iter().map(|s| s.source.as_str()).collect();
    assert_eq!(sources, ["docs/auth.md", "src/refresh.rs"]);
    assert_eq!(result.sources[0].excerpt.as_deref(), Some("refreshed every hour"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_ask_without_sources() {
    let mut stack = MockStack::start().await;
    let _mock = stack
        .mock_json("POST", "/ask", 200, json!({"answer": "no idea"}))
        .await;

    let client = stack.client().await;
    let result = client.ask("q", Pipeline::Standard).await.unwrap();
    assert!(result.sources.is_empty());
    assert_eq!(result.pipeline, Pipeline::Standard);
}

#[tokio::test]
async fn test_chat_empty_messages_never_sends() {
    let mut stack = MockStack::start().await;
    let never = stack.mock_never("POST", "/chat").await;

    let client = stack.client().await;
    let err = client.chat(&[], ChatOptions::default()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    never.assert_async().await;
}

#[tokio::test]
async fn test_chat_thinking_substitutes_default_budget() {
    let mut stack = MockStack::start().await;
    let mock = stack
        .mock_exchange(
            "/chat",
            json!({
                "messages": [
                    {"role": "system", "content": "Be terse."},
                    {"role": "user", "content": "What is 6 * 7?"}
                ],
                "enable_thinking": true,
                "budget_tokens": DEFAULT_THINKING_BUDGET
            }),
            json!({
                "answer": "42",
                "thinking": "six sevens are forty-two",
                "usage": {"prompt_tokens": 20, "completion_tokens": 2, "total_tokens": 22}
            }),
        )
        .await;

    let client = stack.client().await;
    let messages = [Message::system("Be terse."), Message::user("What is 6 * 7?")];
    let result = client.chat(&messages, ChatOptions::thinking()).await.unwrap();
    assert_eq!(result.answer, "42");
    assert_eq!(result.thinking.as_deref(), Some("six sevens are forty-two"));
    assert_eq!(result.usage.unwrap().total_tokens, Some(22));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_chat_without_thinking() {
    let mut stack = MockStack::start().await;
    let mock = stack
        .mock_exchange(
            "/chat",
            json!({
                "messages": [{"role": "user", "content": "hi"}],
                "enable_thinking": false
            }),
            json!({"answer": "hello"}),
        )
        .await;

    let client = stack.client().await;
    let result = client
        .chat(&[Message::user("hi")], ChatOptions::default())
        .await
        .unwrap();
    assert_eq!(result.answer, "hello");
    assert_eq!(result.thinking, None);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_forecast_zero_context_never_sends() {
    let mut stack = MockStack::start().await;
    let never = stack.mock_never("POST", "/forecast").await;

    let client = stack.client().await;
    let err = client.forecast("cpu_load", 0, 20).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    let err = client.forecast("cpu_load", 300, 0).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    never.assert_async().await;
}

#[tokio::test]
async fn test_forecast_points_in_order() {
    let mut stack = MockStack::start().await;
    let points: Vec<f64> = (0..20).map(|i| 0.5 + i as f64 * 0.25).rev().collect();
    let mock = stack
        .mock_exchange(
            "/forecast",
            json!({"name": "cpu_load", "context_period_size": 300, "forecast_period_size": 20}),
            json!({"forecast": points.clone(), "model": "chronos", "context_end": "2026-10-01"}),
        )
        .await;

    let client = stack.client().await;
    let result = client.forecast("cpu_load", 300, 20).await.unwrap();
    assert_eq!(result.forecast.len(), 20);
    assert_eq!(result.forecast, points);
    assert_eq!(result.metadata["model"], "chronos");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_requests_carry_correlation_id() {
    let mut stack = MockStack::start().await;
    let mock = stack
        .server
        .mock("GET", "/health")
        .match_header(
            "x-request-id",
            Matcher::Regex("^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[0-9a-f]{4}-[0-9a-f]{12}$".into()),
        )
        .match_header("accept", "application/json")
        .with_status(200)
        .with_body(r#"{"status": "ok"}"#)
        .create_async()
        .await;

    let client = stack.client().await;
    client.health_check().await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_custom_paths() {
    let mut stack = MockStack::start().await;
    let mock = stack
        .mock_json("POST", "/v2/agent/trace", 200, json!({"answer": "ok"}))
        .await;

    let client = stack
        .builder()
        .paths(EndpointPaths {
            trace: "v2/agent/trace".to_string(),
            ..EndpointPaths::default()
        })
        .build()
        .await
        .unwrap();
    assert_eq!(client.trace("q").await.unwrap().answer, "ok");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_sequential_calls_share_one_client() {
    let mut stack = MockStack::start().await;
    let health = stack
        .server
        .mock("GET", "/health")
        .with_status(200)
        .with_body(r#"{"status": "ok"}"#)
        .expect(3)
        .create_async()
        .await;

    let client = stack.client().await;
    for _ in 0..3 {
        assert!(client.health_check().await.unwrap().is_healthy());
    }
    health.assert_async().await;
}
