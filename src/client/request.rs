//! Request codec: one request type per capability.
//!
//! `encode` validates everything the client can check locally and produces
//! the JSON body. It never touches the network, so a rejected request costs
//! the stack nothing.

use super::decode;
use crate::config::EndpointPaths;
use crate::transport::Method;
use crate::types::{
    AskResult, ChatResult, ForecastResult, HealthStatus, Message, Pipeline, TraceResult,
};
use crate::{Error, ErrorContext, Result};
use serde_json::{json, Value};

/// Thinking budget sent when thinking is enabled without an explicit budget.
///
/// The stack decides whether thinking is honored; the budget is only a cap.
pub const DEFAULT_THINKING_BUDGET: u32 = 1024;

/// The five capability endpoints of the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Health,
    Trace,
    Ask,
    Chat,
    Forecast,
}

impl Endpoint {
    pub fn method(&self) -> Method {
        match self {
            Endpoint::Health => Method::Get,
            _ => Method::Post,
        }
    }

    pub fn path<'a>(&self, paths: &'a EndpointPaths) -> &'a str {
        match self {
            Endpoint::Health => &paths.health,
            Endpoint::Trace => &paths.trace,
            Endpoint::Ask => &paths.ask,
            Endpoint::Chat => &paths.chat,
            Endpoint::Forecast => &paths.forecast,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::Health => "health_check",
            Endpoint::Trace => "trace",
            Endpoint::Ask => "ask",
            Endpoint::Chat => "chat",
            Endpoint::Forecast => "forecast",
        }
    }
}

/// A typed request to one capability of the stack.
pub trait StackRequest {
    type Output;

    fn endpoint(&self) -> Endpoint;

    /// Validate and build the wire body (`None` for body-less requests).
    fn encode(&self) -> Result<Option<Value>>;

    /// Decode a successful response body.
    fn decode(&self, body: &[u8]) -> Result<Self::Output>;
}

/// Health probe. No body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HealthRequest;

impl StackRequest for HealthRequest {
    type Output = HealthStatus;

    fn endpoint(&self) -> Endpoint {
        Endpoint::Health
    }

    fn encode(&self) -> Result<Option<Value>> {
        Ok(None)
    }

    fn decode(&self, body: &[u8]) -> Result<HealthStatus> {
        decode::decode_health(body)
    }
}

/// Autonomous agent run over the stack's tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRequest {
    pub query: String,
}

impl TraceRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

impl StackRequest for TraceRequest {
    type Output = TraceResult;

    fn endpoint(&self) -> Endpoint {
        Endpoint::Trace
    }

    fn encode(&self) -> Result<Option<Value>> {
        require_text("query", &self.query)?;
        Ok(Some(json!({ "query": self.query })))
    }

    fn decode(&self, body: &[u8]) -> Result<TraceResult> {
        decode::decode_trace(body)
    }
}

/// Retrieval-augmented question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskRequest {
    pub query: String,
    pub pipeline: Pipeline,
}

impl AskRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            pipeline: Pipeline::default(),
        }
    }

    pub fn pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }
}

impl StackRequest for AskRequest {
    type Output = AskResult;

    fn endpoint(&self) -> Endpoint {
        Endpoint::Ask
    }

    fn encode(&self) -> Result<Option<Value>> {
        require_text("query", &self.query)?;
        Ok(Some(json!({
            "query": self.query,
            "pipeline": self.pipeline.as_str(),
        })))
    }

    fn decode(&self, body: &[u8]) -> Result<AskResult> {
        decode::decode_ask(body, self.pipeline)
    }
}

/// Thinking-mode switches for a chat call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChatOptions {
    pub enable_thinking: bool,
    pub budget_tokens: Option<u32>,
}

impl ChatOptions {
    /// Thinking enabled with the default budget.
    pub fn thinking() -> Self {
        Self {
            enable_thinking: true,
            budget_tokens: None,
        }
    }

    pub fn enable_thinking(mut self, enable: bool) -> Self {
        self.enable_thinking = enable;
        self
    }

    pub fn budget_tokens(mut self, budget: u32) -> Self {
        self.budget_tokens = Some(budget);
        self
    }

    /// Budget that goes on the wire, if any.
    pub fn effective_budget(&self) -> Option<u32> {
        match (self.enable_thinking, self.budget_tokens) {
            (_, Some(budget)) => Some(budget),
            (true, None) => Some(DEFAULT_THINKING_BUDGET),
            (false, None) => None,
        }
    }
}

/// Direct conversation with the stack's model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    pub options: ChatOptions,
}

impl ChatRequest {
    pub fn new(messages: impl Into<Vec<Message>>) -> Self {
        Self {
            messages: messages.into(),
            options: ChatOptions::default(),
        }
    }

    pub fn options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }
}

impl StackRequest for ChatRequest {
    type Output = ChatResult;

    fn endpoint(&self) -> Endpoint {
        Endpoint::Chat
    }

    fn encode(&self) -> Result<Option<Value>> {
        if self.messages.is_empty() {
            return Err(invalid("messages", "at least one message is required"));
        }
        if self.options.budget_tokens == Some(0) {
            return Err(invalid("budget_tokens", "budget must be a positive integer"));
        }

        let mut body = json!({
            "messages": self.messages,
            "enable_thinking": self.options.enable_thinking,
        });
        if let Some(budget) = self.options.effective_budget() {
            body["budget_tokens"] = json!(budget);
        }
        Ok(Some(body))
    }

    fn decode(&self, body: &[u8]) -> Result<ChatResult> {
        decode::decode_chat(body)
    }
}

/// Timeseries forecast over a named series known to the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastRequest {
    pub name: String,
    pub context_period_size: u32,
    pub forecast_period_size: u32,
}

impl ForecastRequest {
    pub fn new(name: impl Into<String>, context_period_size: u32, forecast_period_size: u32) -> Self {
        Self {
            name: name.into(),
            context_period_size,
            forecast_period_size,
        }
    }
}

impl StackRequest for ForecastRequest {
    type Output = ForecastResult;

    fn endpoint(&self) -> Endpoint {
        Endpoint::Forecast
    }

    fn encode(&self) -> Result<Option<Value>> {
        require_text("name", &self.name)?;
        if self.context_period_size == 0 {
            return Err(invalid("context_period_size", "must be a positive integer"));
        }
        if self.forecast_period_size == 0 {
            return Err(invalid("forecast_period_size", "must be a positive integer"));
        }
        Ok(Some(json!({
            "name": self.name,
            "context_period_size": self.context_period_size,
            "forecast_period_size": self.forecast_period_size,
        })))
    }

    fn decode(&self, body: &[u8]) -> Result<ForecastResult> {
        decode::decode_forecast(body)
    }
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, "must not be empty"));
    }
    Ok(())
}

fn invalid(field: &str, message: &str) -> Error {
    Error::invalid_argument_with_context(
        format!("{}: {}", field, message),
        ErrorContext::new()
            .with_field_path(field)
            .with_source("request_codec"),
    )
}
