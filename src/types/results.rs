//! Result value objects returned by the capability calls.
//!
//! These are built only by the response decoder; callers read them.

use super::pipeline::Pipeline;
use serde::Serialize;
use serde_json::{Map, Value};

/// Reply of the health probe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthStatus {
    pub status: String,
    /// Every other field the stack reported (versions, loaded models, ...).
    pub details: Map<String, Value>,
}

impl HealthStatus {
    /// `true` for the usual "everything is fine" spellings.
    pub fn is_healthy(&self) -> bool {
        matches!(
            self.status.to_ascii_lowercase().as_str(),
            "ok" | "healthy" | "up" | "ready" | "pass"
        )
    }
}

/// One tool invocation made by the agent, in execution order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentStep {
    pub tool: String,
    pub args: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceResult {
    pub answer: String,
    pub steps: Vec<AgentStep>,
}

/// A retrieved document backing an [`AskResult`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Source {
    pub source: String,
    pub excerpt: Option<String>,
    pub score: Option<f64>,
    /// Any additional per-source fields.
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AskResult {
    pub answer: String,
    pub sources: Vec<Source>,
    /// Pipeline reported by the stack, or the one requested when it reports none.
    pub pipeline: Pipeline,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenUsage {
    pub prompt_tokens: Option<u64>,
    pub completion_tokens: Option<u64>,
    pub thinking_tokens: Option<u64>,
    pub total_tokens: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatResult {
    pub answer: String,
    /// Extended reasoning trace; only present when thinking mode was honored.
    pub thinking: Option<String>,
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    /// Forecast points in the order the stack produced them.
    pub forecast: Vec<f64>,
    /// Context metadata: every response field other than `forecast`.
    pub metadata: Map<String, Value>,
}

impl ForecastResult {
    pub fn len(&self) -> usize {
        self.forecast.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forecast.is_empty()
    }
}
