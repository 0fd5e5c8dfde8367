//! Response decoding: strict JSON → result types.
//!
//! Required fields that are absent or mistyped fail with [`Error::Decode`]
//! naming the offending path. Optional fields (`steps`, `sources`, `thinking`,
//! `usage`) default to empty/absent when missing or `null`. Sequence order is
//! kept exactly as received.

use crate::types::{
    AgentStep, AskResult, ChatResult, ForecastResult, HealthStatus, Pipeline, Source, TokenUsage,
    TraceResult,
};
use crate::{Error, ErrorContext, Result};
use serde_json::{Map, Value};

type Object = Map<String, Value>;

pub fn decode_health(body: &[u8]) -> Result<HealthStatus> {
    let mut obj = parse_object(body)?;
    let status = required_str(&obj, "status", "status")?;
    obj.remove("status");
    Ok(HealthStatus {
        status,
        details: obj,
    })
}

pub fn decode_trace(body: &[u8]) -> Result<TraceResult> {
    let obj = parse_object(body)?;
    let answer = required_str(&obj, "answer", "answer")?;
    let steps = optional_array(&obj, "steps", "steps")?
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            let path = format!("steps[{}]", i);
            let step = as_object(raw, &path)?;
            Ok(AgentStep {
                tool: required_str(step, "tool", &format!("{}.tool", path))?,
                args: required_object(step, "args", &format!("{}.args", path))?.clone(),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(TraceResult { answer, steps })
}

/// `requested` fills [`AskResult::pipeline`] when the stack does not echo it.
pub fn decode_ask(body: &[u8], requested: Pipeline) -> Result<AskResult> {
    let obj = parse_object(body)?;
    let answer = required_str(&obj, "answer", "answer")?;
    let sources = optional_array(&obj, "sources", "sources")?
        .iter()
        .enumerate()
        .map(|(i, raw)| decode_source(raw, &format!("sources[{}]", i)))
        .collect::<Result<Vec<_>>>()?;
    let pipeline = match optional_str(&obj, "pipeline", "pipeline")? {
        Some(name) => name.parse::<Pipeline>().map_err(|_| {
            decode_error(
                "pipeline",
                format!("unknown pipeline {:?} in response", name),
            )
        })?,
        None => requested,
    };
    Ok(AskResult {
        answer,
        sources,
        pipeline,
    })
}

/// Alternate spellings accepted for the excerpt when they hold plain text.
const EXCERPT_ALIASES: &[&str] = &["content", "text", "snippet"];

fn decode_source(raw: &Value, path: &str) -> Result<Source> {
    let mut obj = as_object(raw, path)?.clone();
    let source = required_str(&obj, "source", &format!("{}.source", path))?;
    obj.remove("source");

    let mut excerpt = optional_str(&obj, "excerpt", &format!("{}.excerpt", path))?;
    obj.remove("excerpt");
    if excerpt.is_none() {
        // Aliases are open fields; anything but a string stays in `extra`.
        for key in EXCERPT_ALIASES {
            if let Some(Value::String(text)) = obj.get(*key) {
                excerpt = Some(text.clone());
                obj.remove(*key);
                break;
            }
        }
    }

    let score = optional_f64(&obj, "score", &format!("{}.score", path))?;
    obj.remove("score");

    Ok(Source {
        source,
        excerpt,
        score,
        extra: obj,
    })
}

pub fn decode_chat(body: &[u8]) -> Result<ChatResult> {
    let obj = parse_object(body)?;
    let answer = required_str(&obj, "answer", "answer")?;
    let thinking = optional_str(&obj, "thinking", "thinking")?;
    let usage = match obj.get("usage") {
        None | Some(Value::Null) => None,
        Some(raw) => {
            let usage = as_object(raw, "usage")?;
            Some(TokenUsage {
                prompt_tokens: optional_u64(usage, &["prompt_tokens", "input_tokens"], "usage")?,
                completion_tokens: optional_u64(
                    usage,
                    &["completion_tokens", "output_tokens"],
                    "usage",
                )?,
                thinking_tokens: optional_u64(
                    usage,
                    &["thinking_tokens", "reasoning_tokens"],
                    "usage",
                )?,
                total_tokens: optional_u64(usage, &["total_tokens"], "usage")?,
            })
        }
    };
    Ok(ChatResult {
        answer,
        thinking,
        usage,
    })
}

pub fn decode_forecast(body: &[u8]) -> Result<ForecastResult> {
    let mut obj = parse_object(body)?;
    let points = match obj.remove("forecast") {
        Some(Value::Array(points)) => points,
        Some(other) => {
            return Err(decode_error(
                "forecast",
                format!("expected an array, got {}", type_name(&other)),
            ))
        }
        None => return Err(missing("forecast")),
    };
    let forecast = points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            p.as_f64().ok_or_else(|| {
                decode_error(
                    format!("forecast[{}]", i),
                    format!("expected a number, got {}", type_name(p)),
                )
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(ForecastResult {
        forecast,
        metadata: obj,
    })
}

// --- helpers ---------------------------------------------------------------

fn parse_object(body: &[u8]) -> Result<Object> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(obj)) => Ok(obj),
        Ok(other) => Err(Error::decode_with_context(
            format!("expected a JSON object, got {}", type_name(&other)),
            ErrorContext::new().with_source("response_decoder"),
        )),
        Err(e) => Err(Error::decode_with_context(
            format!("response is not valid JSON: {}", e),
            ErrorContext::new()
                .with_details(preview(body))
                .with_source("response_decoder"),
        )),
    }
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Object> {
    value.as_object().ok_or_else(|| {
        decode_error(path, format!("expected an object, got {}", type_name(value)))
    })
}

fn required_str(obj: &Object, key: &str, path: &str) -> Result<String> {
    match obj.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(decode_error(
            path,
            format!("expected a string, got {}", type_name(other)),
        )),
        None => Err(missing(path)),
    }
}

fn optional_str(obj: &Object, key: &str, path: &str) -> Result<Option<String>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(decode_error(
            path,
            format!("expected a string, got {}", type_name(other)),
        )),
    }
}

fn required_object<'a>(obj: &'a Object, key: &str, path: &str) -> Result<&'a Object> {
    match obj.get(key) {
        Some(value) => as_object(value, path),
        None => Err(missing(path)),
    }
}

fn optional_array<'a>(obj: &'a Object, key: &str, path: &str) -> Result<&'a [Value]> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(other) => Err(decode_error(
            path,
            format!("expected an array, got {}", type_name(other)),
        )),
    }
}

fn optional_f64(obj: &Object, key: &str, path: &str) -> Result<Option<f64>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_f64().map(Some).ok_or_else(|| {
            decode_error(path, format!("expected a number, got {}", type_name(value)))
        }),
    }
}

/// First present key wins; aliases cover the common usage spellings.
fn optional_u64(obj: &Object, keys: &[&str], parent: &str) -> Result<Option<u64>> {
    for key in keys {
        match obj.get(*key) {
            None | Some(Value::Null) => continue,
            Some(value) => {
                return value.as_u64().map(Some).ok_or_else(|| {
                    decode_error(
                        format!("{}.{}", parent, key),
                        format!("expected a non-negative integer, got {}", type_name(value)),
                    )
                })
            }
        }
    }
    Ok(None)
}

fn missing(path: &str) -> Error {
    decode_error(path, format!("missing required field `{}`", path))
}

fn decode_error(path: impl Into<String>, message: impl Into<String>) -> Error {
    Error::decode_with_context(
        message,
        ErrorContext::new()
            .with_field_path(path)
            .with_source("response_decoder"),
    )
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn preview(body: &[u8]) -> String {
    const MAX: usize = 120;
    let text = String::from_utf8_lossy(body);
    if text.chars().count() > MAX {
        format!("{}...", text.chars().take(MAX).collect::<String>())
    } else {
        text.into_owned()
    }
}
