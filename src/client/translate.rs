//! Error translation: maps transport failures and non-success replies onto
//! the four [`Error`] kinds.

use crate::transport::RawResponse;
use crate::{Error, ErrorContext, Result};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::warn;

/// Classify a reqwest failure. Every variant becomes [`Error::Connection`];
/// the message says which stage failed.
pub(crate) fn transport_error(err: &reqwest::Error, url: &str, timeout: Duration) -> Error {
    let message = if err.is_timeout() {
        format!("request timed out after {:?}", timeout)
    } else if err.is_connect() {
        "cannot connect to the stack; is it running?".to_string()
    } else if err.is_body() || err.is_decode() {
        "connection dropped before the response completed".to_string()
    } else if err.is_builder() {
        "request could not be built".to_string()
    } else {
        "request failed".to_string()
    };

    Error::connection_with_context(
        message,
        ErrorContext::new()
            .with_details(format!("{}: {}", url, root_cause(err)))
            .with_source("transport"),
    )
}

fn root_cause(err: &(dyn std::error::Error + 'static)) -> String {
    let mut current = err;
    while let Some(next) = current.source() {
        current = next;
    }
    current.to_string()
}

/// Pass 2xx responses through; turn anything else into [`Error::Api`].
pub(crate) fn ensure_success(raw: RawResponse) -> Result<RawResponse> {
    if raw.is_success() {
        return Ok(raw);
    }
    let err = api_error(raw.status, &raw.body);
    warn!(
        request_id = %raw.request_id,
        status = raw.status,
        code = err.code().unwrap_or("-"),
        "stack rejected request"
    );
    Err(err)
}

/// Build an [`Error::Api`] from a status and whatever error body came with it.
///
/// Recognized shapes: `{"code", "message"}`, `{"error": {"code", "message"}}`,
/// `{"error": "..."}`, `{"detail": ...}` and `{"status", "message"}`. Anything
/// else keeps the raw text as message and carries no code.
pub(crate) fn api_error(status: u16, body: &[u8]) -> Error {
    let (code, message) = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(obj)) => structured_error(&obj),
        _ => (None, None),
    };

    let message = message
        .or_else(|| {
            let text = String::from_utf8_lossy(body).trim().to_string();
            (!text.is_empty()).then_some(text)
        })
        .or_else(|| {
            reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("HTTP {}", status));

    Error::api(status, code, message)
}

fn structured_error(obj: &Map<String, Value>) -> (Option<String>, Option<String>) {
    let nested = match obj.get("error") {
        Some(Value::Object(inner)) => Some(inner),
        _ => None,
    };
    let src = nested.unwrap_or(obj);

    let mut code = scalar_field(src, &["code", "error_code", "type"]);
    let mut message = scalar_field(src, &["message", "msg"]);

    if let Some(Value::String(e)) = obj.get("error") {
        // {"error": "rate_limited", "message": "..."} vs {"error": "something broke"}
        if message.is_some() && code.is_none() {
            code = Some(e.clone());
        } else if message.is_none() {
            message = Some(e.clone());
        }
    }

    if message.is_none() {
        message = match obj.get("detail") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };
    }

    if code.is_none() {
        code = match obj.get("status") {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        };
    }

    (code, message)
}

fn scalar_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match obj.get(*k) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
