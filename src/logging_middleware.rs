// src/logging_middleware.rs
//! Middleware for logging JSON request and response bodies at debug level

use axum::body::to_bytes;
use axum::{
    body::Body,
    extract::Request,
    http::{
        header::{CONTENT_LENGTH, CONTENT_TYPE},
        HeaderMap, StatusCode,
    },
    middleware::Next,
    response::Response,
};
use serde_json::Value;
use tracing::{debug, enabled, Level};

/// Request bodies above this size, or of unknown size, pass through unlogged
const MAX_LOGGED_BODY: usize = 1024 * 1024;

const REDACTED_FIELDS: [&str; 2] = ["password", "password_hash"];

/// Logs JSON bodies with password fields masked. A no-op unless debug logging is on.
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    if !enabled!(Level::DEBUG) {
        return Ok(next.run(request).await);
    }

    let request = if should_buffer(request.headers()) {
        let (parts, body) = request.into_parts();
        let bytes = to_bytes(body, MAX_LOGGED_BODY)
            .await
            .map_err(|_| StatusCode::BAD_REQUEST)?;

        if let Some(logged) = redacted_json(&bytes) {
            debug!(method = %parts.method, uri = %parts.uri, request_body = %logged, "Request");
        }
        Request::from_parts(parts, Body::from(bytes))
    } else {
        request
    };

    let response = next.run(request).await;
    if !is_json(response.headers()) {
        return Ok(response);
    }

    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if let Some(logged) = redacted_json(&bytes) {
        debug!(status = %parts.status, response_body = %logged, "Response");
    }

    Ok(Response::from_parts(parts, Body::from(bytes)))
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |ct| ct.starts_with("application/json"))
}

/// JSON request with a declared length the logger is willing to hold
fn should_buffer(headers: &HeaderMap) -> bool {
    let declared_len = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());

    is_json(headers) && matches!(declared_len, Some(len) if len <= MAX_LOGGED_BODY)
}

/// Compact JSON with sensitive fields masked; `None` for empty or non-JSON bodies
fn redacted_json(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }
    let mut json: Value = serde_json::from_slice(bytes).ok()?;
    redact(&mut json);
    Some(json.to_string())
}

fn redact(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, v) in map.iter_mut() {
                if REDACTED_FIELDS.contains(&key.as_str()) {
                    *v = Value::String("***".to_string());
                } else {
                    redact(v);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact),
        _ => {}
    }
}
