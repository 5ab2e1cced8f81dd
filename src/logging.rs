//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes, to_bytes},
    extract::{FromRequest, Request},
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// The maximum number of bytes of a body logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// The largest request body the middleware will buffer.
///
/// This is axum's default body limit, which [Bytes] extraction enforces when
/// no `DefaultBodyLimit` layer overrides it.
pub const REQUEST_BODY_SIZE_LIMIT: usize = 2 * 1024 * 1024;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If the response body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and logged at the `debug` level.
/// Passwords in form bodies and access tokens in JSON bodies are redacted.
///
/// Bodies are passed on byte for byte, only the logged copy is decoded.
/// Request bodies larger than [REQUEST_BODY_SIZE_LIMIT] are rejected with
/// `413 Payload Too Large`.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match read_request_body(body).await {
        Ok(body_bytes) => body_bytes,
        Err(response) => return response,
    };

    let body_text = String::from_utf8_lossy(&body_bytes);
    if is_form(&parts.headers) {
        log_request(&parts, &redact_form_field(&body_text, "password"));
    } else {
        log_request(&parts, &body_text);
    }

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match to_bytes(body, usize::MAX).await {
        Ok(body_bytes) => body_bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    log_response(
        &parts,
        &redact_json_field(&String::from_utf8_lossy(&body_bytes), "access_token"),
    );

    Response::from_parts(parts, Body::from(body_bytes))
}

/// Buffer a request body of at most [REQUEST_BODY_SIZE_LIMIT] bytes.
///
/// The error is the response to send instead, e.g. `413 Payload Too Large`.
async fn read_request_body(body: Body) -> Result<Bytes, Response> {
    let limited = Request::new(body);

    Bytes::from_request(limited, &()).await.map_err(|rejection| {
        tracing::warn!("Could not read request body: {rejection}");
        rejection.into_response()
    })
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|content_type| content_type.to_str().ok())
        .is_some_and(|content_type| content_type.starts_with("application/x-www-form-urlencoded"))
}

fn redact_form_field(form_text: &str, field_name: &str) -> String {
    let prefix = format!("{field_name}=");

    form_text
        .split('&')
        .map(|pair| {
            if pair.starts_with(&prefix) {
                format!("{prefix}********")
            } else {
                pair.to_owned()
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn redact_json_field(json_text: &str, field_name: &str) -> String {
    let key = format!("\"{field_name}\":\"");

    let value_start = match json_text.find(&key) {
        Some(key_start) => key_start + key.len(),
        None => return json_text.to_string(),
    };
    let value_end = match json_text[value_start..].find('"') {
        Some(end) => value_start + end,
        None => return json_text.to_string(),
    };

    format!(
        "{}********{}",
        &json_text[..value_start],
        &json_text[value_end..]
    )
}

fn truncate(body: &str) -> &str {
    match body.char_indices().nth(LOG_BODY_LENGTH_LIMIT) {
        Some((end, _)) => &body[..end],
        None => body,
    }
}

fn log_request(parts: &axum::http::request::Parts, body: &str) {
    let method = &parts.method;
    let uri = &parts.uri;

    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!("Received request: {method} {uri}\nbody: {}...", truncate(body));
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!("Received request: {method} {uri}\nbody: {body:?}");
    }
}

fn log_response(parts: &axum::http::response::Parts, body: &str) {
    let status = parts.status;

    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!("Sending response: {status}\nbody: {}...", truncate(body));
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {status}\nbody: {body:?}");
    }
}
