//! Middleware for logging requests and responses.

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, HeaderValue, StatusCode, header::COOKIE},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{Error, identity::SESSION_COOKIE};

/// Bodies longer than this many characters are truncated in the `info` logs.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

const REDACTED: &str = "********";

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] characters, it is
/// truncated and the full body is logged at the `debug` level.
///
/// The value of the session cookie is never written to the logs.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::debug!("Could not read request body: {error}");
            return Error::BadRequest("could not read request body".to_owned()).into_response();
        }
    };

    log_request(
        &parts.method,
        &parts.uri,
        &redact_session_cookie(&parts.headers),
        &String::from_utf8_lossy(&body_bytes),
    );

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    log_response(
        parts.status,
        &parts.headers,
        &String::from_utf8_lossy(&body_bytes),
    );

    Response::from_parts(parts, Body::from(body_bytes))
}

/// Copy `headers`, replacing the session cookie's value so it can be logged.
fn redact_session_cookie(headers: &HeaderMap) -> HeaderMap {
    let mut redacted = headers.clone();
    redacted.remove(COOKIE);

    for value in headers.get_all(COOKIE) {
        let Ok(text) = value.to_str() else {
            redacted.append(COOKIE, HeaderValue::from_static(REDACTED));
            continue;
        };

        let cookies = text
            .split(';')
            .map(|pair| match pair.trim().split_once('=') {
                Some((name, _)) if name == SESSION_COOKIE => format!("{name}={REDACTED}"),
                _ => pair.trim().to_owned(),
            })
            .collect::<Vec<_>>()
            .join("; ");

        match HeaderValue::from_str(&cookies) {
            Ok(value) => redacted.append(COOKIE, value),
            Err(_) => redacted.append(COOKIE, HeaderValue::from_static(REDACTED)),
        };
    }

    redacted
}

/// Return the first [LOG_BODY_LENGTH_LIMIT] characters of `body` and whether it was cut short.
fn truncate_body(body: &str) -> (String, bool) {
    let mut chars = body.chars();
    let head: String = chars.by_ref().take(LOG_BODY_LENGTH_LIMIT).collect();

    (head, chars.next().is_some())
}

fn log_request(
    method: &axum::http::Method,
    uri: &axum::http::Uri,
    headers: &HeaderMap,
    body: &str,
) {
    let (head, truncated) = truncate_body(body);

    if truncated {
        tracing::info!("Received request: {method} {uri} {headers:#?}\nbody: {head}...");
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!("Received request: {method} {uri} {headers:#?}\nbody: {body:?}");
    }
}

fn log_response(status: StatusCode, headers: &HeaderMap, body: &str) {
    let (head, truncated) = truncate_body(body);

    if truncated {
        tracing::info!("Sending response: {status} {headers:#?}\nbody: {head}...");
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {status} {headers:#?}\nbody: {body:?}");
    }
}
