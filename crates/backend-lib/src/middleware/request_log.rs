//! Per-request logging with a generated request id.
use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, Request},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, error, info, info_span, warn, Instrument, Level};
use uuid::Uuid;

use crate::auth::extractor::client_ip;
use crate::error::AppError;
use crate::logging::{sanitize_log_value, SERVICE_NAME};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Bodies larger than this are not buffered for logging
pub(crate) const MAX_LOGGED_BODY: usize = 64 * 1024;

/// Log request start and completion inside a span carrying the request id
pub async fn log_requests(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let ip = client_ip(
        request.headers(),
        request.extensions().get::<ConnectInfo<SocketAddr>>(),
    );

    let span = info_span!(
        "request",
        service = SERVICE_NAME,
        %request_id,
        %method,
        path = %path,
    );

    async move {
        info!(%user_agent, %ip, "request started");

        let prepared = if tracing::enabled!(Level::DEBUG) && should_log_body(&request) {
            log_json_body(request).await
        } else {
            Ok(request)
        };

        let start = Instant::now();
        let mut response = match prepared {
            Ok(request) => next.run(request).await,
            Err(rejection) => rejection,
        };
        let duration_ms = start.elapsed().as_millis() as u64;
        let status = response.status().as_u16();

        if response.status().is_server_error() {
            error!(status, duration_ms, "request failed");
        } else if response.status().is_client_error() {
            warn!(status, duration_ms, "request rejected");
        } else {
            info!(status, duration_ms, "request completed");
        }

        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }
    .instrument(span)
    .await
}

fn should_log_body(request: &Request) -> bool {
    let is_json = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));

    let small = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|h| h.to_str().ok())
        .and_then(|len| len.parse::<usize>().ok())
        .is_some_and(|len| len <= MAX_LOGGED_BODY);

    is_json && small
}

/// Buffer the body, log a redacted copy, and hand the bytes back.
/// A body that cannot be read is answered with 400 instead of being forwarded.
async fn log_json_body(request: Request) -> Result<Request, Response> {
    let (parts, body) = request.into_parts();
    match axum::body::to_bytes(body, MAX_LOGGED_BODY).await {
        Ok(bytes) => {
            if let Ok(value) = serde_json::from_slice::<serde_json::Value>(&bytes) {
                debug!(body = %sanitize_log_value(value), "request body");
            }
            Ok(Request::from_parts(parts, Body::from(bytes)))
        },
        Err(e) => {
            warn!(error = %e, "could not buffer request body");
            Err(AppError::InvalidInput("Request body could not be read".to_string()).into_response())
        },
    }
}
