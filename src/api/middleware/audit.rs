//! Audit logging middleware.
//!
//! Assigns every request an id (`X-Request-Id` on the response), then logs
//! method, path, status, and latency once the handler finishes.

use std::time::Instant;

use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;

use crate::api::types::RequestContext;

pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Log API access for audit trail.
pub async fn log_access(mut req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let ctx = RequestContext::generate();
    let request_id = ctx.request_id.clone();
    req.extensions_mut().insert(ctx);

    let mut response = next.run(req).await;

    let status = response.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    if response.status().is_server_error() {
        tracing::warn!(%request_id, %method, %path, status, elapsed_ms, "API request failed");
    } else {
        tracing::info!(%request_id, %method, %path, status, elapsed_ms, "API request");
    }

    if let Ok(val) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, val);
    }
    response
}
