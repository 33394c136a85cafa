//! Request ID middleware for request tracing and correlation.
//!
//! Generates a UUID v4 for each request if not provided by an upstream proxy
//! (e.g., Cloudflare, load balancer). The request ID is:
//! - Stored in request extensions as [`RequestId`]
//! - Recorded in the current tracing span
//! - Added to the Sentry scope for error correlation
//! - Returned in the response headers

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Upstream IDs longer than this are replaced.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Request ID available to handlers via `Extension<RequestId>`.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

fn upstream_request_id(request: &Request) -> Option<String> {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN)
        .map(String::from)
}

/// Middleware that ensures every request has a unique request ID.
///
/// A well-formed incoming `x-request-id` is kept; otherwise a new UUID v4 is
/// generated.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = upstream_request_id(&request).unwrap_or_else(|| Uuid::new_v4().to_string());

    Span::current().record("request_id", &request_id);

    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}
