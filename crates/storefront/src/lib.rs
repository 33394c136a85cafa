//! Headless storefront gateway library.
//!
//! A JSON API in front of a Shopify store: customer login through the
//! Customer Account API (OAuth 2.0 + PKCE), carts and catalog reads through
//! the Storefront API. All per-visitor state lives in cookies.
//!
//! The router is built by [`app`] so it can be served by the binary and
//! exercised in-process by tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod cookies;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod shopify;
pub mod state;

use std::time::Duration;

use axum::{Router, middleware::from_fn, middleware::from_fn_with_state, routing::get};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{request_id_middleware, security_headers_middleware};
use crate::state::AppState;

/// Build the full application router.
///
/// Layer order, outermost first: Sentry, request tracing, request ID,
/// security headers, then per-group rate limits inside [`routes::routes`].
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes::routes(state.config()))
        .layer(from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri().path(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check Shopify.
async fn health() -> &'static str {
    "ok"
}
