//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Provides rate limiters for the two API route groups:
//! - `auth_rate_limiter`: Strict limits for `/api/auth` (~10/min)
//! - `api_rate_limiter`: Relaxed limits for cart, search and catalog (~100/min)

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

// =============================================================================
// Client IP Key Extractor
// =============================================================================

/// Single-IP proxy headers checked after `X-Forwarded-For`.
const FALLBACK_IP_HEADERS: &[&str] = &["x-real-ip", "fly-client-ip"];

/// Key extractor that reads the client IP from proxy headers, falling back to
/// the socket peer address.
///
/// Order: `CF-Connecting-IP`, first `X-Forwarded-For` entry, `X-Real-IP`,
/// `Fly-Client-IP`, then `ConnectInfo<SocketAddr>`.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor;

fn header_ip<T>(req: &Request<T>, name: &str) -> Option<IpAddr> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
}

fn forwarded_for_ip<T>(req: &Request<T>) -> Option<IpAddr> {
    req.headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        if let Some(ip) = header_ip(req, "cf-connecting-ip") {
            return Ok(ip);
        }

        if let Some(ip) = forwarded_for_ip(req) {
            return Ok(ip);
        }

        if let Some(ip) = FALLBACK_IP_HEADERS
            .iter()
            .find_map(|name| header_ip(req, name))
        {
            return Ok(ip);
        }

        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

// =============================================================================
// Rate Limiter Configuration
// =============================================================================

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for auth endpoints: ~10 requests per minute per IP.
///
/// Configuration: 1 request every 6 seconds (replenish), burst of 5.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers (`per_second(6)` and `burst_size(5)`), which are always accepted
/// by `GovernorConfigBuilder`.
#[must_use]
pub fn auth_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(6) // Replenish 1 token every 6 seconds (~10/minute)
        .burst_size(5)
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}

/// Create rate limiter for the rest of the API: ~100 requests per minute per IP.
///
/// Configuration: 1 request per second (replenish), burst of 50.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers (`per_second(1)` and `burst_size(50)`), which are always accepted
/// by `GovernorConfigBuilder`.
#[must_use]
pub fn api_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(1)
        .burst_size(50)
        .finish()
        .expect("rate limiter config with per_second(1) and burst_size(50) is valid");
    GovernorLayer::new(Arc::new(config))
}
