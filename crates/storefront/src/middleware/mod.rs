//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers
//! 5. Rate limiting (governor, per route group)

pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod shopify_customer;

pub use rate_limit::{api_rate_limiter, auth_rate_limiter};
pub use request_id::{RequestId, request_id_middleware};
pub use security_headers::security_headers_middleware;
pub use shopify_customer::OptionalShopifyCustomer;
