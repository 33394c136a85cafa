//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Customer login (PKCE helpers, signed cookie codec)

pub mod auth;
