//! Customer authentication.
//!
//! Login uses the Shopify Customer Account API via OAuth2 Authorization Code
//! with PKCE. All per-visitor state lives in signed cookies.

mod error;
pub mod pkce;
pub mod signed_cookie;

pub use error::AuthFlowError;
pub use signed_cookie::{CookieCodec, PkceCookie};
