//! Shopify Customer session extractor.
//!
//! The customer's Customer Account API access token lives in the signed
//! `shopify_customer_session` cookie; there is no server-side session store.

use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::cookies::{RequestCookies, SESSION_COOKIE};
use crate::state::AppState;

/// Extractor that optionally gets the Shopify customer access token.
///
/// Yields `None` when the session cookie is missing or fails verification.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(
///     OptionalShopifyCustomer(token): OptionalShopifyCustomer,
/// ) -> impl IntoResponse {
///     match token {
///         Some(t) => format!("Customer authenticated!"),
///         None => "Guest visitor".to_string(),
///     }
/// }
/// ```
pub struct OptionalShopifyCustomer(pub Option<String>);

impl<S> FromRequestParts<S> for OptionalShopifyCustomer
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let cookies = RequestCookies::from_headers(&parts.headers);

        let Some(value) = cookies.get(SESSION_COOKIE) else {
            return Ok(Self(None));
        };

        let token = state.cookie_codec().decode_session(value);
        if token.is_none() {
            tracing::debug!("Ignoring session cookie that failed verification");
        }

        Ok(Self(token))
    }
}
