//! Browser cookies holding all per-visitor state.
//!
//! | Cookie                     | Content                          | Max-Age |
//! |----------------------------|----------------------------------|---------|
//! | `shopify_pkce`             | signed PKCE state + verifier     | 10 min  |
//! | `shopify_customer_session` | signed customer access token     | 14 days |
//! | `shopify_cart_id`          | Shopify cart GID (unsigned)      | 14 days |
//!
//! Every cookie is `HttpOnly`, `SameSite=Lax`, `Path=/`, and `Secure` when the
//! storefront is served over HTTPS.

use std::collections::HashMap;
use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponseParts, ResponseParts};
use cookie::{Cookie, SameSite};

pub const PKCE_COOKIE: &str = "shopify_pkce";
pub const SESSION_COOKIE: &str = "shopify_customer_session";
pub const CART_COOKIE: &str = "shopify_cart_id";

/// 10 minutes.
pub const PKCE_MAX_AGE_SECS: i64 = 60 * 10;
/// 14 days.
pub const SESSION_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 14;
/// 14 days.
pub const CART_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 14;

/// Cookies sent with the request, by name.
///
/// Malformed pairs are skipped. When a name repeats, the first value wins.
#[derive(Debug, Clone, Default)]
pub struct RequestCookies(HashMap<String, String>);

impl RequestCookies {
    /// Parse every `Cookie` header in `headers`.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut cookies = HashMap::new();
        for header in headers.get_all(COOKIE) {
            let Ok(header) = header.to_str() else {
                continue;
            };
            for cookie in Cookie::split_parse(header).flatten() {
                cookies
                    .entry(cookie.name().to_string())
                    .or_insert_with(|| cookie.value().to_string());
            }
        }
        Self(cookies)
    }

    /// Value of a cookie, if present and non-empty.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str).filter(|v| !v.is_empty())
    }
}

impl<S> FromRequestParts<S> for RequestCookies
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

/// `Set-Cookie` headers to attach to a response.
///
/// ```rust,ignore
/// let cookies = SetCookies::new(config.secure_cookies())
///     .set(CART_COOKIE, &cart.id, CART_MAX_AGE_SECS)
///     .remove(PKCE_COOKIE);
/// (cookies, Json(body))
/// ```
#[derive(Debug, Default)]
pub struct SetCookies {
    secure: bool,
    cookies: Vec<Cookie<'static>>,
}

impl SetCookies {
    #[must_use]
    pub const fn new(secure: bool) -> Self {
        Self {
            secure,
            cookies: Vec::new(),
        }
    }

    fn base(&self, name: &str, value: String) -> cookie::CookieBuilder<'static> {
        Cookie::build((name.to_string(), value))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .path("/")
    }

    /// Set a cookie that expires after `max_age_secs`.
    #[must_use]
    pub fn set(mut self, name: &str, value: &str, max_age_secs: i64) -> Self {
        let cookie = self
            .base(name, value.to_string())
            .max_age(cookie::time::Duration::seconds(max_age_secs))
            .build();
        self.cookies.push(cookie);
        self
    }

    /// Expire a cookie in the browser.
    #[must_use]
    pub fn remove(mut self, name: &str) -> Self {
        let mut cookie = self.base(name, String::new()).build();
        cookie.make_removal();
        self.cookies.push(cookie);
        self
    }

    /// Rendered `Set-Cookie` header values.
    #[must_use]
    pub fn header_values(&self) -> Vec<String> {
        self.cookies.iter().map(ToString::to_string).collect()
    }
}

impl IntoResponseParts for SetCookies {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        for value in self.header_values() {
            match HeaderValue::from_str(&value) {
                Ok(value) => {
                    res.headers_mut().append(SET_COOKIE, value);
                }
                Err(e) => tracing::warn!(error = %e, "Dropping unrepresentable Set-Cookie header"),
            }
        }
        Ok(res)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("shopify_cart_id=gid://shopify/Cart/abc?key=1; theme=dark"),
        );
        headers.append(COOKIE, HeaderValue::from_static("shopify_pkce=x.y"));

        let cookies = RequestCookies::from_headers(&headers);
        assert_eq!(
            cookies.get(CART_COOKIE),
            Some("gid://shopify/Cart/abc?key=1")
        );
        assert_eq!(cookies.get(PKCE_COOKIE), Some("x.y"));
        assert_eq!(cookies.get(SESSION_COOKIE), None);
    }

    #[test]
    fn test_empty_cookie_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("shopify_customer_session="));
        assert_eq!(RequestCookies::from_headers(&headers).get(SESSION_COOKIE), None);
    }

    #[test]
    fn test_set_cookie_attributes() {
        let values = SetCookies::new(true)
            .set(SESSION_COOKIE, "abc.def", SESSION_MAX_AGE_SECS)
            .header_values();
        let value = &values[0];
        assert!(value.starts_with("shopify_customer_session=abc.def"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("SameSite=Lax"));
        assert!(value.contains("Secure"));
        assert!(value.contains("Path=/"));
        assert!(value.contains("Max-Age=1209600"));
    }

    #[test]
    fn test_insecure_cookie_omits_secure() {
        let values = SetCookies::new(false)
            .set(CART_COOKIE, "gid", CART_MAX_AGE_SECS)
            .header_values();
        assert!(!values[0].contains("Secure"));
    }

    #[test]
    fn test_remove_cookie_expires_immediately() {
        let values = SetCookies::new(false).remove(PKCE_COOKIE).header_values();
        assert!(values[0].starts_with("shopify_pkce="));
        assert!(values[0].contains("Max-Age=0"));
    }
}
