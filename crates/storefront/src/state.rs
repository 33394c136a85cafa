//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::cookies::SetCookies;
use crate::services::auth::CookieCodec;
use crate::shopify::{CustomerClient, StorefrontClient};

/// Error building application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("invalid cookie signing key: {0}")]
    CookieKey(#[from] hmac::digest::InvalidLength),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// configuration, the Shopify API clients and the cookie codec.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    storefront: StorefrontClient,
    customer: CustomerClient,
    cookie_codec: CookieCodec,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the session secret cannot key the cookie MAC.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let storefront = StorefrontClient::new(&config.shopify);
        let customer = CustomerClient::new(&config.shopify);
        let cookie_codec = CookieCodec::new(&config.session_secret)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                storefront,
                customer,
                cookie_codec,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the Shopify Storefront API client.
    #[must_use]
    pub fn storefront(&self) -> &StorefrontClient {
        &self.inner.storefront
    }

    /// Get a reference to the Shopify Customer Account API client.
    #[must_use]
    pub fn customer(&self) -> &CustomerClient {
        &self.inner.customer
    }

    /// Get a reference to the signed cookie codec.
    #[must_use]
    pub fn cookie_codec(&self) -> &CookieCodec {
        &self.inner.cookie_codec
    }

    /// Start a `Set-Cookie` batch with this deployment's `Secure` setting.
    #[must_use]
    pub fn set_cookies(&self) -> SetCookies {
        SetCookies::new(self.inner.config.secure_cookies())
    }
}
