//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (used for OAuth redirects)
//! - `STOREFRONT_SESSION_SECRET` - Cookie signing secret (min 32 chars, high entropy).
//!   Falls back to `SESSION_SECRET`, then `AUTH_SECRET`.
//! - `SHOPIFY_STORE_DOMAIN` - Shopify store domain (e.g., your-store.myshopify.com).
//!   Falls back to `SHOPIFY_STORE`.
//! - `SHOPIFY_CUSTOMER_ACCOUNT_CLIENT_ID` - Customer Account API OAuth client ID
//! - `SHOPIFY_STOREFRONT_PRIVATE_TOKEN` or `SHOPIFY_STOREFRONT_ACCESS_TOKEN` -
//!   Storefront API token (private token preferred when both are set)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_RATE_LIMIT` - Enable per-IP rate limiting (default: true)
//! - `SHOPIFY_API_VERSION` - API version (default: 2026-01)
//! - `SHOPIFY_STOREFRONT_API_URL` - Override the Storefront GraphQL endpoint
//! - `SHOPIFY_CUSTOMER_ACCOUNT_CLIENT_SECRET` - Secret for confidential OAuth clients
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_API_VERSION: &str = "2026-01";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront (no trailing slash)
    pub base_url: String,
    /// Cookie signing secret
    pub session_secret: SecretString,
    /// Shopify API configuration
    pub shopify: ShopifyConfig,
    /// Whether per-IP rate limiting is applied to `/api` routes
    pub rate_limit: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry performance trace sample rate
    pub sentry_traces_sample_rate: f32,
}

/// Storefront API access token.
///
/// Shopify accepts two kinds of tokens, each sent in its own header.
#[derive(Clone)]
pub enum StorefrontToken {
    /// Public token, safe to expose in the browser.
    Public(String),
    /// Private token, server-side only.
    Private(SecretString),
}

impl StorefrontToken {
    /// HTTP header the token is sent in.
    #[must_use]
    pub const fn header_name(&self) -> &'static str {
        match self {
            Self::Public(_) => "X-Shopify-Storefront-Access-Token",
            Self::Private(_) => "Shopify-Storefront-Private-Token",
        }
    }

    /// Raw token value.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Public(token) => token,
            Self::Private(token) => token.expose_secret(),
        }
    }
}

impl std::fmt::Debug for StorefrontToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Public(token) => f.debug_tuple("Public").field(token).finish(),
            Self::Private(_) => f.debug_tuple("Private").field(&"[REDACTED]").finish(),
        }
    }
}

/// Shopify Storefront and Customer Account API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct ShopifyConfig {
    /// Shopify store domain without scheme (e.g., your-store.myshopify.com)
    pub store_domain: String,
    /// Origin that serves the `.well-known` discovery documents
    pub store_origin: String,
    /// Shopify API version (e.g., 2026-01)
    pub api_version: String,
    /// Storefront API GraphQL endpoint
    pub storefront_endpoint: String,
    /// Storefront API access token
    pub storefront_token: StorefrontToken,
    /// Customer Account API OAuth client ID
    pub customer_client_id: String,
    /// Customer Account API OAuth client secret (confidential clients only)
    pub customer_client_secret: Option<SecretString>,
}

impl std::fmt::Debug for ShopifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyConfig")
            .field("store_domain", &self.store_domain)
            .field("store_origin", &self.store_origin)
            .field("api_version", &self.api_version)
            .field("storefront_endpoint", &self.storefront_endpoint)
            .field("storefront_token", &self.storefront_token)
            .field("customer_client_id", &self.customer_client_id)
            .field(
                "customer_client_secret",
                &self.customer_client_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = normalize_base_url(&get_required_env("STOREFRONT_BASE_URL")?);
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_BASE_URL".to_string(), e.to_string())
        })?;

        let (secret_key, session_secret) = get_first_env(&[
            "STOREFRONT_SESSION_SECRET",
            "SESSION_SECRET",
            "AUTH_SECRET",
        ])?;
        let session_secret = SecretString::from(session_secret);
        validate_session_secret(&session_secret, secret_key)?;
        validate_secret_strength(session_secret.expose_secret(), secret_key)?;

        let shopify = ShopifyConfig::from_env()?;
        let rate_limit = parse_bool("STOREFRONT_RATE_LIMIT", true)?;

        Ok(Self {
            host,
            port,
            base_url,
            session_secret,
            shopify,
            rate_limit,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_rate("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: parse_rate("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// OAuth redirect URI registered with the Customer Account API.
    #[must_use]
    pub fn oauth_callback_url(&self) -> String {
        format!("{}/api/auth/callback", self.base_url)
    }
}

impl ShopifyConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let (_, domain) = get_first_env(&["SHOPIFY_STORE_DOMAIN", "SHOPIFY_STORE"])?;
        let store_domain = strip_scheme(&domain);
        let api_version = get_env_or_default("SHOPIFY_API_VERSION", DEFAULT_API_VERSION);
        let storefront_endpoint = get_optional_env("SHOPIFY_STOREFRONT_API_URL")
            .unwrap_or_else(|| storefront_endpoint(&store_domain, &api_version));

        let storefront_token = match get_optional_env("SHOPIFY_STOREFRONT_PRIVATE_TOKEN") {
            Some(token) => {
                validate_secret_strength(&token, "SHOPIFY_STOREFRONT_PRIVATE_TOKEN")?;
                StorefrontToken::Private(SecretString::from(token))
            }
            None => StorefrontToken::Public(get_required_env("SHOPIFY_STOREFRONT_ACCESS_TOKEN")?),
        };

        let customer_client_secret = get_optional_env("SHOPIFY_CUSTOMER_ACCOUNT_CLIENT_SECRET")
            .map(|secret| {
                validate_secret_strength(&secret, "SHOPIFY_CUSTOMER_ACCOUNT_CLIENT_SECRET")?;
                Ok::<_, ConfigError>(SecretString::from(secret))
            })
            .transpose()?;

        Ok(Self {
            store_origin: format!("https://{store_domain}"),
            store_domain,
            api_version,
            storefront_endpoint,
            storefront_token,
            customer_client_id: get_required_env("SHOPIFY_CUSTOMER_ACCOUNT_CLIENT_ID")?,
            customer_client_secret,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Build the default Storefront GraphQL endpoint for a store.
#[must_use]
pub fn storefront_endpoint(store_domain: &str, api_version: &str) -> String {
    format!("https://{store_domain}/api/{api_version}/graphql.json")
}

/// Strip a leading `http://` or `https://` and trailing slashes from a domain.
fn strip_scheme(domain: &str) -> String {
    let trimmed = domain.trim();
    trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed)
        .trim_end_matches('/')
        .to_string()
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get the first environment variable that is set, returning its key and value.
///
/// The error names the primary (first) key.
fn get_first_env(keys: &[&'static str]) -> Result<(&'static str, String), ConfigError> {
    keys.iter()
        .find_map(|key| {
            std::env::var(key)
                .ok()
                .filter(|v| !v.is_empty())
                .map(|v| (*key, v))
        })
        .ok_or_else(|| {
            ConfigError::MissingEnvVar(keys.first().copied().unwrap_or_default().to_string())
        })
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_bool(key: &str, default: bool) -> Result<bool, ConfigError> {
    get_optional_env(key).map_or(Ok(default), |value| {
        match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("expected a boolean, got '{other}'"),
            )),
        }
    })
}

fn parse_rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    let Some(value) = get_optional_env(key) else {
        return Ok(default);
    };
    let rate = value
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ));
    }
    Ok(rate)
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}
