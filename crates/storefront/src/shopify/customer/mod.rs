//! Shopify Customer Account API client.
//!
//! The Customer Account API provides access to customer identity. It uses
//! OAuth 2.0 Authorization Code with PKCE, with endpoints discovered from the
//! store's `.well-known` documents.
//!
//! # OAuth Flow
//!
//! 1. Discover endpoints with `openid_configuration()`
//! 2. Generate authorization URL with `authorization_url()`
//! 3. Redirect customer to Shopify's login page
//! 4. Shopify redirects back with authorization code
//! 5. Exchange code for tokens with `exchange_code()`
//! 6. Use access token for customer-scoped API calls
//!
//! # Example
//!
//! ```rust,ignore
//! use headless_storefront::services::auth::pkce;
//! use headless_storefront::shopify::CustomerClient;
//!
//! let client = CustomerClient::new(&config.shopify);
//! let oidc = client.openid_configuration().await?;
//!
//! let verifier = pkce::generate_code_verifier();
//! let challenge = pkce::generate_code_challenge(&verifier);
//! let auth_url = client.authorization_url(&oidc, redirect_uri, &state, &challenge)?;
//!
//! // After OAuth callback, exchange code for token
//! let token = client.exchange_code(&oidc, &code, redirect_uri, &verifier).await?;
//! let customer = client.get_customer(&token.access_token).await?;
//! ```

mod types;

pub use types::*;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, instrument};

use crate::config::ShopifyConfig;
use crate::shopify::types::SessionCustomer;
use crate::shopify::{GraphQLError, ShopifyError};

/// Scopes requested at login.
pub const CUSTOMER_SCOPES: &str =
    "openid email profile https://api.shopify.com/auth/customer-account-api:full";

const DISCOVERY_TTL: Duration = Duration::from_secs(60 * 60);
const OPENID_KEY: &str = "openid-configuration";
const CUSTOMER_API_KEY: &str = "customer-account-api";
const USER_AGENT: &str = concat!("headless-storefront/", env!("CARGO_PKG_VERSION"));

// ─────────────────────────────────────────────────────────────────────────────
// GraphQL Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GraphQLRequest {
    query: &'static str,
}

#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLErrorResponse>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorResponse {
    message: String,
}

impl<T> GraphQLResponse<T> {
    fn into_result(self) -> Result<T, ShopifyError> {
        if let Some(errors) = self.errors
            && !errors.is_empty()
        {
            return Err(ShopifyError::GraphQL(
                errors
                    .into_iter()
                    .map(|e| GraphQLError {
                        message: e.message,
                        locations: vec![],
                        path: vec![],
                    })
                    .collect(),
            ));
        }

        self.data
            .ok_or_else(|| ShopifyError::message("No data in response"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Customer Account Client
// ─────────────────────────────────────────────────────────────────────────────

/// Client for the Shopify Customer Account API.
///
/// Discovery documents are cached for an hour.
#[derive(Clone)]
pub struct CustomerClient {
    inner: Arc<CustomerClientInner>,
}

struct CustomerClientInner {
    client: reqwest::Client,
    store_origin: String,
    client_id: String,
    client_secret: Option<SecretString>,
    discovery: Cache<&'static str, DiscoveryDocument>,
}

impl CustomerClient {
    /// Create a new Customer Account API client.
    #[must_use]
    pub fn new(config: &ShopifyConfig) -> Self {
        Self {
            inner: Arc::new(CustomerClientInner {
                client: reqwest::Client::new(),
                store_origin: config.store_origin.trim_end_matches('/').to_string(),
                client_id: config.customer_client_id.clone(),
                client_secret: config.customer_client_secret.clone(),
                discovery: Cache::builder()
                    .max_capacity(8)
                    .time_to_live(DISCOVERY_TTL)
                    .build(),
            }),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Discovery
    // ─────────────────────────────────────────────────────────────────────────

    async fn fetch_well_known<T: DeserializeOwned>(&self, name: &str) -> Result<T, ShopifyError> {
        let url = format!("{}/.well-known/{name}", self.inner.store_origin);

        let response = self
            .inner
            .client
            .get(&url)
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ShopifyError::Discovery(format!("{url}: HTTP {status}")));
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| ShopifyError::Discovery(format!("{url}: {e}")))
    }

    /// Fetch the `OpenID` Connect configuration for the store.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::Discovery` if the document is unavailable or
    /// lacks the authorization or token endpoint.
    #[instrument(skip(self))]
    pub async fn openid_configuration(&self) -> Result<OpenIdConfiguration, ShopifyError> {
        if let Some(DiscoveryDocument::OpenId(config)) =
            self.inner.discovery.get(&OPENID_KEY).await
        {
            debug!("Cache hit for openid configuration");
            return Ok(config);
        }

        let config: OpenIdConfiguration = self.fetch_well_known(OPENID_KEY).await?;
        if config.authorization_endpoint.is_empty() || config.token_endpoint.is_empty() {
            return Err(ShopifyError::Discovery(
                "openid configuration is missing authorization or token endpoint".to_string(),
            ));
        }

        self.inner
            .discovery
            .insert(OPENID_KEY, DiscoveryDocument::OpenId(config.clone()))
            .await;

        Ok(config)
    }

    /// Fetch the Customer Account API configuration for the store.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::Discovery` if the document is unavailable.
    #[instrument(skip(self))]
    pub async fn customer_api_configuration(
        &self,
    ) -> Result<CustomerApiConfiguration, ShopifyError> {
        if let Some(DiscoveryDocument::CustomerApi(config)) =
            self.inner.discovery.get(&CUSTOMER_API_KEY).await
        {
            debug!("Cache hit for customer account api configuration");
            return Ok(config);
        }

        let config: CustomerApiConfiguration = self.fetch_well_known(CUSTOMER_API_KEY).await?;

        self.inner
            .discovery
            .insert(
                CUSTOMER_API_KEY,
                DiscoveryDocument::CustomerApi(config.clone()),
            )
            .await;

        Ok(config)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // OAuth Flow
    // ─────────────────────────────────────────────────────────────────────────

    /// Generate the authorization URL for customer login.
    ///
    /// # Arguments
    ///
    /// * `oidc` - Discovered `OpenID` configuration
    /// * `redirect_uri` - The callback URL to redirect to after authentication
    /// * `state` - A random string stored in the PKCE cookie to prevent CSRF
    /// * `code_challenge` - S256 challenge derived from the code verifier
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::Discovery` if the authorization endpoint is not a valid URL.
    pub fn authorization_url(
        &self,
        oidc: &OpenIdConfiguration,
        redirect_uri: &str,
        state: &str,
        code_challenge: &str,
    ) -> Result<String, ShopifyError> {
        let mut url = url::Url::parse(&oidc.authorization_endpoint).map_err(|e| {
            ShopifyError::Discovery(format!("invalid authorization_endpoint: {e}"))
        })?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.inner.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("scope", CUSTOMER_SCOPES)
            .append_pair("state", state)
            .append_pair("code_challenge", code_challenge)
            .append_pair("code_challenge_method", "S256");

        Ok(url.into())
    }

    /// Exchange an authorization code for access tokens.
    ///
    /// # Arguments
    ///
    /// * `oidc` - Discovered `OpenID` configuration
    /// * `code` - The authorization code from the OAuth callback
    /// * `redirect_uri` - The same redirect URI used in the authorization request
    /// * `code_verifier` - The PKCE verifier the challenge was derived from
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::TokenExchange` if the token endpoint answers with
    /// a non-success status, `ShopifyError::MissingAccessToken` if it answers
    /// without a token, or an error if the request itself fails.
    #[instrument(skip_all)]
    pub async fn exchange_code(
        &self,
        oidc: &OpenIdConfiguration,
        code: &str,
        redirect_uri: &str,
        code_verifier: &str,
    ) -> Result<CustomerAccessToken, ShopifyError> {
        let mut params = vec![
            ("grant_type", "authorization_code"),
            ("client_id", self.inner.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("code", code),
            ("code_verifier", code_verifier),
        ];
        if let Some(secret) = &self.inner.client_secret {
            params.push(("client_secret", secret.expose_secret()));
        }

        let response = self
            .inner
            .client
            .post(&oidc.token_endpoint)
            .header("User-Agent", USER_AGENT)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Token exchange failed");
            return Err(ShopifyError::TokenExchange {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = serde_json::from_str(&response.text().await?)?;

        let access_token = token
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(ShopifyError::MissingAccessToken)?;

        Ok(CustomerAccessToken { access_token })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // GraphQL Execution
    // ─────────────────────────────────────────────────────────────────────────

    /// Execute a GraphQL query against the Customer Account API.
    async fn query<T: DeserializeOwned>(
        &self,
        access_token: &str,
        query: &'static str,
    ) -> Result<T, ShopifyError> {
        let api = self.customer_api_configuration().await?;
        let endpoint = api.graphql_endpoint().ok_or_else(|| {
            ShopifyError::Discovery("customer account api has no GraphQL endpoint".to_string())
        })?;

        let request = GraphQLRequest { query };

        let response = self
            .inner
            .client
            .post(endpoint)
            // Customer Account API takes the raw token, no "Bearer" prefix
            .header("Authorization", access_token)
            .header("Content-Type", "application/json")
            .header("User-Agent", USER_AGENT)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            debug!(status = %status, body = %text, "Customer API request failed");
            return Err(ShopifyError::message(format!(
                "Customer API request failed ({status})"
            )));
        }

        let gql_response: GraphQLResponse<T> = serde_json::from_str(&response.text().await?)?;
        gql_response.into_result()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Customer Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Get the customer the access token belongs to.
    ///
    /// Returns `Ok(None)` when the API answers without a customer.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery fails, the API request fails, or the
    /// response carries GraphQL errors.
    #[instrument(skip_all)]
    pub async fn get_customer(
        &self,
        access_token: &str,
    ) -> Result<Option<SessionCustomer>, ShopifyError> {
        #[derive(Deserialize)]
        struct Response {
            customer: Option<Customer>,
        }

        const QUERY: &str = r"
            query Customer {
                customer {
                    id
                    firstName
                    lastName
                    emailAddress {
                        emailAddress
                    }
                }
            }
        ";

        let response: Response = self.query(access_token, QUERY).await?;

        Ok(response.customer.map(|c| SessionCustomer {
            id: c.id,
            first_name: c.first_name,
            last_name: c.last_name,
            email: c.email_address.and_then(|e| e.email_address),
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::StorefrontToken;

    fn test_client() -> CustomerClient {
        CustomerClient::new(&ShopifyConfig {
            store_domain: "test.myshopify.com".to_string(),
            store_origin: "https://test.myshopify.com/".to_string(),
            api_version: "2026-01".to_string(),
            storefront_endpoint: "https://test.myshopify.com/api/2026-01/graphql.json"
                .to_string(),
            storefront_token: StorefrontToken::Public("public".to_string()),
            customer_client_id: "shp_client".to_string(),
            customer_client_secret: None,
        })
    }

    fn oidc() -> OpenIdConfiguration {
        OpenIdConfiguration {
            authorization_endpoint: "https://shopify.com/authentication/1/oauth/authorize"
                .to_string(),
            token_endpoint: "https://shopify.com/authentication/1/oauth/token".to_string(),
        }
    }

    #[test]
    fn test_authorization_url_params() {
        let url = test_client()
            .authorization_url(&oidc(), "https://shop.example.ng/api/auth/callback", "st", "ch")
            .unwrap();
        let parsed = url::Url::parse(&url).unwrap();
        let params: std::collections::HashMap<_, _> = parsed.query_pairs().into_owned().collect();

        assert_eq!(parsed.path(), "/authentication/1/oauth/authorize");
        assert_eq!(params["client_id"], "shp_client");
        assert_eq!(params["response_type"], "code");
        assert_eq!(
            params["redirect_uri"],
            "https://shop.example.ng/api/auth/callback"
        );
        assert_eq!(params["scope"], CUSTOMER_SCOPES);
        assert_eq!(params["state"], "st");
        assert_eq!(params["code_challenge"], "ch");
        assert_eq!(params["code_challenge_method"], "S256");
    }

    #[test]
    fn test_authorization_url_rejects_invalid_endpoint() {
        let mut config = oidc();
        config.authorization_endpoint = "not a url".to_string();
        let err = test_client()
            .authorization_url(&config, "https://x/cb", "st", "ch")
            .unwrap_err();
        assert!(matches!(err, ShopifyError::Discovery(_)));
    }

    #[test]
    fn test_graphql_response_errors() {
        let response: GraphQLResponse<serde_json::Value> = serde_json::from_value(
            serde_json::json!({ "data": null, "errors": [ { "message": "Unauthorized" } ] }),
        )
        .unwrap();
        let err = response.into_result().unwrap_err();
        assert_eq!(err.to_string(), "GraphQL errors: Unauthorized");
    }

    #[test]
    fn test_store_origin_trailing_slash_trimmed() {
        assert_eq!(test_client().inner.store_origin, "https://test.myshopify.com");
    }
}
