//! Types for Shopify Customer Account API discovery, OAuth and responses.

use serde::Deserialize;

// ─────────────────────────────────────────────────────────────────────────────
// Discovery Types
// ─────────────────────────────────────────────────────────────────────────────

/// `OpenID` Connect discovery document (`/.well-known/openid-configuration`).
#[derive(Debug, Clone, Deserialize)]
pub struct OpenIdConfiguration {
    /// Where customers are sent to log in.
    pub authorization_endpoint: String,
    /// Where authorization codes are exchanged for tokens.
    pub token_endpoint: String,
}

/// Customer Account API discovery document (`/.well-known/customer-account-api`).
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerApiConfiguration {
    #[serde(default)]
    pub graphql_api: Option<String>,
    #[serde(default)]
    pub api_endpoint: Option<String>,
}

impl CustomerApiConfiguration {
    /// GraphQL endpoint: `graphql_api`, else `api_endpoint`.
    #[must_use]
    pub fn graphql_endpoint(&self) -> Option<&str> {
        self.graphql_api
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.api_endpoint.as_deref().filter(|s| !s.is_empty()))
    }
}

/// Cached discovery documents.
#[derive(Debug, Clone)]
pub(super) enum DiscoveryDocument {
    OpenId(OpenIdConfiguration),
    CustomerApi(CustomerApiConfiguration),
}

// ─────────────────────────────────────────────────────────────────────────────
// OAuth Types
// ─────────────────────────────────────────────────────────────────────────────

/// Customer access token obtained via OAuth.
#[derive(Debug, Clone)]
pub struct CustomerAccessToken {
    /// The access token for API requests.
    pub access_token: String,
}

/// Raw token response from the OAuth token endpoint.
///
/// `access_token` is optional here so a malformed success response can be
/// told apart from a transport failure.
#[derive(Debug, Deserialize)]
pub(super) struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Customer Types
// ─────────────────────────────────────────────────────────────────────────────

/// Customer as returned by the Customer Account API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct Customer {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_address: Option<CustomerEmailAddress>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CustomerEmailAddress {
    pub email_address: Option<String>,
}
