//! Shopify Storefront and Customer Account API clients.
//!
//! # Architecture
//!
//! - Uses `graphql_client` for the query/response envelope, `reqwest` for HTTP
//! - Shopify is source of truth - NO local state, direct API calls
//! - In-memory caching via `moka` for catalog reads and discovery documents
//!
//! # APIs
//!
//! ## Storefront API
//! - Products, collections, search, cart operations
//! - Public access token or private (server-side) access token
//!
//! ## Customer Account API
//! - OAuth 2.0 Authorization Code + PKCE, endpoints from `.well-known` discovery
//! - Customer identity for the session endpoint
//!
//! # Example
//!
//! ```rust,ignore
//! use headless_storefront::shopify::{CartLineInput, StorefrontClient};
//!
//! let client = StorefrontClient::new(&config.shopify);
//!
//! let product = client.get_product_by_handle("linen-kaftan").await?;
//! let cart = client
//!     .create_cart(vec![CartLineInput {
//!         merchandise_id: product.variants[0].id.clone(),
//!         quantity: 1,
//!     }])
//!     .await?;
//! ```

pub mod customer;
mod storefront;
pub mod types;

pub use customer::CustomerClient;
pub use storefront::StorefrontClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when interacting with Shopify APIs.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// User error from mutation (e.g., invalid input). Carries the first message.
    #[error("User error: {0}")]
    UserError(String),

    /// A `.well-known` discovery document was unavailable or incomplete.
    #[error("Discovery failed: {0}")]
    Discovery(String),

    /// The OAuth token endpoint rejected the code exchange.
    #[error("Token exchange failed ({status}): {body}")]
    TokenExchange { status: u16, body: String },

    /// The token endpoint answered without an access token.
    #[error("Token response has no access token")]
    MissingAccessToken,
}

impl ShopifyError {
    /// Build a single-message GraphQL error.
    pub(crate) fn message(message: impl Into<String>) -> Self {
        Self::GraphQL(vec![GraphQLError {
            message: message.into(),
            locations: vec![],
            path: vec![],
        }])
    }
}

/// A GraphQL error returned by the Shopify API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

impl From<graphql_client::Error> for GraphQLError {
    fn from(e: graphql_client::Error) -> Self {
        Self {
            message: e.message,
            locations: e.locations.map_or_else(Vec::new, |locs| {
                locs.into_iter()
                    .map(|l| GraphQLErrorLocation {
                        line: i64::from(l.line),
                        column: i64::from(l.column),
                    })
                    .collect()
            }),
            path: e.path.map_or_else(Vec::new, |p| {
                p.into_iter()
                    .map(|fragment| match fragment {
                        graphql_client::PathFragment::Key(s) => serde_json::Value::String(s),
                        graphql_client::PathFragment::Index(i) => {
                            serde_json::Value::Number(i.into())
                        }
                    })
                    .collect()
            }),
        }
    }
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let mut parts = Vec::new();

            if !e.message.is_empty() {
                parts.push(e.message.clone());
            }

            if !e.path.is_empty() {
                let path_str = e
                    .path
                    .iter()
                    .map(|p| match p {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(".");
                parts.push(format!("path: {path_str}"));
            }

            if let Some(loc) = e.locations.first() {
                parts.push(format!("at line {}:{}", loc.line, loc.column));
            }

            if parts.is_empty() {
                format!("[error {}]: (no details)", i + 1)
            } else {
                parts.join(" ")
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shopify_error_display() {
        let err = ShopifyError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");
    }

    #[test]
    fn test_graphql_error_formatting() {
        let errors = vec![
            GraphQLError {
                message: "Field not found".to_string(),
                locations: vec![],
                path: vec![],
            },
            GraphQLError {
                message: "Invalid ID".to_string(),
                locations: vec![],
                path: vec![],
            },
        ];
        let err = ShopifyError::GraphQL(errors);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: Field not found; Invalid ID"
        );
    }

    #[test]
    fn test_graphql_error_path_and_location() {
        let errors = vec![GraphQLError {
            message: String::new(),
            locations: vec![GraphQLErrorLocation { line: 5, column: 10 }],
            path: vec![
                serde_json::Value::String("products".to_string()),
                serde_json::Value::Number(0.into()),
            ],
        }];
        let err = ShopifyError::GraphQL(errors);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: path: products.0 at line 5:10"
        );
    }

    #[test]
    fn test_graphql_error_empty_vec() {
        let err = ShopifyError::GraphQL(vec![]);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: (no error details provided)"
        );
    }

    #[test]
    fn test_message_helper() {
        let err = ShopifyError::message("No data in response");
        assert_eq!(err.to_string(), "GraphQL errors: No data in response");
    }

    #[test]
    fn test_token_exchange_display() {
        let err = ShopifyError::TokenExchange {
            status: 400,
            body: "invalid_grant".to_string(),
        };
        assert_eq!(err.to_string(), "Token exchange failed (400): invalid_grant");
    }

    #[test]
    fn test_rate_limited_error() {
        let err = ShopifyError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }
}
