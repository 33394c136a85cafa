//! Authentication error types.

use thiserror::Error;

use crate::shopify::ShopifyError;

/// Errors that can occur while completing the customer login flow.
///
/// Each variant maps to the `error` query code the browser is redirected with.
#[derive(Debug, Error)]
pub enum AuthFlowError {
    /// The identity provider reported an error (e.g., the customer denied access).
    #[error("authorization denied: {0}")]
    Denied(String),

    /// The callback arrived without `code` or `state`.
    #[error("callback missing code or state")]
    CallbackMissing,

    /// The PKCE cookie is gone (expired or never set).
    #[error("login session expired")]
    SessionExpired,

    /// The PKCE cookie failed verification or its state doesn't match.
    #[error("invalid state parameter")]
    InvalidState,

    /// The token endpoint rejected the exchange.
    #[error("token exchange failed")]
    TokenFailed,

    /// The token endpoint answered without an access token.
    #[error("no access token in token response")]
    NoToken,

    /// The Customer Account API could not be reached or misbehaved.
    #[error("customer account error: {0}")]
    Shopify(ShopifyError),
}

impl AuthFlowError {
    /// Redirect error code for this failure.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Denied(_) => "auth_denied",
            Self::CallbackMissing => "auth_callback_missing",
            Self::SessionExpired => "auth_session_expired",
            Self::InvalidState => "auth_invalid_state",
            Self::TokenFailed => "auth_token_failed",
            Self::NoToken => "auth_no_token",
            Self::Shopify(_) => "auth_callback_error",
        }
    }

    /// Path (with query) the browser should be sent to.
    #[must_use]
    pub fn redirect_path(&self) -> String {
        match self {
            Self::Denied(message) => format!(
                "/?error={}&message={}",
                self.code(),
                urlencoding::encode(message)
            ),
            _ => format!("/?error={}", self.code()),
        }
    }
}

impl From<ShopifyError> for AuthFlowError {
    fn from(err: ShopifyError) -> Self {
        match err {
            ShopifyError::TokenExchange { .. } => Self::TokenFailed,
            ShopifyError::MissingAccessToken => Self::NoToken,
            other => Self::Shopify(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(AuthFlowError::CallbackMissing.code(), "auth_callback_missing");
        assert_eq!(AuthFlowError::SessionExpired.code(), "auth_session_expired");
        assert_eq!(AuthFlowError::InvalidState.code(), "auth_invalid_state");
        assert_eq!(AuthFlowError::TokenFailed.code(), "auth_token_failed");
        assert_eq!(AuthFlowError::NoToken.code(), "auth_no_token");
    }

    #[test]
    fn test_denied_redirect_carries_message() {
        let err = AuthFlowError::Denied("access denied".to_string());
        assert_eq!(
            err.redirect_path(),
            "/?error=auth_denied&message=access%20denied"
        );
    }

    #[test]
    fn test_shopify_errors_map_to_codes() {
        let token = AuthFlowError::from(ShopifyError::TokenExchange {
            status: 400,
            body: "invalid_grant".to_string(),
        });
        assert_eq!(token.code(), "auth_token_failed");

        let missing = AuthFlowError::from(ShopifyError::MissingAccessToken);
        assert_eq!(missing.code(), "auth_no_token");

        let other = AuthFlowError::from(ShopifyError::Discovery("boom".to_string()));
        assert_eq!(other.redirect_path(), "/?error=auth_callback_error");
    }
}
