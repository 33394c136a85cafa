//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. JSON route handlers return `Result<T, AppError>`;
//! the error body is always `{"error": "<message>"}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::shopify::ShopifyError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Shopify API operation failed.
    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Shopify(err) => match err {
                ShopifyError::UserError(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ShopifyError::NotFound(_) => StatusCode::NOT_FOUND,
                ShopifyError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    /// Message safe to show to the client.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::Internal(_) => "Internal server error".to_string(),
            Self::Shopify(ShopifyError::UserError(msg)) => msg.clone(),
            Self::Shopify(ShopifyError::NotFound(_)) => "Not found".to_string(),
            Self::Shopify(ShopifyError::RateLimited(_)) | Self::RateLimited => {
                "Too many requests".to_string()
            }
            Self::Shopify(_) => "External service error".to_string(),
            Self::NotFound(msg) | Self::BadRequest(msg) => msg.clone(),
        }
    }

    const fn is_server_error(&self) -> bool {
        match self {
            Self::Internal(_) => true,
            Self::Shopify(err) => !matches!(
                err,
                ShopifyError::UserError(_) | ShopifyError::NotFound(_)
            ),
            _ => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        (self.status(), Json(json!({ "error": self.client_message() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a customer ID.
///
/// Call this once a customer is resolved to associate errors with them.
pub fn set_sentry_user(customer_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(customer_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the customer.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for customer actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added line", Some(&[("merchandise_id", "gid://...")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::RateLimited),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Shopify(ShopifyError::UserError("sold out".to_string()))),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(AppError::Shopify(ShopifyError::message("boom"))),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_client_messages_hide_internals() {
        assert_eq!(
            AppError::Internal("db password wrong".to_string()).client_message(),
            "Internal server error"
        );
        assert_eq!(
            AppError::Shopify(ShopifyError::message("HTTP 500: stack")).client_message(),
            "External service error"
        );
        assert_eq!(
            AppError::Shopify(ShopifyError::UserError("Variant is sold out".to_string()))
                .client_message(),
            "Variant is sold out"
        );
        assert_eq!(
            AppError::BadRequest("lineId is required".to_string()).client_message(),
            "lineId is required"
        );
    }
}
