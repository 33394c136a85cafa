//! Shopify Customer Account login route handlers.
//!
//! Handles the OAuth 2.0 authorization code flow with PKCE:
//! - Login: stores a signed PKCE cookie and redirects to the identity provider
//! - Callback: verifies state, exchanges the code, sets the session cookie
//! - Logout: clears the auth cookies
//! - Session: resolves the signed-in customer, if any

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use crate::cookies::{
    PKCE_COOKIE, PKCE_MAX_AGE_SECS, RequestCookies, SESSION_COOKIE, SESSION_MAX_AGE_SECS,
};
use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::middleware::OptionalShopifyCustomer;
use crate::services::auth::pkce::{
    generate_code_challenge, generate_code_verifier, generate_state, sanitize_return_to,
};
use crate::services::auth::{AuthFlowError, PkceCookie};
use crate::shopify::SessionCustomer;
use crate::state::AppState;

/// Redirect target when login can't be started.
const AUTH_CONFIG_ERROR: &str = "/?error=auth_config";

/// Query parameters accepted by login and logout.
#[derive(Debug, Deserialize)]
pub struct ReturnToQuery {
    #[serde(rename = "returnTo")]
    pub return_to: Option<String>,
}

/// Query parameters from the identity provider callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange for tokens.
    pub code: Option<String>,
    /// State parameter for CSRF protection.
    pub state: Option<String>,
    /// Error code if authorization failed.
    pub error: Option<String>,
    /// Error description.
    pub error_description: Option<String>,
    #[serde(rename = "returnTo")]
    pub return_to: Option<String>,
}

/// Session lookup response.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub customer: Option<SessionCustomer>,
}

/// Start the customer login.
///
/// Discovers the OpenID configuration, stores the PKCE verifier and state in a
/// signed cookie, and redirects to the authorization endpoint.
///
/// # Route
///
/// `GET /api/auth/login?returnTo=`
#[instrument(skip(state, query))]
pub async fn login(State(state): State<AppState>, Query(query): Query<ReturnToQuery>) -> Response {
    let oidc = match state.customer().openid_configuration().await {
        Ok(oidc) => oidc,
        Err(e) => {
            tracing::error!(error = %e, "Failed to discover OpenID configuration");
            return Redirect::to(AUTH_CONFIG_ERROR).into_response();
        }
    };

    let code_verifier = generate_code_verifier();
    let code_challenge = generate_code_challenge(&code_verifier);
    let oauth_state = generate_state();

    let auth_url = match state.customer().authorization_url(
        &oidc,
        &state.config().oauth_callback_url(),
        &oauth_state,
        &code_challenge,
    ) {
        Ok(url) => url,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build authorization URL");
            return Redirect::to(AUTH_CONFIG_ERROR).into_response();
        }
    };

    let pkce = PkceCookie {
        state: oauth_state,
        code_verifier,
        return_to: query
            .return_to
            .as_deref()
            .map(|path| sanitize_return_to(Some(path), "/account")),
    };

    let cookie = match state.cookie_codec().encode_pkce(&pkce) {
        Ok(cookie) => cookie,
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode PKCE cookie");
            return Redirect::to(AUTH_CONFIG_ERROR).into_response();
        }
    };

    add_breadcrumb("auth", "Login started", None);

    (
        state
            .set_cookies()
            .set(PKCE_COOKIE, &cookie, PKCE_MAX_AGE_SECS),
        Redirect::to(&auth_url),
    )
        .into_response()
}

/// Finish the customer login.
///
/// Validates the callback against the PKCE cookie, exchanges the authorization
/// code for tokens, and stores the access token in the session cookie.
///
/// # Route
///
/// `GET /api/auth/callback`
#[instrument(skip(state, cookies, query))]
pub async fn callback(
    State(state): State<AppState>,
    cookies: RequestCookies,
    Query(query): Query<CallbackQuery>,
) -> Response {
    match complete_login(&state, &cookies, &query).await {
        Ok((access_token, return_to)) => {
            tracing::info!("Shopify customer authenticated successfully");
            add_breadcrumb("auth", "Login completed", None);

            let session = state.cookie_codec().encode_session(&access_token);
            (
                state
                    .set_cookies()
                    .remove(PKCE_COOKIE)
                    .set(SESSION_COOKIE, &session, SESSION_MAX_AGE_SECS),
                Redirect::to(&return_to),
            )
                .into_response()
        }
        Err(err) => {
            match &err {
                AuthFlowError::Shopify(_) => {
                    tracing::error!(error = %err, "Customer login callback failed");
                }
                _ => tracing::warn!(error = %err, code = err.code(), "Customer login rejected"),
            }
            Redirect::to(&err.redirect_path()).into_response()
        }
    }
}

/// A query value that is set and non-empty.
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Run the callback checks in order, yielding the access token and the path
/// to send the customer to.
async fn complete_login(
    state: &AppState,
    cookies: &RequestCookies,
    query: &CallbackQuery,
) -> Result<(String, String), AuthFlowError> {
    if let Some(error) = present(query.error.as_deref()) {
        if let Some(description) = &query.error_description {
            tracing::debug!(%description, "Identity provider error description");
        }
        return Err(AuthFlowError::Denied(error.to_string()));
    }

    let (Some(code), Some(returned_state)) = (
        present(query.code.as_deref()),
        present(query.state.as_deref()),
    ) else {
        return Err(AuthFlowError::CallbackMissing);
    };

    let Some(cookie) = cookies.get(PKCE_COOKIE) else {
        return Err(AuthFlowError::SessionExpired);
    };

    let pkce = state
        .cookie_codec()
        .decode_pkce(cookie)
        .filter(|pkce| pkce.state == returned_state)
        .ok_or(AuthFlowError::InvalidState)?;

    let oidc = state.customer().openid_configuration().await?;
    let token = state
        .customer()
        .exchange_code(
            &oidc,
            code,
            &state.config().oauth_callback_url(),
            &pkce.code_verifier,
        )
        .await?;

    let return_to = pkce.return_to.unwrap_or_else(|| {
        sanitize_return_to(query.return_to.as_deref(), "/account")
    });

    Ok((token.access_token, return_to))
}

/// Log out and redirect.
///
/// # Route
///
/// `GET /api/auth/logout?returnTo=`
#[instrument(skip(state, query))]
pub async fn logout_redirect(
    State(state): State<AppState>,
    Query(query): Query<ReturnToQuery>,
) -> Response {
    clear_sentry_user();
    let return_to = sanitize_return_to(query.return_to.as_deref(), "/");

    (
        state
            .set_cookies()
            .remove(SESSION_COOKIE)
            .remove(PKCE_COOKIE),
        Redirect::to(&return_to),
    )
        .into_response()
}

/// Log out from a script.
///
/// # Route
///
/// `POST /api/auth/logout`
#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> Response {
    clear_sentry_user();

    (
        state
            .set_cookies()
            .remove(SESSION_COOKIE)
            .remove(PKCE_COOKIE),
        Json(json!({ "ok": true })),
    )
        .into_response()
}

/// Resolve the signed-in customer.
///
/// Any failure (missing or invalid cookie, upstream errors) yields
/// `{"customer": null}`.
///
/// # Route
///
/// `GET /api/auth/session`
#[instrument(skip(state, token))]
pub async fn session(
    State(state): State<AppState>,
    OptionalShopifyCustomer(token): OptionalShopifyCustomer,
) -> Json<SessionResponse> {
    let Some(token) = token else {
        return Json(SessionResponse { customer: None });
    };

    let customer = match state.customer().get_customer(&token).await {
        Ok(customer) => customer,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load customer for session");
            None
        }
    };

    if let Some(customer) = &customer {
        set_sentry_user(&customer.id, customer.email.as_deref());
    }

    Json(SessionResponse { customer })
}
