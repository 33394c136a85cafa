//! Cart route handlers.
//!
//! The cart lives in Shopify; the browser only keeps its ID in the
//! `shopify_cart_id` cookie. Bodies are read as loose JSON so that missing or
//! mistyped fields produce the same 400 messages the storefront UI expects.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::cookies::{CART_COOKIE, CART_MAX_AGE_SECS, RequestCookies};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::shopify::{CartLine, CartLineInput, CartLineUpdateInput, ShopifyError};
use crate::state::AppState;

/// Largest quantity accepted for a single line.
const MAX_LINE_QUANTITY: i64 = 99;

/// Cart summary for the header badge and cart drawer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub count: i64,
    pub checkout_url: Option<String>,
    pub lines: Vec<CartLine>,
}

impl CartSummary {
    fn empty() -> Self {
        Self {
            count: 0,
            checkout_url: None,
            lines: Vec::new(),
        }
    }
}

/// Response to a successful add.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartResponse {
    pub cart_id: String,
    pub checkout_url: Option<String>,
}

// =============================================================================
// Body Helpers
// =============================================================================

/// Read a JSON number or numeric string, truncated to an integer.
#[allow(clippy::cast_possible_truncation)]
fn numeric(value: Option<&Value>) -> Option<i64> {
    let number = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;

    number.is_finite().then(|| number.trunc() as i64)
}

/// Quantity for an add: clamped to 1..=99, anything unusable becomes 1.
fn add_quantity(body: &Value) -> i64 {
    numeric(body.get("quantity"))
        .filter(|q| *q != 0)
        .unwrap_or(1)
        .clamp(1, MAX_LINE_QUANTITY)
}

/// Quantity for an update: clamped to 0..=99, `None` if not a number.
fn update_quantity(body: &Value) -> Option<i64> {
    numeric(body.get("quantity")).map(|q| q.clamp(0, MAX_LINE_QUANTITY))
}

fn non_empty_str<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Line IDs to remove: `lineIds` (non-strings dropped) or a single `lineId`.
fn line_ids(body: &Value) -> Vec<String> {
    match body.get("lineIds") {
        Some(Value::Array(ids)) => ids
            .iter()
            .filter_map(Value::as_str)
            .map(String::from)
            .collect(),
        _ => body
            .get("lineId")
            .and_then(Value::as_str)
            .map(|id| vec![id.to_string()])
            .unwrap_or_default(),
    }
}

fn require_cart_id(cookies: &RequestCookies) -> Result<&str> {
    cookies
        .get(CART_COOKIE)
        .ok_or_else(|| AppError::BadRequest("No cart".to_string()))
}

// =============================================================================
// Handlers
// =============================================================================

/// Current cart summary.
///
/// Any failure (no cookie, expired cart, upstream error) yields an empty
/// summary.
///
/// # Route
///
/// `GET /api/cart`
#[instrument(skip(state, cookies))]
pub async fn show(State(state): State<AppState>, cookies: RequestCookies) -> Json<CartSummary> {
    let Some(cart_id) = cookies.get(CART_COOKIE) else {
        return Json(CartSummary::empty());
    };

    match state.storefront().get_cart(cart_id).await {
        Ok(cart) => Json(CartSummary {
            count: cart.item_count(),
            checkout_url: cart.checkout_url,
            lines: cart.lines,
        }),
        Err(ShopifyError::NotFound(_)) => Json(CartSummary::empty()),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load cart");
            Json(CartSummary::empty())
        }
    }
}

/// Add a variant to the cart, creating the cart when needed.
///
/// # Route
///
/// `POST /api/cart/add`
#[instrument(skip(state, cookies, body))]
pub async fn add(
    State(state): State<AppState>,
    cookies: RequestCookies,
    Json(body): Json<Value>,
) -> Result<Response> {
    let merchandise_id = non_empty_str(&body, "merchandiseId")
        .or_else(|| non_empty_str(&body, "variantId"))
        .ok_or_else(|| {
            AppError::BadRequest("merchandiseId (variant ID) is required".to_string())
        })?;

    let lines = vec![CartLineInput {
        merchandise_id: merchandise_id.to_string(),
        quantity: add_quantity(&body),
    }];

    let existing = cookies.get(CART_COOKIE);
    let cart = match existing {
        Some(cart_id) => match state.storefront().add_to_cart(cart_id, lines.clone()).await {
            Err(ShopifyError::NotFound(_)) => {
                tracing::info!("Cart cookie points at a missing cart, creating a new one");
                state.storefront().create_cart(lines).await?
            }
            result => result?,
        },
        None => state.storefront().create_cart(lines).await?,
    };

    add_breadcrumb(
        "cart",
        "Added line",
        Some(&[("merchandise_id", merchandise_id)]),
    );

    let body = Json(AddToCartResponse {
        cart_id: cart.id.clone(),
        checkout_url: cart.checkout_url,
    });

    if existing == Some(cart.id.as_str()) {
        return Ok(body.into_response());
    }

    Ok((
        state
            .set_cookies()
            .set(CART_COOKIE, &cart.id, CART_MAX_AGE_SECS),
        body,
    )
        .into_response())
}

/// Set a line's quantity. Zero removes the line.
///
/// # Route
///
/// `POST /api/cart/update`
#[instrument(skip(state, cookies, body))]
pub async fn update(
    State(state): State<AppState>,
    cookies: RequestCookies,
    Json(body): Json<Value>,
) -> Result<Json<Value>> {
    let line_id = non_empty_str(&body, "lineId")
        .ok_or_else(|| AppError::BadRequest("lineId is required".to_string()))?;

    let quantity = update_quantity(&body).ok_or_else(|| {
        AppError::BadRequest("quantity must be a number between 0 and 99".to_string())
    })?;

    let cart_id = require_cart_id(&cookies)?;

    state
        .storefront()
        .update_cart(
            cart_id,
            vec![CartLineUpdateInput {
                id: line_id.to_string(),
                quantity,
            }],
        )
        .await?;

    Ok(Json(json!({ "ok": true })))
}

/// Remove lines from the cart.
///
/// # Route
///
/// `POST /api/cart/remove`
#[instrument(skip(state, cookies, body))]
pub async fn remove(
    State(state): State<AppState>,
    cookies: RequestCookies,
    Json(body): Json<Value>,
) -> Result<Json<Value>> {
    let line_ids = line_ids(&body);
    if line_ids.is_empty() {
        return Err(AppError::BadRequest(
            "lineIds or lineId is required".to_string(),
        ));
    }

    let cart_id = require_cart_id(&cookies)?;

    state.storefront().remove_from_cart(cart_id, line_ids).await?;

    Ok(Json(json!({ "ok": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_quantity_clamps_and_defaults() {
        assert_eq!(add_quantity(&json!({ "quantity": 3 })), 3);
        assert_eq!(add_quantity(&json!({ "quantity": 500 })), 99);
        assert_eq!(add_quantity(&json!({ "quantity": -4 })), 1);
        assert_eq!(add_quantity(&json!({ "quantity": "2" })), 2);
        assert_eq!(add_quantity(&json!({ "quantity": "lots" })), 1);
        assert_eq!(add_quantity(&json!({ "quantity": 0 })), 1);
        assert_eq!(add_quantity(&json!({})), 1);
    }

    #[test]
    fn test_update_quantity() {
        assert_eq!(update_quantity(&json!({ "quantity": 0 })), Some(0));
        assert_eq!(update_quantity(&json!({ "quantity": 150 })), Some(99));
        assert_eq!(update_quantity(&json!({ "quantity": -1 })), Some(0));
        assert_eq!(update_quantity(&json!({ "quantity": "abc" })), None);
        assert_eq!(update_quantity(&json!({})), None);
    }

    #[test]
    fn test_line_ids_drops_non_strings() {
        assert_eq!(
            line_ids(&json!({ "lineIds": ["a", 1, null, "b"] })),
            vec!["a".to_string(), "b".to_string()]
        );
        assert_eq!(line_ids(&json!({ "lineId": "c" })), vec!["c".to_string()]);
        assert!(line_ids(&json!({ "lineId": 7 })).is_empty());
        assert!(line_ids(&json!({})).is_empty());
    }

    #[test]
    fn test_variant_id_must_be_non_empty_string() {
        let body = json!({ "merchandiseId": "", "variantId": "gid://shopify/ProductVariant/1" });
        assert_eq!(
            non_empty_str(&body, "merchandiseId").or_else(|| non_empty_str(&body, "variantId")),
            Some("gid://shopify/ProductVariant/1")
        );
        assert_eq!(non_empty_str(&json!({ "merchandiseId": 5 }), "merchandiseId"), None);
    }
}
