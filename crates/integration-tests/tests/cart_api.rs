//! Cart endpoints against a mock Storefront API.

use axum::http::StatusCode;
use headless_storefront_integration_tests::{
    GONE_CART, LIVE_CART, MISSING_LINE, NEW_CART, SOLD_OUT_VARIANT, TestContext, VARIANT_ID,
};
use serde_json::json;

fn cart_cookie(id: &str) -> String {
    format!("shopify_cart_id={id}")
}

// =============================================================================
// GET /api/cart
// =============================================================================

#[tokio::test]
async fn test_cart_without_cookie_is_empty() {
    let ctx = TestContext::new().await;

    let res = ctx.get("/api/cart", &[]).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(
        res.json(),
        json!({ "count": 0, "checkoutUrl": null, "lines": [] })
    );
}

#[tokio::test]
async fn test_cart_summary_sums_line_quantities() {
    let ctx = TestContext::new().await;

    let res = ctx.get("/api/cart", &[&cart_cookie(LIVE_CART)]).await;

    let body = res.json();
    assert_eq!(body["count"], 2);
    assert_eq!(
        body["checkoutUrl"],
        "https://test-shop.myshopify.com/cart/c/1"
    );
    assert_eq!(body["lines"][0]["title"], "Linen Shirt");
    assert_eq!(body["lines"][0]["merchandiseId"], VARIANT_ID);
    assert_eq!(body["lines"][0]["productHandle"], "linen-shirt");
    assert_eq!(
        body["lines"][0]["image"]["url"],
        "https://cdn.test/linen-shirt.jpg"
    );
}

#[tokio::test]
async fn test_cart_that_no_longer_exists_is_empty() {
    let ctx = TestContext::new().await;

    let res = ctx.get("/api/cart", &[&cart_cookie(GONE_CART)]).await;

    assert_eq!(res.json()["count"], 0);
    assert_eq!(res.json()["lines"], json!([]));
}

#[tokio::test]
async fn test_cart_with_unreachable_shopify_is_empty() {
    let ctx = TestContext::unreachable();

    let res = ctx.get("/api/cart", &[&cart_cookie(LIVE_CART)]).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["count"], 0);
}

// =============================================================================
// POST /api/cart/add
// =============================================================================

#[tokio::test]
async fn test_add_requires_variant_id() {
    let ctx = TestContext::new().await;

    let res = ctx
        .post_json("/api/cart/add", &json!({ "quantity": 1 }), &[])
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        res.json(),
        json!({ "error": "merchandiseId (variant ID) is required" })
    );
}

#[tokio::test]
async fn test_add_without_cart_creates_one_and_sets_cookie() {
    let ctx = TestContext::new().await;

    let res = ctx
        .post_json(
            "/api/cart/add",
            &json!({ "variantId": VARIANT_ID, "quantity": 250 }),
            &[],
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["cartId"], NEW_CART);
    assert_eq!(
        res.json()["checkoutUrl"],
        "https://test-shop.myshopify.com/cart/c/1"
    );

    assert_eq!(res.cookie_value("shopify_cart_id").as_deref(), Some(NEW_CART));
    let cookie = res.set_cookie("shopify_cart_id").unwrap();
    assert!(cookie.contains("Max-Age=1209600"));
    assert!(cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn test_add_to_existing_cart_keeps_cookie() {
    let ctx = TestContext::new().await;

    let res = ctx
        .post_json(
            "/api/cart/add",
            &json!({ "merchandiseId": VARIANT_ID, "quantity": "3" }),
            &[&cart_cookie(LIVE_CART)],
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["cartId"], LIVE_CART);
    assert!(res.set_cookie("shopify_cart_id").is_none());
}

#[tokio::test]
async fn test_add_to_missing_cart_creates_new_cart() {
    let ctx = TestContext::new().await;

    let res = ctx
        .post_json(
            "/api/cart/add",
            &json!({ "merchandiseId": VARIANT_ID }),
            &[&cart_cookie(GONE_CART)],
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["cartId"], NEW_CART);
    assert_eq!(res.cookie_value("shopify_cart_id").as_deref(), Some(NEW_CART));
}

#[tokio::test]
async fn test_add_user_error_is_unprocessable() {
    let ctx = TestContext::new().await;

    let res = ctx
        .post_json(
            "/api/cart/add",
            &json!({ "merchandiseId": SOLD_OUT_VARIANT, "quantity": 1 }),
            &[],
        )
        .await;

    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.json(), json!({ "error": "Variant is sold out" }));
    assert!(res.set_cookie("shopify_cart_id").is_none());
}

// =============================================================================
// POST /api/cart/update
// =============================================================================

#[tokio::test]
async fn test_update_requires_line_id() {
    let ctx = TestContext::new().await;

    let res = ctx
        .post_json(
            "/api/cart/update",
            &json!({ "quantity": 2 }),
            &[&cart_cookie(LIVE_CART)],
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json(), json!({ "error": "lineId is required" }));
}

#[tokio::test]
async fn test_update_rejects_non_numeric_quantity() {
    let ctx = TestContext::new().await;

    let res = ctx
        .post_json(
            "/api/cart/update",
            &json!({ "lineId": "gid://shopify/CartLine/1", "quantity": "many" }),
            &[&cart_cookie(LIVE_CART)],
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_without_cart() {
    let ctx = TestContext::new().await;

    let res = ctx
        .post_json(
            "/api/cart/update",
            &json!({ "lineId": "gid://shopify/CartLine/1", "quantity": 2 }),
            &[],
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json(), json!({ "error": "No cart" }));
}

#[tokio::test]
async fn test_update_sets_quantity() {
    let ctx = TestContext::new().await;

    let res = ctx
        .post_json(
            "/api/cart/update",
            &json!({ "lineId": "gid://shopify/CartLine/1", "quantity": 0 }),
            &[&cart_cookie(LIVE_CART)],
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json(), json!({ "ok": true }));
}

#[tokio::test]
async fn test_update_missing_cart_is_unprocessable() {
    let ctx = TestContext::new().await;

    let res = ctx
        .post_json(
            "/api/cart/update",
            &json!({ "lineId": "gid://shopify/CartLine/1", "quantity": 2 }),
            &[&cart_cookie(GONE_CART)],
        )
        .await;

    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        res.json(),
        json!({ "error": "The specified cart does not exist." })
    );
}

#[tokio::test]
async fn test_update_user_error_is_unprocessable() {
    let ctx = TestContext::new().await;

    let res = ctx
        .post_json(
            "/api/cart/update",
            &json!({ "lineId": MISSING_LINE, "quantity": 1 }),
            &[&cart_cookie(LIVE_CART)],
        )
        .await;

    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.json(), json!({ "error": "Line not found" }));
}

// =============================================================================
// POST /api/cart/remove
// =============================================================================

#[tokio::test]
async fn test_remove_requires_line_ids() {
    let ctx = TestContext::new().await;

    let res = ctx
        .post_json(
            "/api/cart/remove",
            &json!({ "lineIds": [1, 2] }),
            &[&cart_cookie(LIVE_CART)],
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json(), json!({ "error": "lineIds or lineId is required" }));
}

#[tokio::test]
async fn test_remove_without_cart() {
    let ctx = TestContext::new().await;

    let res = ctx
        .post_json(
            "/api/cart/remove",
            &json!({ "lineId": "gid://shopify/CartLine/1" }),
            &[],
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json(), json!({ "error": "No cart" }));
}

#[tokio::test]
async fn test_remove_lines() {
    let ctx = TestContext::new().await;

    let res = ctx
        .post_json(
            "/api/cart/remove",
            &json!({ "lineIds": ["gid://shopify/CartLine/1", null] }),
            &[&cart_cookie(LIVE_CART)],
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json(), json!({ "ok": true }));
}

#[tokio::test]
async fn test_remove_from_missing_cart_is_unprocessable() {
    let ctx = TestContext::new().await;

    let res = ctx
        .post_json(
            "/api/cart/remove",
            &json!({ "lineId": "gid://shopify/CartLine/1" }),
            &[&cart_cookie(GONE_CART)],
        )
        .await;

    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        res.json(),
        json!({ "error": "The specified cart does not exist." })
    );
    assert!(res.set_cookie("shopify_cart_id").is_none());
}
