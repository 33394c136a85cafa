//! Search, product and collection endpoints, plus the router-wide middleware.

use axum::http::StatusCode;
use headless_storefront_integration_tests::{TestContext, VARIANT_ID};
use serde_json::json;

// =============================================================================
// Health & Middleware
// =============================================================================

#[tokio::test]
async fn test_health_carries_request_id_and_security_headers() {
    let ctx = TestContext::new().await;

    let res = ctx.get("/health", &[]).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, "ok");
    assert!(res.headers.contains_key("x-request-id"));
    assert_eq!(res.headers["x-frame-options"], "DENY");
    assert_eq!(res.headers["x-content-type-options"], "nosniff");
    // Served over plain HTTP in tests
    assert!(!res.headers.contains_key("strict-transport-security"));
}

#[tokio::test]
async fn test_api_responses_are_not_cached() {
    let ctx = TestContext::new().await;

    let res = ctx.get("/api/cart", &[]).await;

    assert_eq!(res.headers["cache-control"], "no-store");
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn test_search_short_query_is_empty() {
    let ctx = TestContext::new().await;

    let res = ctx.get("/api/search?q=%20m%20", &[]).await;

    assert_eq!(
        res.json(),
        json!({ "products": [], "productCount": 0, "pages": [] })
    );
}

#[tokio::test]
async fn test_search_returns_products_and_pages() {
    let ctx = TestContext::new().await;

    let res = ctx.get("/api/search?q=MEN", &[]).await;

    let body = res.json();
    assert_eq!(body["productCount"], 2);
    assert_eq!(body["products"][0]["handle"], "linen-shirt");
    assert_eq!(body["products"][0]["price"], "15000.0");
    assert_eq!(
        body["products"][0]["image"]["url"],
        "https://cdn.test/linen-shirt.jpg"
    );
    assert_eq!(
        body["pages"],
        json!([
            { "label": "Women", "href": "/women" },
            { "label": "Men", "href": "/men" }
        ])
    );
}

#[tokio::test]
async fn test_search_upstream_error_keeps_pages() {
    let ctx = TestContext::new().await;

    let res = ctx.get("/api/search?q=error", &[]).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(
        res.json(),
        json!({ "products": [], "productCount": 0, "pages": [] })
    );
}

// =============================================================================
// Product preview
// =============================================================================

#[tokio::test]
async fn test_preview_requires_handle() {
    let ctx = TestContext::new().await;

    let res = ctx.get("/api/products/preview", &[]).await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json(), json!({ "error": "handle required" }));
}

#[tokio::test]
async fn test_preview_unknown_product_is_null() {
    let ctx = TestContext::new().await;

    let res = ctx.get("/api/products/preview?handle=nope", &[]).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, "null");
}

#[tokio::test]
async fn test_preview_product() {
    let ctx = TestContext::new().await;

    let res = ctx
        .get("/api/products/preview?handle=linen-shirt", &[])
        .await;

    let body = res.json();
    assert_eq!(body["handle"], "linen-shirt");
    assert_eq!(
        body["featuredImage"]["url"],
        "https://cdn.test/linen-shirt.jpg"
    );
    assert_eq!(
        body["variants"][0],
        json!({
            "id": VARIANT_ID,
            "title": "M",
            "availableForSale": true,
            "price": { "amount": "15000.0", "currencyCode": "NGN" }
        })
    );
    assert_eq!(
        body["variants"][1]["price"],
        json!({ "amount": "0", "currencyCode": "NGN" })
    );
}

#[tokio::test]
async fn test_preview_upstream_failure_is_null_500() {
    let ctx = TestContext::unreachable();

    let res = ctx
        .get("/api/products/preview?handle=linen-shirt", &[])
        .await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.body, "null");
}

// =============================================================================
// Products & Collections
// =============================================================================

#[tokio::test]
async fn test_product_listing() {
    let ctx = TestContext::new().await;

    let res = ctx.get("/api/products?first=2", &[]).await;

    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body.as_array().map(Vec::len), Some(2));
    assert_eq!(body[1]["title"], "Canvas Tote");
    assert_eq!(body[1]["price"]["amount"], "5000.0");
}

#[tokio::test]
async fn test_product_detail_excludes_itself_from_related() {
    let ctx = TestContext::new().await;

    let res = ctx.get("/api/products/linen-shirt", &[]).await;

    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["product"]["title"], "Linen Shirt");
    assert_eq!(body["product"]["images"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["product"]["minPrice"]["amount"], "15000.0");
    assert_eq!(body["related"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["related"][0]["handle"], "tote");
}

#[tokio::test]
async fn test_product_detail_not_found() {
    let ctx = TestContext::new().await;

    let res = ctx.get("/api/products/nope", &[]).await;

    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json(), json!({ "error": "Product not found: nope" }));
}

#[tokio::test]
async fn test_collection() {
    let ctx = TestContext::new().await;

    let res = ctx.get("/api/collections/summer?first=10", &[]).await;

    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["title"], "Summer");
    assert_eq!(body["products"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_collection_not_found() {
    let ctx = TestContext::new().await;

    let res = ctx.get("/api/collections/winter", &[]).await;

    assert_eq!(res.status, StatusCode::NOT_FOUND);
}
