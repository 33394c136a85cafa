//! Integration test harness for the headless storefront.
//!
//! [`TestContext`] runs the real router in-process against a mock Shopify
//! (Storefront GraphQL, `.well-known` discovery, OAuth token endpoint and
//! Customer Account GraphQL) served by axum on an ephemeral port.
//!
//! ```rust,ignore
//! let ctx = TestContext::new().await;
//! let res = ctx.get("/api/cart", &[]).await;
//! assert_eq!(res.status, StatusCode::OK);
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::{Form, State};
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use headless_storefront::config::{ShopifyConfig, StorefrontConfig, StorefrontToken};
use headless_storefront::services::auth::{CookieCodec, PkceCookie};
use headless_storefront::state::AppState;
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Session secret shared by the app and tests that forge cookies.
pub const SESSION_SECRET: &str = "k3Jx9-Qm2vLr7TzW8pNc4YhB6sDf1GaE";

/// Access token the mock token endpoint issues for [`GOOD_CODE`].
pub const ACCESS_TOKEN: &str = "cat_live_7f3a";

/// Authorization codes understood by the mock token endpoint.
pub const GOOD_CODE: &str = "good-code";
pub const REJECTED_CODE: &str = "rejected-code";
pub const TOKENLESS_CODE: &str = "tokenless-code";

/// Cart IDs understood by the mock Storefront API.
pub const LIVE_CART: &str = "gid://shopify/Cart/live";
pub const GONE_CART: &str = "gid://shopify/Cart/gone";
pub const NEW_CART: &str = "gid://shopify/Cart/new";

pub const VARIANT_ID: &str = "gid://shopify/ProductVariant/1";
pub const SOLD_OUT_VARIANT: &str = "gid://shopify/ProductVariant/soldout";
pub const MISSING_LINE: &str = "gid://shopify/CartLine/missing";

// =============================================================================
// Test Context
// =============================================================================

/// A running mock upstream plus the storefront router wired to it.
pub struct TestContext {
    pub app: Router,
    pub upstream: String,
    pub codec: CookieCodec,
}

/// A buffered response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Body parsed as JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }

    /// `Location` header.
    #[must_use]
    pub fn location(&self) -> &str {
        self.headers.get(LOCATION).unwrap().to_str().unwrap()
    }

    /// Every `Set-Cookie` header value.
    #[must_use]
    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    /// The `Set-Cookie` header for `name`, if any.
    #[must_use]
    pub fn set_cookie(&self, name: &str) -> Option<String> {
        let prefix = format!("{name}=");
        self.set_cookies()
            .into_iter()
            .find(|c| c.starts_with(&prefix))
    }

    /// Value of the `Set-Cookie` for `name`.
    #[must_use]
    pub fn cookie_value(&self, name: &str) -> Option<String> {
        let cookie = self.set_cookie(name)?;
        let pair = cookie.split(';').next()?;
        pair.split_once('=').map(|(_, v)| v.to_string())
    }
}

fn test_config(store_origin: &str) -> StorefrontConfig {
    StorefrontConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        session_secret: SecretString::from(SESSION_SECRET),
        shopify: ShopifyConfig {
            store_domain: "test-shop.myshopify.com".to_string(),
            store_origin: store_origin.to_string(),
            api_version: "2026-01".to_string(),
            storefront_endpoint: format!("{store_origin}/api/2026-01/graphql.json"),
            storefront_token: StorefrontToken::Public("public-token".to_string()),
            customer_client_id: "shp_client".to_string(),
            customer_client_secret: None,
        },
        rate_limit: false,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

impl TestContext {
    /// Start a mock upstream and build the app against it.
    pub async fn new() -> Self {
        let upstream = spawn_mock_shopify().await;
        Self::with_store_origin(&upstream)
    }

    /// Build the app against a store origin nothing listens on.
    #[must_use]
    pub fn unreachable() -> Self {
        Self::with_store_origin("http://127.0.0.1:9")
    }

    fn with_store_origin(origin: &str) -> Self {
        let state = AppState::new(test_config(origin)).unwrap();
        let codec = state.cookie_codec().clone();
        Self {
            app: headless_storefront::app(state),
            upstream: origin.to_string(),
            codec,
        }
    }

    /// Signed session cookie pair for `access_token`.
    #[must_use]
    pub fn session_cookie(&self, access_token: &str) -> String {
        format!(
            "shopify_customer_session={}",
            self.codec.encode_session(access_token)
        )
    }

    /// Signed PKCE cookie pair.
    #[must_use]
    pub fn pkce_cookie(&self, state: &str, return_to: Option<&str>) -> String {
        let pkce = PkceCookie {
            state: state.to_string(),
            code_verifier: "verifier-0123456789-abcdefghijklmnopqrstuvwxyz".to_string(),
            return_to: return_to.map(String::from),
        };
        format!("shopify_pkce={}", self.codec.encode_pkce(&pkce).unwrap())
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        TestResponse {
            status,
            headers,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    /// `GET path` with the given cookie pairs.
    pub async fn get(&self, path: &str, cookies: &[&str]) -> TestResponse {
        let mut builder = Request::builder().method("GET").uri(path);
        if !cookies.is_empty() {
            builder = builder.header(COOKIE, cookies.join("; "));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// `POST path` with a JSON body and the given cookie pairs.
    pub async fn post_json(&self, path: &str, body: &Value, cookies: &[&str]) -> TestResponse {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header(CONTENT_TYPE, "application/json");
        if !cookies.is_empty() {
            builder = builder.header(COOKIE, cookies.join("; "));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }
}

// =============================================================================
// Mock Shopify
// =============================================================================

/// Serve the mock upstream on an ephemeral port and return its origin.
pub async fn spawn_mock_shopify() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let origin = format!("http://{addr}");

    let router = Router::new()
        .route("/api/2026-01/graphql.json", post(storefront_graphql))
        .route("/.well-known/openid-configuration", get(openid_configuration))
        .route("/.well-known/customer-account-api", get(customer_api_configuration))
        .route("/oauth/token", post(token))
        .route("/customer/graphql", post(customer_graphql))
        .with_state(origin.clone());

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    origin
}

async fn openid_configuration(State(origin): State<String>) -> Json<Value> {
    Json(json!({
        "issuer": origin,
        "authorization_endpoint": format!("{origin}/oauth/authorize"),
        "token_endpoint": format!("{origin}/oauth/token"),
        "end_session_endpoint": format!("{origin}/logout"),
    }))
}

async fn customer_api_configuration(State(origin): State<String>) -> Json<Value> {
    Json(json!({ "graphql_api": format!("{origin}/customer/graphql") }))
}

async fn token(Form(form): Form<HashMap<String, String>>) -> Response {
    match form.get("code").map(String::as_str) {
        Some(GOOD_CODE) if form.contains_key("code_verifier") => Json(json!({
            "access_token": ACCESS_TOKEN,
            "id_token": "id-token",
            "refresh_token": "refresh-token",
            "expires_in": 3600,
        }))
        .into_response(),
        Some(TOKENLESS_CODE) => Json(json!({ "id_token": "id-token" })).into_response(),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_grant" })),
        )
            .into_response(),
    }
}

async fn customer_graphql(headers: HeaderMap) -> Response {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        == Some(ACCESS_TOKEN);

    if !authorized {
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }

    Json(json!({
        "data": {
            "customer": {
                "id": "gid://shopify/Customer/7",
                "firstName": "Ada",
                "lastName": "Obi",
                "emailAddress": { "emailAddress": "ada@example.com" }
            }
        }
    }))
    .into_response()
}

fn money(amount: &str) -> Value {
    json!({ "amount": amount, "currencyCode": "NGN" })
}

fn image(name: &str) -> Value {
    json!({ "url": format!("https://cdn.test/{name}.jpg"), "altText": null })
}

fn product_summary(handle: &str, title: &str, price: &str) -> Value {
    json!({
        "id": format!("gid://shopify/Product/{handle}"),
        "title": title,
        "handle": handle,
        "tags": ["new"],
        "featuredImage": image(handle),
        "priceRange": { "minVariantPrice": money(price) }
    })
}

fn catalog() -> Value {
    json!({
        "edges": [
            { "node": product_summary("linen-shirt", "Linen Shirt", "15000.0") },
            { "node": product_summary("tote", "Canvas Tote", "5000.0") },
        ]
    })
}

fn product(handle: &str) -> Value {
    json!({
        "id": format!("gid://shopify/Product/{handle}"),
        "title": "Linen Shirt",
        "handle": handle,
        "description": "Breathable linen.",
        "descriptionHtml": "<p>Breathable linen.</p>",
        "tags": ["new"],
        "featuredImage": image(handle),
        "priceRange": { "minVariantPrice": money("15000.0") },
        "media": { "edges": [
            { "node": { "image": image(handle) } },
            { "node": {} }
        ] },
        "variants": { "edges": [
            { "node": {
                "id": VARIANT_ID,
                "title": "M",
                "availableForSale": true,
                "selectedOptions": [{ "name": "Size", "value": "M" }],
                "price": money("15000.0")
            } },
            { "node": {
                "id": "gid://shopify/ProductVariant/2",
                "title": "L",
                "availableForSale": false,
                "selectedOptions": [{ "name": "Size", "value": "L" }],
                "price": null
            } }
        ] }
    })
}

fn cart(id: &str, quantity: i64) -> Value {
    json!({
        "id": id,
        "checkoutUrl": "https://test-shop.myshopify.com/cart/c/1",
        "totalQuantity": quantity,
        "lines": { "edges": [{ "node": {
            "id": "gid://shopify/CartLine/1",
            "quantity": quantity,
            "cost": { "totalAmount": money("30000.0") },
            "merchandise": {
                "id": VARIANT_ID,
                "title": "M",
                "image": null,
                "price": money("15000.0"),
                "compareAtPrice": null,
                "product": {
                    "title": "Linen Shirt",
                    "handle": "linen-shirt",
                    "featuredImage": image("linen-shirt")
                }
            }
        } }] }
    })
}

fn payload(key: &str, cart: Value, user_errors: Value) -> Value {
    json!({ "data": { key: { "cart": cart, "userErrors": user_errors } } })
}

async fn storefront_graphql(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if headers.get("x-shopify-storefront-access-token").is_none() {
        return (StatusCode::UNAUTHORIZED, "missing token").into_response();
    }

    let vars = &body["variables"];
    let operation = body["operationName"].as_str().unwrap_or_default();

    let response = match operation {
        "GetProducts" => match vars["query"].as_str() {
            Some("error") => json!({ "data": null, "errors": [{ "message": "Invalid search query" }] }),
            _ => json!({ "data": { "products": catalog() } }),
        },
        "GetProductByHandle" => match vars["handle"].as_str() {
            Some("linen-shirt") => json!({ "data": { "product": product("linen-shirt") } }),
            _ => json!({ "data": { "product": null } }),
        },
        "GetCollectionByHandle" => match vars["handle"].as_str() {
            Some("summer") => json!({ "data": { "collection": {
                "id": "gid://shopify/Collection/1",
                "title": "Summer",
                "handle": "summer",
                "description": "Warm weather edit",
                "image": null,
                "products": catalog()
            } } }),
            _ => json!({ "data": { "collection": null } }),
        },
        "GetCart" => match vars["cartId"].as_str() {
            Some(LIVE_CART) => json!({ "data": { "cart": cart(LIVE_CART, 2) } }),
            _ => json!({ "data": { "cart": null } }),
        },
        "CreateCart" => {
            let line = &vars["input"]["lines"][0];
            if line["merchandiseId"].as_str() == Some(SOLD_OUT_VARIANT) {
                payload(
                    "cartCreate",
                    Value::Null,
                    json!([{ "field": ["input", "lines", "0"], "message": "Variant is sold out" }]),
                )
            } else {
                let quantity = line["quantity"].as_i64().unwrap_or_default();
                payload("cartCreate", cart(NEW_CART, quantity), json!([]))
            }
        }
        "AddToCart" => match vars["cartId"].as_str() {
            Some(GONE_CART) => payload(
                "cartLinesAdd",
                Value::Null,
                json!([{ "field": ["cartId"], "message": "The specified cart does not exist." }]),
            ),
            Some(id) => {
                let quantity = vars["lines"][0]["quantity"].as_i64().unwrap_or_default();
                payload("cartLinesAdd", cart(id, quantity), json!([]))
            }
            None => json!({ "errors": [{ "message": "cartId required" }] }),
        },
        "UpdateCartLines" | "RemoveFromCart" if vars["cartId"].as_str() == Some(GONE_CART) => {
            let root = if operation == "UpdateCartLines" {
                "cartLinesUpdate"
            } else {
                "cartLinesRemove"
            };
            payload(
                root,
                Value::Null,
                json!([{ "field": ["cartId"], "message": "The specified cart does not exist." }]),
            )
        }
        "UpdateCartLines" => {
            if vars["lines"][0]["id"].as_str() == Some(MISSING_LINE) {
                payload(
                    "cartLinesUpdate",
                    Value::Null,
                    json!([{ "field": ["lines", "0", "id"], "message": "Line not found" }]),
                )
            } else {
                payload("cartLinesUpdate", cart(LIVE_CART, 1), json!([]))
            }
        }
        "RemoveFromCart" => payload("cartLinesRemove", cart(LIVE_CART, 0), json!([])),
        other => json!({ "errors": [{ "message": format!("Unknown operation {other}") }] }),
    };

    Json(response).into_response()
}
