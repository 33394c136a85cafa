//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Health check (see `app`)
//!
//! # Customer login (strict rate limit)
//! GET  /api/auth/login             - Redirect to Shopify login (PKCE)
//! GET  /api/auth/callback          - Handle OAuth callback
//! GET  /api/auth/logout            - Clear session, redirect
//! POST /api/auth/logout            - Clear session, JSON
//! GET  /api/auth/session           - Current customer or null
//!
//! # Cart
//! GET  /api/cart                   - Cart summary
//! POST /api/cart/add               - Add line (creates cart if needed)
//! POST /api/cart/update            - Set line quantity
//! POST /api/cart/remove            - Remove lines
//!
//! # Catalog
//! GET  /api/search                 - Product + page search
//! GET  /api/products               - Product listing
//! GET  /api/products/preview       - Quick-view preview
//! GET  /api/products/{handle}      - Product detail + related
//! GET  /api/collections/{handle}   - Collection with products
//! ```

pub mod auth;
pub mod cart;
pub mod collections;
pub mod products;
pub mod search;

use axum::{
    Router,
    routing::{get, post},
};

use crate::config::StorefrontConfig;
use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Create the customer login routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login))
        .route("/callback", get(auth::callback))
        .route("/logout", get(auth::logout_redirect).post(auth::logout))
        .route("/session", get(auth::session))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/preview", get(products::preview))
        .route("/{handle}", get(products::show))
}

/// Create the collection routes router.
pub fn collection_routes() -> Router<AppState> {
    Router::new().route("/{handle}", get(collections::show))
}

/// Create all `/api` routes, rate limited when `config.rate_limit` is set.
pub fn routes(config: &StorefrontConfig) -> Router<AppState> {
    let mut auth = auth_routes();
    let mut api = Router::new()
        .nest("/cart", cart_routes())
        .route("/search", get(search::search))
        .nest("/products", product_routes())
        .nest("/collections", collection_routes());

    if config.rate_limit {
        auth = auth.layer(auth_rate_limiter());
        api = api.layer(api_rate_limiter());
    }

    Router::new().nest("/api/auth", auth).nest("/api", api)
}
