//! Search route handler.
//!
//! Combines a Storefront product search with a fixed list of site pages.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::shopify::{Image, ProductSummary};
use crate::state::AppState;

/// Queries shorter than this return nothing.
const MIN_QUERY_CHARS: usize = 2;

/// Products returned per search.
const SEARCH_LIMIT: i64 = 12;

/// A navigable site page offered alongside product results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchPage {
    pub label: &'static str,
    pub href: &'static str,
}

const SEARCH_PAGES: &[SearchPage] = &[
    SearchPage { label: "All", href: "/" },
    SearchPage { label: "Women", href: "/women" },
    SearchPage { label: "Men", href: "/men" },
    SearchPage { label: "Kids", href: "/kids" },
    SearchPage { label: "Brands", href: "/brands" },
    SearchPage { label: "Collections", href: "/collections" },
    SearchPage { label: "Sale", href: "/sale" },
    SearchPage { label: "Wishlist", href: "/wishlist" },
    SearchPage { label: "Return Form", href: "/returns" },
];

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// A product hit.
#[derive(Debug, Serialize)]
pub struct SearchProduct {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub image: Option<Image>,
    /// Minimum variant price amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
}

impl From<ProductSummary> for SearchProduct {
    fn from(product: ProductSummary) -> Self {
        Self {
            id: product.id,
            title: product.title,
            handle: product.handle,
            image: product.image,
            price: product.price.map(|money| money.amount),
        }
    }
}

/// Search results.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub products: Vec<SearchProduct>,
    pub product_count: usize,
    pub pages: Vec<SearchPage>,
}

impl SearchResponse {
    fn empty() -> Self {
        Self {
            products: Vec::new(),
            product_count: 0,
            pages: Vec::new(),
        }
    }
}

/// Pages whose label contains the (lower-cased) query.
fn matching_pages(q: &str) -> Vec<SearchPage> {
    SEARCH_PAGES
        .iter()
        .filter(|page| page.label.to_lowercase().contains(q))
        .copied()
        .collect()
}

/// Search products and pages.
///
/// A failed product search (e.g. query syntax rejected upstream) still returns
/// the matching pages.
///
/// # Route
///
/// `GET /api/search?q=`
#[instrument(skip(state, query), fields(q = %query.q))]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<SearchResponse> {
    let q = query.q.trim().to_lowercase();

    if q.chars().count() < MIN_QUERY_CHARS {
        return Json(SearchResponse::empty());
    }

    let pages = matching_pages(&q);

    let products: Vec<SearchProduct> = match state
        .storefront()
        .search_products(&q, SEARCH_LIMIT)
        .await
    {
        Ok(products) => products.into_iter().map(SearchProduct::from).collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Product search failed");
            Vec::new()
        }
    };

    Json(SearchResponse {
        product_count: products.len(),
        products,
        pages,
    })
}
