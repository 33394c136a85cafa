//! Product route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::shopify::{Image, Money, Product, ProductSummary, ShopifyError};
use crate::state::AppState;

/// Default page size for catalog listings.
const DEFAULT_PAGE_SIZE: i64 = 20;

/// Shopify's connection page limit.
const MAX_PAGE_SIZE: i64 = 250;

/// Products considered for "related" suggestions.
const RELATED_POOL: i64 = 12;

/// Paging query parameters for catalog listings.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    pub first: Option<i64>,
}

impl CatalogQuery {
    /// Requested page size clamped to what Shopify accepts.
    #[must_use]
    pub fn page_size(&self) -> i64 {
        self.first
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }
}

/// Preview query parameters.
#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub handle: Option<String>,
}

/// Compact variant for the quick-view modal.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewVariant {
    pub id: String,
    pub title: String,
    pub available_for_sale: bool,
    pub price: Money,
}

/// Compact product for the quick-view modal.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPreview {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub featured_image: Option<Image>,
    pub variants: Vec<PreviewVariant>,
}

/// Price shown for variants Shopify returned without one.
fn fallback_price() -> Money {
    Money {
        amount: "0".to_string(),
        currency_code: "NGN".to_string(),
    }
}

impl From<Product> for ProductPreview {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            title: product.title,
            handle: product.handle,
            featured_image: product.featured_image,
            variants: product
                .variants
                .into_iter()
                .map(|variant| PreviewVariant {
                    id: variant.id,
                    title: variant.title,
                    available_for_sale: variant.available_for_sale,
                    price: variant.price.unwrap_or_else(fallback_price),
                })
                .collect(),
        }
    }
}

/// Product detail with related products.
#[derive(Debug, Serialize)]
pub struct ProductDetail {
    pub product: Product,
    pub related: Vec<ProductSummary>,
}

/// Compact product preview.
///
/// Returns JSON `null` when the product doesn't exist, and `null` with 500
/// when Shopify can't be reached.
///
/// # Route
///
/// `GET /api/products/preview?handle=`
#[instrument(skip(state, query))]
pub async fn preview(State(state): State<AppState>, Query(query): Query<PreviewQuery>) -> Response {
    let Some(handle) = query.handle.filter(|h| !h.is_empty()) else {
        return AppError::BadRequest("handle required".to_string()).into_response();
    };

    match state.storefront().get_product_by_handle(&handle).await {
        Ok(product) => Json(Some(ProductPreview::from(product))).into_response(),
        Err(ShopifyError::NotFound(_)) => Json(None::<ProductPreview>).into_response(),
        Err(e) => {
            tracing::error!(error = %e, handle = %handle, "Failed to load product preview");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(None::<ProductPreview>)).into_response()
        }
    }
}

/// Product listing.
///
/// # Route
///
/// `GET /api/products?first=`
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<Vec<ProductSummary>>> {
    let products = state.storefront().get_products(query.page_size()).await?;
    Ok(Json(products))
}

/// Product detail.
///
/// Related products are drawn from the head of the catalog, excluding this
/// product. A failure to load them leaves the list empty.
///
/// # Route
///
/// `GET /api/products/{handle}`
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<Json<ProductDetail>> {
    let product = match state.storefront().get_product_by_handle(&handle).await {
        Ok(product) => product,
        Err(ShopifyError::NotFound(_)) => {
            return Err(AppError::NotFound(format!("Product not found: {handle}")));
        }
        Err(e) => return Err(e.into()),
    };

    let related = match state.storefront().get_products(RELATED_POOL).await {
        Ok(products) => products
            .into_iter()
            .filter(|p| p.handle != product.handle)
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load related products");
            Vec::new()
        }
    };

    Ok(Json(ProductDetail { product, related }))
}
