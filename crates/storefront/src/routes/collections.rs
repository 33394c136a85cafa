//! Collection route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::instrument;

use super::products::CatalogQuery;
use crate::error::{AppError, Result};
use crate::shopify::{Collection, ShopifyError};
use crate::state::AppState;

/// Collection with its first page of products.
///
/// # Route
///
/// `GET /api/collections/{handle}?first=`
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<Collection>> {
    match state
        .storefront()
        .get_collection_by_handle(&handle, query.page_size())
        .await
    {
        Ok(collection) => Ok(Json(collection)),
        Err(ShopifyError::NotFound(_)) => Err(AppError::NotFound(format!(
            "Collection not found: {handle}"
        ))),
        Err(e) => {
            tracing::error!(error = %e, handle = %handle, "Failed to fetch collection");
            Err(e.into())
        }
    }
}
