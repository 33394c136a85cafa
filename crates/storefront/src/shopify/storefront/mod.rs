//! Shopify Storefront API client implementation.
//!
//! Uses `graphql_client` for the query envelope with `reqwest` 0.13 for HTTP.
//! Caches products, product listings and collections using `moka` (5-minute TTL).

mod cache;
mod conversions;
pub mod queries;

use std::sync::Arc;
use std::time::Duration;

use graphql_client::{GraphQLQuery, Response};
use moka::future::Cache;
use tracing::{debug, instrument};

use crate::config::{ShopifyConfig, StorefrontToken};
use crate::shopify::ShopifyError;
use crate::shopify::types::{
    Cart, CartLineInput, CartLineUpdateInput, Collection, Product, ProductSummary,
};

use cache::CacheValue;
use conversions::{
    convert_cart, convert_collection, convert_product, convert_product_summary, first_user_error,
    is_missing_cart,
};
use queries::{
    AddToCart, CreateCart, GetCart, GetCollectionByHandle, GetProductByHandle, GetProducts,
    RemoveFromCart, UpdateCartLines, add_to_cart, create_cart, get_cart,
    get_collection_by_handle, get_product_by_handle, get_products, remove_from_cart, shared,
    update_cart_lines,
};

const CACHE_TTL: Duration = Duration::from_secs(300);

// =============================================================================
// StorefrontClient
// =============================================================================

/// Client for the Shopify Storefront API.
///
/// Provides access to products, collections, search and cart operations.
/// Catalog reads are cached for 5 minutes; carts and searches never are.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    endpoint: String,
    token: StorefrontToken,
    cache: Cache<String, CacheValue>,
}

impl StorefrontClient {
    /// Create a new Storefront API client.
    #[must_use]
    pub fn new(config: &ShopifyConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(StorefrontClientInner {
                client: reqwest::Client::new(),
                endpoint: config.storefront_endpoint.clone(),
                token: config.storefront_token.clone(),
                cache,
            }),
        }
    }

    /// Execute a GraphQL operation.
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, ShopifyError> {
        let request_body = Q::build_query(variables);

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            // Public and private tokens use different headers
            .header(self.inner.token.header_name(), self.inner.token.value())
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        // Read as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                operation = request_body.operation_name,
                body = %truncate(&response_text, 500),
                "Shopify API returned non-success status"
            );
            return Err(ShopifyError::message(format!(
                "HTTP {status}: {}",
                truncate(&response_text, 200)
            )));
        }

        let response: Response<Q::ResponseData> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    operation = request_body.operation_name,
                    body = %truncate(&response_text, 500),
                    "Failed to parse Shopify GraphQL response"
                );
                return Err(ShopifyError::Parse(e));
            }
        };

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            debug!(errors = ?errors, "GraphQL errors in response");
            return Err(ShopifyError::GraphQL(
                errors.into_iter().map(Into::into).collect(),
            ));
        }

        response.data.ok_or_else(|| {
            tracing::error!(
                operation = request_body.operation_name,
                "Shopify GraphQL response has no data and no errors"
            );
            ShopifyError::message("No data in response")
        })
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get a product by its handle.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::NotFound` if no product has this handle, or an
    /// error if the API request fails.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_product_by_handle(&self, handle: &str) -> Result<Product, ShopifyError> {
        let cache_key = format!("product:{handle}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let variables = get_product_by_handle::Variables {
            handle: handle.to_string(),
        };

        let data = self.execute::<GetProductByHandle>(variables).await?;

        let product_data = data
            .product
            .ok_or_else(|| ShopifyError::NotFound(format!("Product not found: {handle}")))?;

        let product = convert_product(product_data);

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get the first `first` products in the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(&self, first: i64) -> Result<Vec<ProductSummary>, ShopifyError> {
        let cache_key = format!("products:{first}");

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products = self.list_products(first, None).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Search products with Shopify's product query syntax. Not cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails (including query syntax errors).
    #[instrument(skip(self), fields(query = %query))]
    pub async fn search_products(
        &self,
        query: &str,
        first: i64,
    ) -> Result<Vec<ProductSummary>, ShopifyError> {
        self.list_products(first, Some(query.to_string())).await
    }

    async fn list_products(
        &self,
        first: i64,
        query: Option<String>,
    ) -> Result<Vec<ProductSummary>, ShopifyError> {
        let data = self
            .execute::<GetProducts>(get_products::Variables { first, query })
            .await?;

        Ok(data
            .products
            .edges
            .into_iter()
            .map(|edge| convert_product_summary(edge.node))
            .collect())
    }

    // =========================================================================
    // Collection Methods
    // =========================================================================

    /// Get a collection by its handle with its first `first` products.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::NotFound` if no collection has this handle, or
    /// an error if the API request fails.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_collection_by_handle(
        &self,
        handle: &str,
        first: i64,
    ) -> Result<Collection, ShopifyError> {
        let cache_key = format!("collection:{handle}:{first}");

        if let Some(CacheValue::Collection(collection)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for collection");
            return Ok(*collection);
        }

        let variables = get_collection_by_handle::Variables {
            handle: handle.to_string(),
            first,
        };

        let data = self.execute::<GetCollectionByHandle>(variables).await?;

        let collection_data = data
            .collection
            .ok_or_else(|| ShopifyError::NotFound(format!("Collection not found: {handle}")))?;

        let collection = convert_collection(collection_data);

        self.inner
            .cache
            .insert(
                cache_key,
                CacheValue::Collection(Box::new(collection.clone())),
            )
            .await;

        Ok(collection)
    }

    // =========================================================================
    // Cart Methods (not cached - mutable state)
    // =========================================================================

    /// Get an existing cart.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::NotFound` if the cart no longer exists, or an
    /// error if the API request fails.
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    pub async fn get_cart(&self, cart_id: &str) -> Result<Cart, ShopifyError> {
        let variables = get_cart::Variables {
            cart_id: cart_id.to_string(),
        };

        let data = self.execute::<GetCart>(variables).await?;

        data.cart
            .map(convert_cart)
            .ok_or_else(|| ShopifyError::NotFound(format!("Cart not found: {cart_id}")))
    }

    /// Create a new cart with the given lines.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::UserError` with the first user error message, or
    /// an error if the API request fails.
    #[instrument(skip(self, lines))]
    pub async fn create_cart(&self, lines: Vec<CartLineInput>) -> Result<Cart, ShopifyError> {
        let variables = create_cart::Variables {
            input: create_cart::CartInput { lines },
        };

        let data = self.execute::<CreateCart>(variables).await?;

        mutation_result(data.cart_create, "Failed to create cart")
    }

    /// Add lines to a cart.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::NotFound` if the cart no longer exists,
    /// `ShopifyError::UserError` for other user errors, or an error if the
    /// API request fails. Other cart mutations report a missing cart as a
    /// plain user error.
    #[instrument(skip(self, lines), fields(cart_id = %cart_id))]
    pub async fn add_to_cart(
        &self,
        cart_id: &str,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, ShopifyError> {
        let variables = add_to_cart::Variables {
            cart_id: cart_id.to_string(),
            lines,
        };

        let data = self.execute::<AddToCart>(variables).await?;

        if data
            .cart_lines_add
            .as_ref()
            .is_some_and(|payload| is_missing_cart(&payload.user_errors))
        {
            return Err(ShopifyError::NotFound(format!("Cart not found: {cart_id}")));
        }

        mutation_result(data.cart_lines_add, "Failed to add to cart")
    }

    /// Update cart line quantities.
    ///
    /// # Errors
    ///
    /// Returns an error if user errors are returned or the API request fails.
    #[instrument(skip(self, lines), fields(cart_id = %cart_id))]
    pub async fn update_cart(
        &self,
        cart_id: &str,
        lines: Vec<CartLineUpdateInput>,
    ) -> Result<Cart, ShopifyError> {
        let variables = update_cart_lines::Variables {
            cart_id: cart_id.to_string(),
            lines,
        };

        let data = self.execute::<UpdateCartLines>(variables).await?;

        mutation_result(data.cart_lines_update, "Failed to update cart")
    }

    /// Remove lines from a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if user errors are returned or the API request fails.
    #[instrument(skip(self, line_ids), fields(cart_id = %cart_id))]
    pub async fn remove_from_cart(
        &self,
        cart_id: &str,
        line_ids: Vec<String>,
    ) -> Result<Cart, ShopifyError> {
        let variables = remove_from_cart::Variables {
            cart_id: cart_id.to_string(),
            line_ids,
        };

        let data = self.execute::<RemoveFromCart>(variables).await?;

        mutation_result(data.cart_lines_remove, "Failed to remove from cart")
    }
}

/// Unwrap a cart mutation payload, surfacing user errors first.
fn mutation_result(
    payload: Option<shared::CartMutationPayload>,
    failure: &str,
) -> Result<Cart, ShopifyError> {
    if let Some(result) = payload {
        if let Some(err) = first_user_error(result.user_errors) {
            return Err(err);
        }

        if let Some(cart) = result.cart {
            return Ok(convert_cart(cart));
        }
    }

    Err(ShopifyError::message(failure))
}

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
