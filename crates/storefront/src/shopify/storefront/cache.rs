//! Cache types for Storefront API responses.

use crate::shopify::types::{Collection, Product, ProductSummary};

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(Vec<ProductSummary>),
    Collection(Box<Collection>),
}
