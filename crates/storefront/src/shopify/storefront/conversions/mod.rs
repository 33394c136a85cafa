//! Type conversion functions for Shopify Storefront API responses.

pub mod cart;
pub mod collections;
pub mod products;

pub use cart::{convert_cart, first_user_error, is_missing_cart};
pub use collections::convert_collection;
pub use products::{convert_product, convert_product_summary};
