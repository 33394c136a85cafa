//! Domain types for the Shopify Storefront and Customer Account APIs.
//!
//! These types provide a clean API separate from the raw GraphQL response
//! shapes, and serialize to the browser in camelCase.

use serde::{Deserialize, Serialize};

// =============================================================================
// Money & Image Types
// =============================================================================

/// Monetary amount with currency code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    /// Decimal amount as string (preserves precision).
    pub amount: String,
    /// ISO 4217 currency code.
    pub currency_code: String,
}

/// Product, variant or collection image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// Image URL.
    pub url: String,
    /// Alt text for accessibility.
    pub alt_text: Option<String>,
}

// =============================================================================
// Product Types
// =============================================================================

/// A variant option selection (e.g., Size: M).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOption {
    pub name: String,
    pub value: String,
}

/// A purchasable product variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    /// Variant GID (the cart `merchandiseId`).
    pub id: String,
    pub title: String,
    pub available_for_sale: bool,
    pub selected_options: Vec<SelectedOption>,
    pub price: Option<Money>,
}

/// A product with its images and variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub description: Option<String>,
    pub description_html: Option<String>,
    pub tags: Vec<String>,
    pub featured_image: Option<Image>,
    /// Media images, in display order.
    pub images: Vec<Image>,
    pub variants: Vec<ProductVariant>,
    /// Lowest variant price.
    pub min_price: Option<Money>,
}

/// A product as it appears in listings and search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub tags: Vec<String>,
    pub image: Option<Image>,
    /// Lowest variant price.
    pub price: Option<Money>,
}

// =============================================================================
// Collection Types
// =============================================================================

/// A collection with its first page of products.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub description: Option<String>,
    pub image: Option<Image>,
    pub products: Vec<ProductSummary>,
}

// =============================================================================
// Cart Types
// =============================================================================

/// A shopping cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Cart GID.
    pub id: String,
    /// Hosted checkout URL.
    pub checkout_url: Option<String>,
    /// Total item count as reported by Shopify.
    pub total_quantity: i64,
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Sum of line quantities.
    #[must_use]
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|line| line.quantity).sum()
    }
}

/// A line item in the cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Cart line GID (used for update/remove).
    pub id: String,
    pub quantity: i64,
    /// Variant GID.
    pub merchandise_id: Option<String>,
    /// Product title.
    pub title: Option<String>,
    pub image: Option<Image>,
    /// Unit price.
    pub price: Option<Money>,
    pub compare_at_price: Option<Money>,
    pub product_handle: Option<String>,
    /// Line total.
    pub cost: Option<Money>,
}

/// Input for adding a line to a cart.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    /// Variant GID.
    pub merchandise_id: String,
    pub quantity: i64,
}

/// Input for changing a cart line's quantity.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineUpdateInput {
    /// Cart line GID.
    pub id: String,
    pub quantity: i64,
}

// =============================================================================
// Customer Types
// =============================================================================

/// Logged-in customer as exposed by the session endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCustomer {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(quantity: i64) -> CartLine {
        CartLine {
            id: format!("gid://shopify/CartLine/{quantity}"),
            quantity,
            merchandise_id: None,
            title: None,
            image: None,
            price: None,
            compare_at_price: None,
            product_handle: None,
            cost: None,
        }
    }

    #[test]
    fn test_cart_item_count_sums_quantities() {
        let cart = Cart {
            id: "gid://shopify/Cart/1".to_string(),
            checkout_url: None,
            total_quantity: 0,
            lines: vec![line(2), line(3)],
        };
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_money_serializes_camel_case() {
        let money = Money {
            amount: "12500.0".to_string(),
            currency_code: "NGN".to_string(),
        };
        let json = serde_json::to_value(&money).unwrap();
        assert_eq!(json["currencyCode"], "NGN");
    }

    #[test]
    fn test_session_customer_serializes_camel_case() {
        let customer = SessionCustomer {
            id: "gid://shopify/Customer/1".to_string(),
            first_name: Some("Amina".to_string()),
            last_name: None,
            email: Some("amina@example.ng".to_string()),
        };
        let json = serde_json::to_value(&customer).unwrap();
        assert_eq!(json["firstName"], "Amina");
        assert!(json["lastName"].is_null());
        assert_eq!(json["email"], "amina@example.ng");
    }
}
