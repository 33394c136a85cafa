//! Cart type conversion functions.

use crate::shopify::ShopifyError;
use crate::shopify::types::{Cart, CartLine};

use super::super::queries::shared;
use super::products::{convert_image, convert_money};

fn convert_cart_line(line: shared::CartLine) -> CartLine {
    let merchandise = line.merchandise.unwrap_or(shared::Merchandise {
        id: None,
        title: None,
        image: None,
        price: None,
        compare_at_price: None,
        product: None,
    });

    // Prefer the variant image, fall back to the product's featured image
    let (title, product_handle, product_image) = match merchandise.product {
        Some(product) => (
            Some(product.title),
            Some(product.handle),
            product.featured_image,
        ),
        None => (merchandise.title, None, None),
    };

    CartLine {
        id: line.id,
        quantity: line.quantity,
        merchandise_id: merchandise.id,
        title,
        image: merchandise.image.or(product_image).map(convert_image),
        price: merchandise.price.map(convert_money),
        compare_at_price: merchandise.compare_at_price.map(convert_money),
        product_handle,
        cost: line.cost.map(|cost| convert_money(cost.total_amount)),
    }
}

/// Convert a cart response into a [`Cart`].
pub fn convert_cart(cart: shared::Cart) -> Cart {
    Cart {
        id: cart.id,
        checkout_url: cart.checkout_url,
        total_quantity: cart.total_quantity,
        lines: cart
            .lines
            .edges
            .into_iter()
            .map(|edge| convert_cart_line(edge.node))
            .collect(),
    }
}

/// Map mutation `userErrors` to an error carrying the first message, if any.
pub fn first_user_error(errors: Vec<shared::CartUserError>) -> Option<ShopifyError> {
    errors
        .into_iter()
        .next()
        .map(|first| ShopifyError::UserError(first.message))
}

/// Whether the first user error is on the `cartId` field, which Shopify
/// reports for a deleted or expired cart.
pub fn is_missing_cart(errors: &[shared::CartUserError]) -> bool {
    errors.first().is_some_and(|first| {
        first
            .field
            .as_ref()
            .is_some_and(|field| field.iter().any(|f| f == "cartId"))
    })
}
