//! Product type conversion functions.

use crate::shopify::types::{Image, Money, Product, ProductSummary, ProductVariant, SelectedOption};

use super::super::queries::{get_product_by_handle, shared};

pub fn convert_money(money: shared::MoneyV2) -> Money {
    Money {
        amount: money.amount,
        currency_code: money.currency_code,
    }
}

pub fn convert_image(image: shared::Image) -> Image {
    Image {
        url: image.url,
        alt_text: image.alt_text,
    }
}

fn convert_variant(variant: get_product_by_handle::Variant) -> ProductVariant {
    ProductVariant {
        id: variant.id,
        title: variant.title,
        available_for_sale: variant.available_for_sale,
        selected_options: variant
            .selected_options
            .into_iter()
            .map(|o| SelectedOption {
                name: o.name,
                value: o.value,
            })
            .collect(),
        price: variant.price.map(convert_money),
    }
}

/// Convert a product detail response into a [`Product`].
pub fn convert_product(product: get_product_by_handle::Product) -> Product {
    let images = product
        .media
        .map(|media| {
            media
                .edges
                .into_iter()
                .filter_map(|edge| edge.node.image.map(convert_image))
                .collect()
        })
        .unwrap_or_default();

    let variants = product
        .variants
        .map(|variants| {
            variants
                .edges
                .into_iter()
                .map(|edge| convert_variant(edge.node))
                .collect()
        })
        .unwrap_or_default();

    Product {
        id: product.id,
        title: product.title,
        handle: product.handle,
        description: product.description,
        description_html: product.description_html,
        tags: product.tags,
        featured_image: product.featured_image.map(convert_image),
        images,
        variants,
        min_price: product
            .price_range
            .map(|range| convert_money(range.min_variant_price)),
    }
}

/// Convert a listing node into a [`ProductSummary`].
pub fn convert_product_summary(product: shared::ProductSummary) -> ProductSummary {
    ProductSummary {
        id: product.id,
        title: product.title,
        handle: product.handle,
        tags: product.tags,
        image: product.featured_image.map(convert_image),
        price: product
            .price_range
            .map(|range| convert_money(range.min_variant_price)),
    }
}
