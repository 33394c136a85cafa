//! Collection type conversion functions.

use crate::shopify::types::Collection;

use super::super::queries::get_collection_by_handle;
use super::products::{convert_image, convert_product_summary};

/// Convert a collection response into a [`Collection`].
pub fn convert_collection(collection: get_collection_by_handle::Collection) -> Collection {
    Collection {
        id: collection.id,
        title: collection.title,
        handle: collection.handle,
        description: collection.description,
        image: collection.image.map(convert_image),
        products: collection
            .products
            .edges
            .into_iter()
            .map(|edge| convert_product_summary(edge.node))
            .collect(),
    }
}
