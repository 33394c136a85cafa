//! GraphQL operations for the Shopify Storefront API.
//!
//! Each operation is a unit struct implementing [`GraphQLQuery`] plus a
//! snake_case module holding its `Variables` and `ResponseData`, the same
//! layout `graphql_client`'s derive generates.

use graphql_client::{GraphQLQuery, QueryBody};

/// Declare an operation struct bound to its query text and module types.
macro_rules! operation {
    ($name:ident, $module:ident, $query:expr) => {
        pub struct $name;

        impl GraphQLQuery for $name {
            type Variables = $module::Variables;
            type ResponseData = $module::ResponseData;

            fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
                QueryBody {
                    variables,
                    query: $query,
                    operation_name: stringify!($name),
                }
            }
        }
    };
}

macro_rules! product_summary_fields {
    () => {
        r"
fragment ProductSummaryFields on Product {
  id
  title
  handle
  tags
  featuredImage { url altText }
  priceRange { minVariantPrice { amount currencyCode } }
}
"
    };
}

macro_rules! cart_fields {
    () => {
        r"
fragment CartFields on Cart {
  id
  checkoutUrl
  totalQuantity
  lines(first: 100) {
    edges {
      node {
        id
        quantity
        cost { totalAmount { amount currencyCode } }
        merchandise {
          ... on ProductVariant {
            id
            title
            image { url altText }
            price { amount currencyCode }
            compareAtPrice { amount currencyCode }
            product { title handle featuredImage { url altText } }
          }
        }
      }
    }
  }
}
"
    };
}

macro_rules! user_error_fields {
    () => {
        "userErrors { field message }"
    };
}

// =============================================================================
// Shared response shapes
// =============================================================================

pub mod shared {
    use serde::Deserialize;

    #[derive(Debug, Clone, Deserialize)]
    pub struct Connection<T> {
        #[serde(default = "Vec::new")]
        pub edges: Vec<Edge<T>>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Edge<T> {
        pub node: T,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MoneyV2 {
        pub amount: String,
        pub currency_code: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Image {
        pub url: String,
        pub alt_text: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PriceRange {
        pub min_variant_price: MoneyV2,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ProductSummary {
        pub id: String,
        pub title: String,
        pub handle: String,
        #[serde(default)]
        pub tags: Vec<String>,
        pub featured_image: Option<Image>,
        pub price_range: Option<PriceRange>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct CartUserError {
        #[serde(default)]
        pub field: Option<Vec<String>>,
        pub message: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Cart {
        pub id: String,
        pub checkout_url: Option<String>,
        #[serde(default)]
        pub total_quantity: i64,
        pub lines: Connection<CartLine>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct CartLine {
        pub id: String,
        pub quantity: i64,
        pub cost: Option<CartLineCost>,
        pub merchandise: Option<Merchandise>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CartLineCost {
        pub total_amount: MoneyV2,
    }

    /// Only `ProductVariant` merchandise carries fields; other members are `{}`.
    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Merchandise {
        pub id: Option<String>,
        pub title: Option<String>,
        pub image: Option<Image>,
        pub price: Option<MoneyV2>,
        pub compare_at_price: Option<MoneyV2>,
        pub product: Option<MerchandiseProduct>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MerchandiseProduct {
        pub title: String,
        pub handle: String,
        pub featured_image: Option<Image>,
    }

    /// Payload shared by the cart mutations.
    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CartMutationPayload {
        pub cart: Option<Cart>,
        #[serde(default)]
        pub user_errors: Vec<CartUserError>,
    }
}

// =============================================================================
// Product queries
// =============================================================================

operation!(
    GetProductByHandle,
    get_product_by_handle,
    r"
query GetProductByHandle($handle: String!) {
  product(handle: $handle) {
    id
    title
    handle
    description
    descriptionHtml
    tags
    featuredImage { url altText }
    priceRange { minVariantPrice { amount currencyCode } }
    media(first: 20) {
      edges { node { ... on MediaImage { image { url altText } } } }
    }
    variants(first: 50) {
      edges {
        node {
          id
          title
          availableForSale
          selectedOptions { name value }
          price { amount currencyCode }
        }
      }
    }
  }
}
"
);

pub mod get_product_by_handle {
    use serde::{Deserialize, Serialize};

    use super::shared::{Connection, Image, MoneyV2, PriceRange};

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub handle: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub product: Option<Product>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Product {
        pub id: String,
        pub title: String,
        pub handle: String,
        pub description: Option<String>,
        pub description_html: Option<String>,
        #[serde(default)]
        pub tags: Vec<String>,
        pub featured_image: Option<Image>,
        pub price_range: Option<PriceRange>,
        pub media: Option<Connection<MediaNode>>,
        pub variants: Option<Connection<Variant>>,
    }

    /// Non-image media (video, 3D models) deserializes with `image: None`.
    #[derive(Debug, Clone, Deserialize)]
    pub struct MediaNode {
        #[serde(default)]
        pub image: Option<Image>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variant {
        pub id: String,
        pub title: String,
        #[serde(default)]
        pub available_for_sale: bool,
        #[serde(default)]
        pub selected_options: Vec<SelectedOption>,
        pub price: Option<MoneyV2>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct SelectedOption {
        pub name: String,
        pub value: String,
    }
}

operation!(
    GetProducts,
    get_products,
    concat!(
        r"
query GetProducts($first: Int!, $query: String) {
  products(first: $first, query: $query) {
    edges { node { ...ProductSummaryFields } }
  }
}
",
        product_summary_fields!()
    )
);

pub mod get_products {
    use serde::{Deserialize, Serialize};

    use super::shared::{Connection, ProductSummary};

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub first: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub query: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub products: Connection<ProductSummary>,
    }
}

// =============================================================================
// Collection queries
// =============================================================================

operation!(
    GetCollectionByHandle,
    get_collection_by_handle,
    concat!(
        r"
query GetCollectionByHandle($handle: String!, $first: Int!) {
  collection(handle: $handle) {
    id
    title
    handle
    description
    image { url altText }
    products(first: $first) {
      edges { node { ...ProductSummaryFields } }
    }
  }
}
",
        product_summary_fields!()
    )
);

pub mod get_collection_by_handle {
    use serde::{Deserialize, Serialize};

    use super::shared::{Connection, Image, ProductSummary};

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub handle: String,
        pub first: i64,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub collection: Option<Collection>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Collection {
        pub id: String,
        pub title: String,
        pub handle: String,
        pub description: Option<String>,
        pub image: Option<Image>,
        pub products: Connection<ProductSummary>,
    }
}

// =============================================================================
// Cart queries and mutations
// =============================================================================

operation!(
    GetCart,
    get_cart,
    concat!(
        r"
query GetCart($cartId: ID!) {
  cart(id: $cartId) { ...CartFields }
}
",
        cart_fields!()
    )
);

pub mod get_cart {
    use serde::{Deserialize, Serialize};

    use super::shared::Cart;

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub cart: Option<Cart>,
    }
}

operation!(
    CreateCart,
    create_cart,
    concat!(
        r"
mutation CreateCart($input: CartInput!) {
  cartCreate(input: $input) {
    cart { ...CartFields }
    ",
        user_error_fields!(),
        r"
  }
}
",
        cart_fields!()
    )
);

pub mod create_cart {
    use serde::{Deserialize, Serialize};

    use super::shared::CartMutationPayload;
    use crate::shopify::types::CartLineInput;

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub input: CartInput,
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct CartInput {
        pub lines: Vec<CartLineInput>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_create: Option<CartMutationPayload>,
    }
}

operation!(
    AddToCart,
    add_to_cart,
    concat!(
        r"
mutation AddToCart($cartId: ID!, $lines: [CartLineInput!]!) {
  cartLinesAdd(cartId: $cartId, lines: $lines) {
    cart { ...CartFields }
    ",
        user_error_fields!(),
        r"
  }
}
",
        cart_fields!()
    )
);

pub mod add_to_cart {
    use serde::{Deserialize, Serialize};

    use super::shared::CartMutationPayload;
    use crate::shopify::types::CartLineInput;

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
        pub lines: Vec<CartLineInput>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_lines_add: Option<CartMutationPayload>,
    }
}

operation!(
    UpdateCartLines,
    update_cart_lines,
    concat!(
        r"
mutation UpdateCartLines($cartId: ID!, $lines: [CartLineUpdateInput!]!) {
  cartLinesUpdate(cartId: $cartId, lines: $lines) {
    cart { ...CartFields }
    ",
        user_error_fields!(),
        r"
  }
}
",
        cart_fields!()
    )
);

pub mod update_cart_lines {
    use serde::{Deserialize, Serialize};

    use super::shared::CartMutationPayload;
    use crate::shopify::types::CartLineUpdateInput;

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
        pub lines: Vec<CartLineUpdateInput>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_lines_update: Option<CartMutationPayload>,
    }
}

operation!(
    RemoveFromCart,
    remove_from_cart,
    concat!(
        r"
mutation RemoveFromCart($cartId: ID!, $lineIds: [ID!]!) {
  cartLinesRemove(cartId: $cartId, lineIds: $lineIds) {
    cart { ...CartFields }
    ",
        user_error_fields!(),
        r"
  }
}
",
        cart_fields!()
    )
);

pub mod remove_from_cart {
    use serde::{Deserialize, Serialize};

    use super::shared::CartMutationPayload;

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
        pub line_ids: Vec<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_lines_remove: Option<CartMutationPayload>,
    }
}
