//! Wire types for the cart and catalog endpoints.
//!
//! These mirror the backend's JSON and are converted into `cartwise_core`
//! types before leaving the `api` module.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cartwise_core::types::product::deserialize_health_score;
use cartwise_core::{CartId, Price, Product, ProductId};

// =============================================================================
// Cart Records
// =============================================================================

/// A server-side cart belonging to the session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CartRecord {
    /// Cart ID.
    pub cart_id: CartId,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// `GET /api/carts` response.
#[derive(Debug, Deserialize)]
pub(crate) struct CartsResponse {
    #[serde(default)]
    pub carts: Vec<CartRecord>,
}

/// `POST /api/carts` response, wrapped or bare.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum CreatedCartResponse {
    Wrapped { cart: CartRecord },
    Bare(CartRecord),
}

impl From<CreatedCartResponse> for CartRecord {
    fn from(response: CreatedCartResponse) -> Self {
        match response {
            CreatedCartResponse::Wrapped { cart } | CreatedCartResponse::Bare(cart) => cart,
        }
    }
}

/// One line of a server cart.
///
/// Product details are either flattened into the record or nested under
/// `product`, depending on the endpoint version.
#[derive(Debug, Clone, Deserialize)]
pub struct CartItemRecord {
    /// Product this line refers to.
    #[serde(alias = "productId")]
    pub product_id: ProductId,
    /// Quantity as stored by the server. May be out of range on bad data.
    pub quantity: i64,
    /// Nested product details.
    #[serde(default)]
    pub product: Option<Product>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Brand name.
    #[serde(default)]
    pub brand: Option<String>,
    /// Image URL.
    #[serde(default, alias = "image")]
    pub image_url: Option<String>,
    /// Unit price.
    #[serde(default)]
    pub price: Option<Price>,
    /// Store or platform name.
    #[serde(default, alias = "platform")]
    pub store: Option<String>,
    /// Unit of measure.
    #[serde(default)]
    pub unit: Option<String>,
    /// Health score.
    #[serde(default, deserialize_with = "deserialize_health_score")]
    pub health_score: Option<Decimal>,
}

/// `GET /api/carts/{id}/items` response, wrapped or bare.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ItemsResponse {
    Wrapped { items: Vec<CartItemRecord> },
    Bare(Vec<CartItemRecord>),
}

impl From<ItemsResponse> for Vec<CartItemRecord> {
    fn from(response: ItemsResponse) -> Self {
        match response {
            ItemsResponse::Wrapped { items } | ItemsResponse::Bare(items) => items,
        }
    }
}

// =============================================================================
// Catalog Records
// =============================================================================

/// Product search response in any of the shapes the backend produces.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ProductsResponse {
    Products { products: Vec<Product> },
    Results { results: Vec<Product> },
    Bare(Vec<Product>),
}

impl From<ProductsResponse> for Vec<Product> {
    fn from(response: ProductsResponse) -> Self {
        match response {
            ProductsResponse::Products { products: items }
            | ProductsResponse::Results { results: items }
            | ProductsResponse::Bare(items) => items,
        }
    }
}

/// Single product response, wrapped or bare.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ProductResponse {
    Wrapped { product: Product },
    Bare(Product),
}

impl From<ProductResponse> for Product {
    fn from(response: ProductResponse) -> Self {
        match response {
            ProductResponse::Wrapped { product } | ProductResponse::Bare(product) => product,
        }
    }
}

// =============================================================================
// Request Bodies
// =============================================================================

/// `POST /api/carts/{id}/items` body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddItemRequest<'a> {
    pub product_id: &'a ProductId,
    pub quantity: u32,
}

/// `PUT /api/carts/{id}/items/{productId}` body.
#[derive(Debug, Serialize)]
pub(crate) struct UpdateItemRequest {
    pub quantity: u32,
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
