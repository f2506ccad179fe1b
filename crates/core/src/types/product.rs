//! Product model shared by catalog results and cart lines.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::{Deserializer, IgnoredAny};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Price, ProductId};

/// Store vertical a product is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vertical {
    Supermarket,
    Pharma,
    Electronics,
}

impl Vertical {
    /// Query-string value for this vertical.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Supermarket => "supermarket",
            Self::Pharma => "pharma",
            Self::Electronics => "electronics",
        }
    }
}

impl fmt::Display for Vertical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown vertical name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown vertical: {0} (expected supermarket, pharma or electronics)")]
pub struct ParseVerticalError(String);

impl FromStr for Vertical {
    type Err = ParseVerticalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "supermarket" | "grocery" => Ok(Self::Supermarket),
            "pharma" | "pharmacy" => Ok(Self::Pharma),
            "electronics" => Ok(Self::Electronics),
            other => Err(ParseVerticalError(other.to_string())),
        }
    }
}

/// A product as returned by a search or listing.
///
/// Immutable once fetched. `id` is optional because listing payloads are not
/// guaranteed to carry one; the cart refuses products without it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product identifier.
    #[serde(default, alias = "product_id")]
    pub id: Option<ProductId>,
    /// Display name.
    pub name: String,
    /// Brand name.
    #[serde(default)]
    pub brand: Option<String>,
    /// Image URL.
    #[serde(default, alias = "image")]
    pub image_url: Option<String>,
    /// Unit price. `None` means the price is unknown.
    #[serde(default)]
    pub price: Option<Price>,
    /// Store or platform selling the product.
    #[serde(default, alias = "platform")]
    pub store: Option<String>,
    /// Unit of measure (e.g., "kg", "un", "500ml").
    #[serde(default)]
    pub unit: Option<String>,
    /// Health score (0-100) where the vertical provides one.
    #[serde(default, deserialize_with = "deserialize_health_score")]
    pub health_score: Option<Decimal>,
    /// Vertical the product was listed under.
    #[serde(default)]
    pub vertical: Option<Vertical>,
}

impl Product {
    /// Create a product with only an id and a name.
    #[must_use]
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
            brand: None,
            image_url: None,
            price: None,
            store: None,
            unit: None,
            health_score: None,
            vertical: None,
        }
    }

    /// Set the unit price.
    #[must_use]
    pub const fn with_price(mut self, price: Price) -> Self {
        self.price = Some(price);
        self
    }

    /// Set the store name.
    #[must_use]
    pub fn with_store(mut self, store: impl Into<String>) -> Self {
        self.store = Some(store.into());
        self
    }

    /// The id, if present and not blank.
    #[must_use]
    pub fn usable_id(&self) -> Option<&ProductId> {
        self.id.as_ref().filter(|id| !id.is_blank())
    }
}

/// Wire representations of a health score.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawScore {
    Number(Decimal),
    Other(IgnoredAny),
}

/// Deserialize a health score leniently.
///
/// Anything other than a number (or numeric string) between 0 and 100 is
/// treated as an unknown score instead of failing the whole payload.
///
/// # Errors
///
/// Only propagates errors from the underlying deserializer itself.
#[doc(hidden)]
pub fn deserialize_health_score<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawScore::deserialize(deserializer)? {
        RawScore::Number(score) if (Decimal::ZERO..=Decimal::ONE_HUNDRED).contains(&score) => {
            Some(score)
        }
        RawScore::Number(_) | RawScore::Other(_) => None,
    })
}
