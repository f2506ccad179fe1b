//! In-memory cart and its reducers.
//!
//! [`Cart`] is both the local-only cart store and the mirror of a server cart
//! after a refetch. Lines keep insertion order; there is at most one line per
//! product id and no line ever holds a quantity of zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{CartId, Product, ProductId};

/// Validation errors raised before a cart is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The product carries no usable identifier.
    #[error("Product has no identifier")]
    MissingProductId,

    /// Quantities added to a cart must be at least 1.
    #[error("Invalid quantity: {0} (must be at least 1)")]
    InvalidQuantity(u32),
}

/// A product and how many of it are in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// The product on this line.
    pub product: Product,
    /// Quantity, always >= 1.
    pub quantity: u32,
}

impl CartLine {
    /// Product id for this line.
    #[must_use]
    pub fn product_id(&self) -> Option<&ProductId> {
        self.product.id.as_ref()
    }

    /// Unit price times quantity. Unknown prices count as zero.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.product
            .price
            .map_or(Decimal::ZERO, |price| price.times(self.quantity))
    }

    fn matches(&self, product_id: &ProductId) -> bool {
        self.product_id() == Some(product_id)
    }
}

/// Ordered cart lines plus the id of the server-side cart, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    id: Option<CartId>,
    #[serde(default)]
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart with no server id.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            id: None,
            lines: Vec::new(),
        }
    }

    /// Build a cart from lines fetched elsewhere.
    ///
    /// Lines without a usable id or with a zero quantity are dropped, and
    /// repeated product ids are merged into the first occurrence so the
    /// one-line-per-product invariant holds whatever the source sent.
    #[must_use]
    pub fn from_lines(id: Option<CartId>, lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut cart = Self {
            id,
            lines: Vec::new(),
        };
        for line in lines {
            // Errors here are exactly the lines we want to drop.
            let _ = cart.add(line.product, line.quantity);
        }
        cart
    }

    /// Server cart id, if this cart mirrors one.
    #[must_use]
    pub const fn id(&self) -> Option<&CartId> {
        self.id.as_ref()
    }

    /// Replace the server cart id.
    pub fn set_id(&mut self, id: Option<CartId>) {
        self.id = id;
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The line for a product, if present.
    #[must_use]
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.matches(product_id))
    }

    /// Whether the cart has a line for this product.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.line(product_id).is_some()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add `quantity` of a product.
    ///
    /// Increments the existing line for the product, or appends a new one.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::MissingProductId`] if the product has no usable
    /// id and [`CartError::InvalidQuantity`] if `quantity` is zero. The cart
    /// is left untouched in both cases.
    pub fn add(&mut self, product: Product, quantity: u32) -> Result<(), CartError> {
        let product_id = validate(&product, quantity)?.clone();

        if let Some(line) = self.lines.iter_mut().find(|line| line.matches(&product_id)) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            self.lines.push(CartLine { product, quantity });
        }
        Ok(())
    }

    /// Set the quantity of an existing line. Zero removes the line.
    ///
    /// Returns `false` if the product is not in the cart.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(product_id).is_some();
        }
        match self.lines.iter_mut().find(|line| line.matches(product_id)) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Remove the line for a product. Absent ids are a no-op.
    pub fn remove(&mut self, product_id: &ProductId) -> Option<CartLine> {
        let index = self.lines.iter().position(|line| line.matches(product_id))?;
        Some(self.lines.remove(index))
    }

    /// Remove every line. The server id is kept.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of price x quantity over all lines; unknown prices count as zero.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }
}

/// Check a product and quantity before they reach a cart or the network.
///
/// # Errors
///
/// Returns [`CartError::MissingProductId`] or [`CartError::InvalidQuantity`].
pub fn validate(product: &Product, quantity: u32) -> Result<&ProductId, CartError> {
    let product_id = product.usable_id().ok_or(CartError::MissingProductId)?;
    if quantity == 0 {
        return Err(CartError::InvalidQuantity(quantity));
    }
    Ok(product_id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Price;

    fn product(id: &str, cents: i64) -> Product {
        Product::new(id, format!("Product {id}")).with_price(Price::from_cents(cents))
    }

    #[test]
    fn test_add_same_product_merges_lines() {
        let mut cart = Cart::new();
        cart.add(product("123", 1490), 1).unwrap();
        cart.add(product("123", 1490), 2).unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.line(&ProductId::new("123")).unwrap().quantity, 3);
        assert_eq!(cart.total(), Decimal::new(4470, 2));
    }

    #[test]
    fn test_total_and_count_across_lines() {
        let mut cart = Cart::new();
        cart.add(product("1", 1000), 1).unwrap();
        cart.add(product("2", 500), 3).unwrap();

        assert_eq!(cart.total(), Decimal::new(25, 0));
        assert_eq!(cart.item_count(), 4);
    }

    #[test]
    fn test_unknown_price_counts_as_zero() {
        let mut cart = Cart::new();
        cart.add(Product::new("9", "Sem preco"), 5).unwrap();
        cart.add(product("1", 250), 2).unwrap();

        assert_eq!(cart.total(), Decimal::new(500, 2));
        assert_eq!(cart.item_count(), 7);
    }

    #[test]
    fn test_add_without_id_is_rejected() {
        let mut cart = Cart::new();
        let mut nameless = product("1", 100);
        nameless.id = None;

        assert_eq!(cart.add(nameless, 1), Err(CartError::MissingProductId));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_zero_quantity_is_rejected() {
        let mut cart = Cart::new();
        assert_eq!(
            cart.add(product("1", 100), 0),
            Err(CartError::InvalidQuantity(0))
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_absent_id_is_noop() {
        let mut cart = Cart::new();
        cart.add(product("1", 100), 1).unwrap();

        assert!(cart.remove(&ProductId::new("404")).is_none());
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_set_quantity_updates_line() {
        let mut cart = Cart::new();
        cart.add(product("1", 100), 1).unwrap();

        assert!(cart.set_quantity(&ProductId::new("1"), 6));
        assert_eq!(cart.item_count(), 6);
        assert_eq!(cart.total(), Decimal::new(600, 2));
    }

    #[test]
    fn test_set_quantity_zero_removes_line() {
        let mut cart = Cart::new();
        cart.add(product("1", 100), 2).unwrap();
        cart.add(product("2", 100), 1).unwrap();

        assert!(cart.set_quantity(&ProductId::new("1"), 0));
        assert_eq!(cart.len(), 1);
        assert!(!cart.contains(&ProductId::new("1")));
    }

    #[test]
    fn test_set_quantity_absent_id() {
        let mut cart = Cart::new();
        assert!(!cart.set_quantity(&ProductId::new("1"), 3));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_clear_empties_cart() {
        let mut cart = Cart::from_lines(Some(CartId::new("c1")), Vec::new());
        cart.add(product("1", 100), 2).unwrap();
        cart.add(product("2", 300), 1).unwrap();

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.id(), Some(&CartId::new("c1")));
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let mut cart = Cart::new();
        cart.add(product("b", 100), 1).unwrap();
        cart.add(product("a", 100), 1).unwrap();
        cart.add(product("b", 100), 1).unwrap();

        let ids: Vec<&str> = cart
            .lines()
            .iter()
            .filter_map(|line| line.product_id().map(ProductId::as_str))
            .collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_from_lines_merges_and_drops_invalid() {
        let lines = vec![
            CartLine {
                product: product("1", 100),
                quantity: 2,
            },
            CartLine {
                product: product("1", 100),
                quantity: 1,
            },
            CartLine {
                product: product("2", 100),
                quantity: 0,
            },
        ];
        let cart = Cart::from_lines(None, lines);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_totals_hold_over_mixed_operations() {
        let mut cart = Cart::new();
        cart.add(product("1", 199), 2).unwrap();
        cart.add(product("2", 1050), 1).unwrap();
        cart.add(product("3", 25), 4).unwrap();
        cart.set_quantity(&ProductId::new("2"), 3);
        cart.remove(&ProductId::new("3"));
        cart.add(product("1", 199), 1).unwrap();

        let expected: Decimal = cart.lines().iter().map(CartLine::subtotal).sum();
        assert_eq!(cart.total(), expected);
        assert_eq!(cart.total(), Decimal::new(199 * 3 + 1050 * 3, 2));
        assert_eq!(cart.item_count(), 6);
    }

    #[test]
    fn test_cart_json_roundtrip_preserves_lines() {
        let mut cart = Cart::new();
        cart.add(product("1", 1490), 3).unwrap();

        let json = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cart);
    }
}
