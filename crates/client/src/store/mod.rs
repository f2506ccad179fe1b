//! Cart storage strategies.
//!
//! [`CartStore`] is the single cart capability every backend implements:
//!
//! - [`LocalStore`] - in-memory reducers, no network
//! - [`RemoteStore`] - REST mutations followed by a full refetch
//!
//! Both publish a [`CartSnapshot`] after every state change so views can
//! re-render without polling.

mod remote;
mod snapshot;

use std::future::Future;

use rust_decimal::Decimal;
use tracing::{debug, instrument};

use cartwise_core::{Cart, Product, ProductId};

use crate::error::Result;

pub use remote::RemoteStore;
pub use snapshot::{CartMode, CartSnapshot, SnapshotPublisher, SyncStatus};

/// The cart capability shared by every backing strategy.
pub trait CartStore {
    /// Current cart contents.
    fn cart(&self) -> &Cart;

    /// Add `quantity` of a product, merging with an existing line.
    fn add(&mut self, product: Product, quantity: u32) -> impl Future<Output = Result<()>> + Send;

    /// Set a line's quantity; zero removes the line.
    fn set_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: u32,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Remove a line; absent ids are a no-op.
    fn remove(&mut self, product_id: &ProductId) -> impl Future<Output = Result<()>> + Send;

    /// Remove every line.
    fn clear(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Sum of price x quantity; never triggers a fetch.
    fn total(&self) -> Decimal {
        self.cart().total()
    }

    /// Sum of quantities; never triggers a fetch.
    fn item_count(&self) -> u64 {
        self.cart().item_count()
    }
}

// =============================================================================
// LocalStore
// =============================================================================

/// Cart kept entirely in memory.
pub struct LocalStore {
    cart: Cart,
    publisher: SnapshotPublisher,
}

impl LocalStore {
    /// Create an empty local store.
    #[must_use]
    pub fn new(publisher: SnapshotPublisher) -> Self {
        Self::with_cart(Cart::new(), publisher)
    }

    /// Create a local store from a previously saved cart.
    ///
    /// Any server id the cart carried is dropped; a local cart has none.
    #[must_use]
    pub fn with_cart(mut cart: Cart, publisher: SnapshotPublisher) -> Self {
        cart.set_id(None);
        let store = Self { cart, publisher };
        store.publish();
        store
    }

    /// Take the cart out of the store.
    #[must_use]
    pub fn into_cart(self) -> Cart {
        self.cart
    }

    fn publish(&self) {
        self.publisher.publish(CartSnapshot::capture(
            CartMode::Local,
            &self.cart,
            SyncStatus::Unauthenticated,
            false,
            None,
        ));
    }
}

impl CartStore for LocalStore {
    fn cart(&self) -> &Cart {
        &self.cart
    }

    #[instrument(skip(self, product), fields(product_id = ?product.id))]
    async fn add(&mut self, product: Product, quantity: u32) -> Result<()> {
        self.cart.add(product, quantity)?;
        self.publish();
        Ok(())
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) -> Result<()> {
        if self.cart.set_quantity(product_id, quantity) {
            self.publish();
        } else {
            debug!("Product not in cart; nothing to update");
        }
        Ok(())
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn remove(&mut self, product_id: &ProductId) -> Result<()> {
        if self.cart.remove(product_id).is_some() {
            self.publish();
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear(&mut self) -> Result<()> {
        self.cart.clear();
        self.publish();
        Ok(())
    }
}
