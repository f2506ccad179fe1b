//! Cart service handle.
//!
//! Owns exactly one cart backend and switches it with the session:
//!
//! - constructed without a session: [`LocalStore`]
//! - [`CartService::sign_in`]: [`RemoteStore`], synced immediately
//! - [`CartService::sign_out`]: back to an empty [`LocalStore`]
//!
//! Views subscribe with [`CartService::subscribe`] and re-render on every
//! published [`CartSnapshot`].

use tokio::sync::watch;
use tracing::{debug, info, instrument};

use cartwise_core::{Cart, Product, ProductId};

use crate::api::ApiClient;
use crate::error::Result;
use crate::session::SessionToken;
use crate::store::{
    CartMode, CartSnapshot, CartStore, LocalStore, RemoteStore, SnapshotPublisher, SyncStatus,
};

/// The backend currently serving the cart.
enum Backend {
    Local(LocalStore),
    Remote(RemoteStore),
}

/// Cart handle for one client, from session start to sign-out.
pub struct CartService {
    api: ApiClient,
    backend: Backend,
    publisher: SnapshotPublisher,
}

impl CartService {
    /// Create a service with an empty local cart.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self::with_local_cart(api, Cart::new())
    }

    /// Create a service around a previously saved local cart.
    #[must_use]
    pub fn with_local_cart(api: ApiClient, cart: Cart) -> Self {
        let publisher = SnapshotPublisher::new();
        let backend = Backend::Local(LocalStore::with_cart(cart, publisher.clone()));
        Self {
            api,
            backend,
            publisher,
        }
    }

    /// Switch to the server-synced cart for a session and fetch it.
    ///
    /// Local-only lines are discarded; the server cart is canonical. If the
    /// returned future is dropped before the fetch completes, the service
    /// stays on the local cart and its snapshot is republished.
    ///
    /// # Errors
    ///
    /// Returns the sync error, with the cart emptied and the failure recorded
    /// in the status.
    #[instrument(skip(self, token))]
    pub async fn sign_in(&mut self, token: SessionToken) -> Result<()> {
        if let Backend::Local(local) = &self.backend
            && !local.cart().is_empty()
        {
            debug!(
                lines = local.cart().len(),
                "Discarding local cart in favour of the server cart"
            );
        }

        let mut remote = RemoteStore::new(self.api.clone(), token, self.publisher.clone());
        let synced = remote.sync().await;
        self.backend = Backend::Remote(remote);
        info!(status = ?self.status(), "Signed in");
        synced
    }

    /// Tear down the session and start over with an empty local cart.
    #[instrument(skip(self))]
    pub fn sign_out(&mut self) {
        self.backend = Backend::Local(LocalStore::new(self.publisher.clone()));
        info!("Signed out");
    }

    /// Refetch the server cart. A no-op for the local cart.
    ///
    /// # Errors
    ///
    /// Returns the sync error for a signed-in session.
    pub async fn refresh(&mut self) -> Result<()> {
        match &mut self.backend {
            Backend::Local(_) => Ok(()),
            Backend::Remote(remote) => remote.sync().await,
        }
    }

    /// Whether a session is active.
    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        matches!(self.backend, Backend::Remote(_))
    }

    /// Which strategy is active.
    #[must_use]
    pub const fn mode(&self) -> CartMode {
        match self.backend {
            Backend::Local(_) => CartMode::Local,
            Backend::Remote(_) => CartMode::Remote,
        }
    }

    /// Current sync state.
    #[must_use]
    pub fn status(&self) -> SyncStatus {
        self.publisher.status()
    }

    /// Whether a request is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.publisher.is_loading()
    }

    /// The latest snapshot.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        self.publisher.current()
    }

    /// Subscribe to snapshot changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.publisher.subscribe()
    }
}

impl CartStore for CartService {
    fn cart(&self) -> &Cart {
        match &self.backend {
            Backend::Local(local) => local.cart(),
            Backend::Remote(remote) => remote.cart(),
        }
    }

    async fn add(&mut self, product: Product, quantity: u32) -> Result<()> {
        match &mut self.backend {
            Backend::Local(local) => local.add(product, quantity).await,
            Backend::Remote(remote) => remote.add(product, quantity).await,
        }
    }

    async fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) -> Result<()> {
        match &mut self.backend {
            Backend::Local(local) => local.set_quantity(product_id, quantity).await,
            Backend::Remote(remote) => remote.set_quantity(product_id, quantity).await,
        }
    }

    async fn remove(&mut self, product_id: &ProductId) -> Result<()> {
        match &mut self.backend {
            Backend::Local(local) => local.remove(product_id).await,
            Backend::Remote(remote) => remote.remove(product_id).await,
        }
    }

    async fn clear(&mut self) -> Result<()> {
        match &mut self.backend {
            Backend::Local(local) => local.clear().await,
            Backend::Remote(remote) => remote.clear().await,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cartwise_core::Price;
    use rust_decimal::Decimal;

    use super::*;
    use crate::config::ClientConfig;

    fn service() -> CartService {
        let config = ClientConfig::new("http://127.0.0.1:9".parse().unwrap());
        CartService::new(ApiClient::new(&config).unwrap())
    }

    #[tokio::test]
    async fn test_new_service_is_local_and_unauthenticated() {
        let service = service();
        assert_eq!(service.mode(), CartMode::Local);
        assert!(!service.is_signed_in());
        assert_eq!(service.status(), SyncStatus::Unauthenticated);
        assert!(!service.is_loading());
    }

    #[tokio::test]
    async fn test_local_operations_through_service() {
        let mut service = service();
        let mut updates = service.subscribe();

        service
            .add(Product::new("1", "A").with_price(Price::from_cents(1000)), 1)
            .await
            .unwrap();
        service
            .add(Product::new("2", "B").with_price(Price::from_cents(500)), 3)
            .await
            .unwrap();

        assert!(updates.has_changed().unwrap());
        let snapshot = updates.borrow_and_update().clone();
        assert_eq!(snapshot.total, Decimal::new(25, 0));
        assert_eq!(snapshot.item_count, 4);
        assert_eq!(service.total(), Decimal::new(25, 0));
        assert_eq!(service.item_count(), 4);
    }

    #[tokio::test]
    async fn test_sign_out_resets_to_empty_local_cart() {
        let mut service = service();
        service
            .add(Product::new("1", "A").with_price(Price::from_cents(100)), 2)
            .await
            .unwrap();

        service.sign_out();
        assert!(service.cart().is_empty());
        assert_eq!(service.snapshot().item_count, 0);
        assert_eq!(service.mode(), CartMode::Local);
    }

    #[tokio::test]
    async fn test_refresh_is_noop_locally() {
        let mut service = service();
        assert!(service.refresh().await.is_ok());
    }
}
