//! Server-synced cart.
//!
//! The server is the source of truth. Every mutation is sent to the backend
//! and followed by a full refetch of the active cart, whether or not the
//! mutation succeeded. Local state is never patched optimistically.
//!
//! # Fetch protocol
//!
//! 1. `GET /api/carts` and take the first cart as the active one
//! 2. `GET /api/carts/{cart_id}/items`
//!
//! Each leg has its own timeout. A session with no carts yields an empty,
//! synced cart. Any failure empties the local cart, unsets the cart id and
//! moves to [`SyncStatus::Error`].

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use cartwise_core::cart::validate;
use cartwise_core::{Cart, CartId, Product, ProductId};

use super::{CartMode, CartSnapshot, CartStore, SnapshotPublisher, SyncStatus};
use crate::api::{ApiClient, ApiError};
use crate::error::{ClientError, Result};
use crate::session::SessionToken;

/// Cart mirrored from the backend for an authenticated session.
///
/// Sync state and the loading flag live in the published snapshot, so what
/// subscribers see and what [`Self::status`] reports cannot drift apart.
pub struct RemoteStore {
    api: ApiClient,
    token: SessionToken,
    cart: Cart,
    last_synced_at: Option<DateTime<Utc>>,
    publisher: SnapshotPublisher,
}

impl RemoteStore {
    /// Create a store for a session.
    ///
    /// Nothing is fetched or published until [`Self::sync`].
    #[must_use]
    pub const fn new(api: ApiClient, token: SessionToken, publisher: SnapshotPublisher) -> Self {
        Self {
            api,
            token,
            cart: Cart::new(),
            last_synced_at: None,
            publisher,
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

    /// When the last successful fetch completed.
    #[must_use]
    pub const fn last_synced_at(&self) -> Option<DateTime<Utc>> {
        self.last_synced_at
    }

    /// Replace local state with the server's active cart.
    ///
    /// # Errors
    ///
    /// Returns the fetch error after emptying the cart and recording the
    /// user-facing message in [`SyncStatus::Error`].
    #[instrument(skip(self))]
    pub async fn sync(&mut self) -> Result<()> {
        let in_flight = self.begin();
        let fetched = fetch_active_cart(&self.api, &self.token).await;
        self.settle(in_flight, fetched)
    }

    /// Publish `Syncing` with the loading flag set.
    ///
    /// The returned guard puts the previous snapshot back if it is dropped
    /// before [`Self::settle`], e.g. when the caller cancels the future.
    fn begin(&self) -> InFlight {
        let in_flight = InFlight::new(self.publisher.clone());
        self.publish(SyncStatus::Syncing, true);
        in_flight
    }

    /// Apply the result of a fetch, clear the loading flag and publish.
    fn settle(
        &mut self,
        in_flight: InFlight,
        fetched: std::result::Result<Cart, ApiError>,
    ) -> Result<()> {
        in_flight.complete();
        match fetched {
            Ok(cart) => {
                debug!(
                    cart_id = ?cart.id(),
                    lines = cart.len(),
                    "Cart synced"
                );
                self.cart = cart;
                self.last_synced_at = Some(Utc::now());
                self.publish(SyncStatus::Synced, false);
                Ok(())
            }
            Err(err) => {
                let err = ClientError::from(err);
                warn!(error = %err, "Cart sync failed");
                self.cart = Cart::new();
                self.publish(SyncStatus::Error(err.user_message()), false);
                Err(err)
            }
        }
    }

    /// Refetch after a mutation and report the mutation's own failure first.
    async fn refetch_after(
        &mut self,
        in_flight: InFlight,
        operation: &'static str,
        mutation: std::result::Result<(), ApiError>,
    ) -> Result<()> {
        if let Err(err) = &mutation {
            warn!(operation, error = %err, "Cart mutation failed; refetching server state");
        }
        let fetched = fetch_active_cart(&self.api, &self.token).await;
        let refetched = self.settle(in_flight, fetched);
        mutation?;
        refetched
    }

    /// Id of the active cart, creating one if the session has none.
    async fn active_cart_id(&mut self) -> std::result::Result<CartId, ApiError> {
        if let Some(id) = self.cart.id() {
            return Ok(id.clone());
        }
        let existing = self.api.list_carts(&self.token).await?.into_iter().next();
        let record = match existing {
            Some(record) => record,
            None => {
                info!("Session has no cart; creating one");
                self.api.create_cart(&self.token).await?
            }
        };
        self.cart.set_id(Some(record.cart_id.clone()));
        Ok(record.cart_id)
    }

    /// Cart id to mutate a line with, if the line exists locally.
    fn line_cart_id(&self, product_id: &ProductId) -> Option<CartId> {
        if self.cart.contains(product_id) {
            self.cart.id().cloned()
        } else {
            None
        }
    }

    fn publish(&self, status: SyncStatus, loading: bool) {
        self.publisher.publish(CartSnapshot::capture(
            CartMode::Remote,
            &self.cart,
            status,
            loading,
            self.last_synced_at,
        ));
    }
}

/// A request in flight against the backend.
///
/// Holds the last settled snapshot and republishes it on drop unless the
/// request completed, so a cancelled future never leaves `loading` set.
struct InFlight {
    publisher: SnapshotPublisher,
    settled: Option<CartSnapshot>,
}

impl InFlight {
    fn new(publisher: SnapshotPublisher) -> Self {
        let settled = Some(publisher.current());
        Self { publisher, settled }
    }

    /// The request finished; the caller publishes the outcome.
    fn complete(mut self) {
        self.settled = None;
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if let Some(settled) = self.settled.take() {
            warn!("Cart request cancelled; restoring last settled state");
            self.publisher.publish(settled);
        }
    }
}

impl CartStore for RemoteStore {
    fn cart(&self) -> &Cart {
        &self.cart
    }

    #[instrument(skip(self, product), fields(product_id = ?product.id))]
    async fn add(&mut self, product: Product, quantity: u32) -> Result<()> {
        let product_id = validate(&product, quantity)?.clone();

        let in_flight = self.begin();
        let mutation = match self.active_cart_id().await {
            Ok(cart_id) => {
                self.api
                    .add_item(&self.token, &cart_id, &product_id, quantity)
                    .await
            }
            Err(err) => Err(err),
        };
        self.refetch_after(in_flight, "add", mutation).await
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) -> Result<()> {
        if quantity == 0 {
            return self.remove(product_id).await;
        }
        let Some(cart_id) = self.line_cart_id(product_id) else {
            debug!("Product not in cart; nothing to update");
            return Ok(());
        };

        let in_flight = self.begin();
        let mutation = self
            .api
            .update_item(&self.token, &cart_id, product_id, quantity)
            .await;
        self.refetch_after(in_flight, "set quantity", mutation).await
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn remove(&mut self, product_id: &ProductId) -> Result<()> {
        let Some(cart_id) = self.line_cart_id(product_id) else {
            debug!("Product not in cart; nothing to remove");
            return Ok(());
        };

        let in_flight = self.begin();
        let mutation = self
            .api
            .remove_item(&self.token, &cart_id, product_id)
            .await;
        self.refetch_after(in_flight, "remove", mutation).await
    }

    /// Delete every line on the server, then refetch.
    ///
    /// Stops at the first failed delete; the refetch still runs so local
    /// state shows whatever the server kept.
    #[instrument(skip(self))]
    async fn clear(&mut self) -> Result<()> {
        let Some(cart_id) = self.cart.id().cloned() else {
            self.cart.clear();
            self.publish(self.status(), false);
            return Ok(());
        };
        let product_ids: Vec<ProductId> = self
            .cart
            .lines()
            .iter()
            .filter_map(|line| line.product_id().cloned())
            .collect();

        let in_flight = self.begin();
        let mut mutation = Ok(());
        for product_id in &product_ids {
            mutation = self
                .api
                .remove_item(&self.token, &cart_id, product_id)
                .await;
            if mutation.is_err() {
                break;
            }
        }
        self.refetch_after(in_flight, "clear", mutation).await
    }
}

/// Fetch the session's active cart and its lines.
async fn fetch_active_cart(
    api: &ApiClient,
    token: &SessionToken,
) -> std::result::Result<Cart, ApiError> {
    let Some(active) = api.list_carts(token).await?.into_iter().next() else {
        return Ok(Cart::new());
    };
    let lines = api.list_items(token, &active.cart_id).await?;
    Ok(Cart::from_lines(Some(active.cart_id), lines))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    fn store(publisher: &SnapshotPublisher) -> RemoteStore {
        let config = ClientConfig::new("http://127.0.0.1:9".parse().unwrap());
        RemoteStore::new(
            ApiClient::new(&config).unwrap(),
            SessionToken::new("t0k3n"),
            publisher.clone(),
        )
    }

    #[test]
    fn test_new_store_publishes_nothing() {
        let publisher = SnapshotPublisher::new();
        let mut receiver = publisher.subscribe();

        let _store = store(&publisher);

        assert!(!receiver.has_changed().unwrap());
        assert_eq!(publisher.current(), CartSnapshot::empty());
    }

    #[test]
    fn test_dropped_request_restores_settled_snapshot() {
        let publisher = SnapshotPublisher::new();
        let store = store(&publisher);

        let in_flight = store.begin();
        assert!(store.is_loading());
        assert_eq!(store.status(), SyncStatus::Syncing);
        assert_eq!(publisher.current().mode, CartMode::Remote);

        drop(in_flight);
        assert!(!store.is_loading());
        assert_eq!(publisher.current(), CartSnapshot::empty());
    }

    #[test]
    fn test_settled_request_publishes_outcome() {
        let publisher = SnapshotPublisher::new();
        let mut store = store(&publisher);

        let mut fetched = Cart::new();
        fetched.set_id(Some(CartId::new("c1")));

        let in_flight = store.begin();
        store.settle(in_flight, Ok(fetched)).unwrap();

        let snapshot = publisher.current();
        assert_eq!(snapshot.mode, CartMode::Remote);
        assert_eq!(snapshot.status, SyncStatus::Synced);
        assert!(!snapshot.loading);
        assert!(snapshot.last_synced_at.is_some());
    }
}
