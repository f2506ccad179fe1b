//! Cart snapshots published to views.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::watch;

use cartwise_core::{Cart, CartId, CartLine};

/// Which backing strategy produced a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CartMode {
    Local,
    Remote,
}

/// Sync state of a cart.
///
/// ```text
/// Unauthenticated -> Syncing -> Synced
///                            -> Error
/// Synced -> Syncing (every mutation refetches)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum SyncStatus {
    /// No session; the local cart is in use.
    Unauthenticated,
    /// A request to the server is in flight.
    Syncing,
    /// The last fetch succeeded.
    Synced,
    /// The last fetch failed; carries the user-facing message.
    Error(String),
}

/// Immutable view of a cart at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSnapshot {
    pub mode: CartMode,
    pub cart_id: Option<CartId>,
    pub lines: Vec<CartLine>,
    pub total: Decimal,
    pub item_count: u64,
    pub status: SyncStatus,
    pub loading: bool,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl CartSnapshot {
    /// Capture a cart together with its sync state.
    #[must_use]
    pub fn capture(
        mode: CartMode,
        cart: &Cart,
        status: SyncStatus,
        loading: bool,
        last_synced_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            mode,
            cart_id: cart.id().cloned(),
            lines: cart.lines().to_vec(),
            total: cart.total(),
            item_count: cart.item_count(),
            status,
            loading,
            last_synced_at,
        }
    }

    /// Snapshot of an empty local cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::capture(
            CartMode::Local,
            &Cart::new(),
            SyncStatus::Unauthenticated,
            false,
            None,
        )
    }
}

/// Broadcasts the latest snapshot to any number of subscribers.
///
/// Subscribers only ever see the most recent value.
#[derive(Clone)]
pub struct SnapshotPublisher {
    sender: Arc<watch::Sender<CartSnapshot>>,
}

impl SnapshotPublisher {
    /// Create a publisher holding an empty local snapshot.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(CartSnapshot::empty());
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Replace the current snapshot.
    pub fn publish(&self, snapshot: CartSnapshot) {
        self.sender.send_replace(snapshot);
    }

    /// Subscribe to snapshot changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.sender.subscribe()
    }

    /// The current snapshot.
    #[must_use]
    pub fn current(&self) -> CartSnapshot {
        self.sender.borrow().clone()
    }

    /// Sync state of the current snapshot.
    #[must_use]
    pub fn status(&self) -> SyncStatus {
        self.sender.borrow().status.clone()
    }

    /// Whether the current snapshot has a request in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.sender.borrow().loading
    }
}

impl Default for SnapshotPublisher {
    fn default() -> Self {
        Self::new()
    }
}
