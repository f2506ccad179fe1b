//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! cartwise cart show
//! cartwise cart add 123 -q 2
//! cartwise cart set 123 5
//! cartwise cart remove 123
//! cartwise cart clear
//! ```
//!
//! # Environment Variables
//!
//! - `CARTWISE_SESSION_TOKEN` - Work against the server cart when set
//! - `CARTWISE_LOCAL_CART_PATH` - Local cart file used otherwise

use std::fmt::Write as _;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use cartwise_client::{
    ApiClient, CartService, CartSnapshot, CartStore, CatalogClient, ClientConfig, Result,
    SyncStatus,
};
use cartwise_core::{Cart, ProductId};

/// A cart service plus the catalog used to resolve product ids.
pub struct CartSession {
    service: CartService,
    catalog: CatalogClient,
    /// Set in local mode; the cart is written back here after each command.
    local_path: Option<PathBuf>,
}

impl CartSession {
    /// Open the server cart when a token is configured, the local file otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the local file is unreadable or the initial server
    /// sync fails.
    #[instrument(skip(config))]
    pub async fn open(config: &ClientConfig) -> Result<Self> {
        let api = ApiClient::new(config)?;
        let catalog = CatalogClient::new(api.clone(), config);

        match &config.session_token {
            Some(token) => {
                let mut service = CartService::new(api);
                service.sign_in(token.clone()).await?;
                Ok(Self {
                    service,
                    catalog,
                    local_path: None,
                })
            }
            None => {
                let cart = load_local_cart(&config.local_cart_path).await?;
                Ok(Self {
                    service: CartService::with_local_cart(api, cart),
                    catalog,
                    local_path: Some(config.local_cart_path.clone()),
                })
            }
        }
    }

    /// Look a product up in the catalog and add it.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the add fails.
    pub async fn add(&mut self, product_id: &ProductId, quantity: u32) -> Result<()> {
        let product = self.catalog.product(product_id).await?;
        info!(product_id = %product_id, quantity, "Adding to cart");
        self.service.add(product, quantity).await
    }

    /// # Errors
    ///
    /// Returns an error if the server rejects the update.
    pub async fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) -> Result<()> {
        self.service.set_quantity(product_id, quantity).await
    }

    /// # Errors
    ///
    /// Returns an error if the server rejects the removal.
    pub async fn remove(&mut self, product_id: &ProductId) -> Result<()> {
        self.service.remove(product_id).await
    }

    /// # Errors
    ///
    /// Returns an error if any server line could not be deleted.
    pub async fn clear(&mut self) -> Result<()> {
        self.service.clear().await
    }

    /// Persist the local cart. Server carts need no saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save(&self) -> Result<()> {
        if let Some(path) = &self.local_path {
            save_local_cart(path, self.service.cart()).await?;
        }
        Ok(())
    }

    /// The latest cart snapshot.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        self.service.snapshot()
    }
}

/// Read the local cart file. A missing file is an empty cart.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub async fn load_local_cart(path: &Path) -> Result<Cart> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "No local cart file; starting empty");
            return Ok(Cart::new());
        }
        Err(e) => return Err(e.into()),
    };
    let stored: Cart = serde_json::from_str(&raw)?;
    // Re-run the reducers over a hand-edited file
    Ok(Cart::from_lines(None, stored.lines().to_vec()))
}

/// Write the local cart file.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub async fn save_local_cart(path: &Path, cart: &Cart) -> Result<()> {
    let json = serde_json::to_string_pretty(cart)?;
    tokio::fs::write(path, json).await?;
    debug!(path = %path.display(), lines = cart.len(), "Saved local cart");
    Ok(())
}

/// Print a snapshot to stdout.
#[allow(clippy::print_stdout)]
pub fn print_cart(snapshot: &CartSnapshot) {
    print!("{}", format_cart(snapshot));
}

/// Render a snapshot as plain text.
pub fn format_cart(snapshot: &CartSnapshot) -> String {
    let mut out = String::new();

    if let SyncStatus::Error(message) = &snapshot.status {
        let _ = writeln!(out, "warning: {message}");
    }
    if snapshot.lines.is_empty() {
        out.push_str("Cart is empty.\n");
        return out;
    }

    for line in &snapshot.lines {
        let id = line.product_id().map_or("-", |id| id.as_str());
        let _ = writeln!(
            out,
            "{id:<12} {:>3} x {:<40} {:>10.2}",
            line.quantity,
            line.product.name,
            line.subtotal()
        );
    }
    let _ = writeln!(
        out,
        "{} item(s), total {:.2}",
        snapshot.item_count, snapshot.total
    );
    out
}
