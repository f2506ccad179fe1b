//! Cartwise client library.
//!
//! Talks to the commerce backend over REST and keeps a cart for the current
//! client, either in memory or mirrored from the server.
//!
//! # Modules
//!
//! - [`api`] - REST client with per-request timeouts
//! - [`catalog`] - Cached product search and lookup
//! - [`store`] - Cart strategies behind the [`CartStore`] trait
//! - [`service`] - Session lifecycle switching between strategies

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod service;
pub mod session;
pub mod store;

pub use api::{ApiClient, ApiError};
pub use catalog::CatalogClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, ErrorKind, Result};
pub use service::CartService;
pub use session::SessionToken;
pub use store::{
    CartMode, CartSnapshot, CartStore, LocalStore, RemoteStore, SnapshotPublisher, SyncStatus,
};
