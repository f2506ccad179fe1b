//! Cartwise Core - Shared types library.
//!
//! This crate provides the types used across all Cartwise components:
//! - `client` - REST, catalog and cart service layer
//! - `cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure reducers - no I/O, no HTTP
//! clients. The local cart strategy lives here because it is nothing more
//! than list manipulation; the server-synced strategy lives in the client
//! crate and reuses [`Cart`] as its in-memory mirror.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids and prices, plus the product model
//! - [`cart`] - Cart lines and the in-memory cart reducers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{Cart, CartError, CartLine};
pub use types::*;
