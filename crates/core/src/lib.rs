//! Shopfront Core - Shared types library.
//!
//! This crate provides the domain types shared by the Shopfront components:
//! - `storefront` - Cart store, persistence and the REST cart client
//! - `cli` - Command-line front end for the local and server carts
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, decimal prices, catalog snapshots and cart lines

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
