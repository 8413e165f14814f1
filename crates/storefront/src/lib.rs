//! Shopfront storefront library.
//!
//! # Modules
//!
//! - [`store`] - Local cart store with merge-by-product-and-size semantics
//! - [`storage`] - Injected persistence for the local cart
//! - [`backend`] - REST client and normalization for the server-confirmed cart
//! - [`config`] - Environment configuration
//!
//! The local cart and the server cart are independent: nothing here syncs one
//! into the other.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod error;
pub mod storage;
pub mod store;

pub use backend::{ApiError, CartApiClient, CatalogProduct};
pub use config::{ApiConfig, CartStorageConfig, ConfigError, ShopfrontConfig};
pub use error::{Error, Result};
pub use storage::{CartStorage, JsonFileStorage, MemoryStorage, StorageError};
pub use store::CartStore;
