//! Conversions from raw backend payloads to the flat view models.

pub mod cart;
pub mod products;

pub use cart::{normalize_cart, normalize_cart_json};
pub use products::{CatalogProduct, normalize_product};
