//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers for the cart domain.

pub mod cart;
pub mod id;
pub mod price;

pub use cart::{Cart, LineItem, LineKey, ProductSnapshot, SizeSnapshot};
pub use id::*;
pub use price::Price;
