//! REST backend client and server cart normalization.
//!
//! # Architecture
//!
//! - The backend is the source of truth for the server-confirmed cart; every
//!   mutation round-trips and the response is normalized again
//! - Raw payloads ([`payload`]) model every field as optional and tolerate
//!   wrong JSON types, so a partial response degrades instead of failing
//! - Product lookups are cached in memory via `moka` (5 minute TTL); cart
//!   calls are never cached
//!
//! # Example
//!
//! ```rust,ignore
//! use shopfront_storefront::backend::CartApiClient;
//!
//! let client = CartApiClient::new(&api_config)?;
//!
//! let product = client.get_product("linen-shirt").await?;
//! let cart = client.add_item(&product.snapshot.id, &product.sizes[0].id, 1).await?;
//! println!("{} items, total {}", cart.item_count, cart.total);
//! ```

mod cache;
mod client;
pub mod conversions;
pub mod payload;

pub use client::CartApiClient;
pub use conversions::{CatalogProduct, normalize_cart, normalize_cart_json, normalize_product};
pub use payload::{
    ServerCartItem, ServerCartPayload, ServerProduct, ServerProductDetail, ServerSizeDetail,
};

use thiserror::Error;

/// Errors that can occur when talking to the REST backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Status code.
        status: u16,
        /// Leading part of the response body.
        body: String,
    },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend. Carries the `Retry-After` seconds, or 1
    /// when the header is missing or not a number.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The configured base URL cannot have paths appended.
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::NotFound("products/linen-shirt/".to_string());
        assert_eq!(err.to_string(), "Not found: products/linen-shirt/");
    }

    #[test]
    fn test_status_error_display() {
        let err = ApiError::Status {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500: boom");
    }

    #[test]
    fn test_rate_limited_error() {
        let err = ApiError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }
}
