//! Server-confirmed cart commands.
//!
//! Every command round-trips to the backend and prints the normalized
//! response; nothing is written to the local cart.

use shopfront_core::{Cart, LineItemId, ProductId, SizeId};
use shopfront_storefront::{ApiConfig, CartApiClient, Error, Result};

/// Build a client from `SHOPFRONT_API_*` variables.
pub fn client() -> Result<CartApiClient> {
    let config = ApiConfig::from_env()?;
    tracing::debug!(?config, "Using backend");
    Ok(CartApiClient::new(&config)?)
}

/// Add a product size to the server cart.
pub async fn add(
    client: &CartApiClient,
    product: &str,
    size: &str,
    quantity: u32,
) -> Result<Cart> {
    if quantity == 0 {
        return Err(Error::BadRequest("quantity must be at least 1".to_string()));
    }
    Ok(client
        .add_item(&ProductId::new(product), &SizeId::new(size), quantity)
        .await?)
}

/// Set the quantity of a server line.
pub async fn update(client: &CartApiClient, id: &str, quantity: u32) -> Result<Cart> {
    Ok(client.update_item(&LineItemId::new(id), quantity).await?)
}
