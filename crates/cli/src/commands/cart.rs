//! Local cart commands.
//!
//! The cart lives in `SHOPFRONT_CART_DIR/SHOPFRONT_CART_SLOT.json` and is
//! reopened for every command.

use shopfront_core::LineItemId;
use shopfront_storefront::{CartStore, Error, JsonFileStorage, Result, ShopfrontConfig};

use super::render;
use crate::commands::remote;

fn open(config: &ShopfrontConfig) -> CartStore<JsonFileStorage> {
    CartStore::open(JsonFileStorage::from_config(&config.cart))
}

/// Show the local cart.
pub fn show(config: &ShopfrontConfig) -> String {
    render(&open(config).to_cart())
}

/// Look up `product` on the backend and add `quantity` units of `size`.
pub async fn add(
    config: &ShopfrontConfig,
    product: &str,
    size: &str,
    quantity: u32,
) -> Result<String> {
    if quantity == 0 {
        return Err(Error::BadRequest("quantity must be at least 1".to_string()));
    }

    let client = remote::client()?;
    let product = client.get_product(product).await?;
    let size = product.size(size).ok_or_else(|| {
        Error::NotFound(format!(
            "size '{size}' for product '{}'",
            product.snapshot.slug
        ))
    })?;

    let mut store = open(config);
    store.add_item(product.line_item(size, quantity));
    tracing::info!(product = %product.snapshot.id, size = %size.id, quantity, "Added to cart");
    Ok(render(&store.to_cart()))
}

/// Remove a line.
pub fn remove(config: &ShopfrontConfig, id: &str) -> String {
    let mut store = open(config);
    store.remove_item(&LineItemId::new(id));
    render(&store.to_cart())
}

/// Set a line's quantity.
pub fn set(config: &ShopfrontConfig, id: &str, quantity: i64) -> String {
    let mut store = open(config);
    store.update_quantity(&LineItemId::new(id), quantity);
    render(&store.to_cart())
}

/// Empty the cart.
pub fn clear(config: &ShopfrontConfig) -> String {
    let mut store = open(config);
    store.clear_cart();
    render(&store.to_cart())
}
