//! Cart normalization.
//!
//! Every field of the output has an explicit fallback, so a partial or
//! malformed cart document produces zero/empty values instead of an error.
//! An absent document is the empty cart.

use serde_json::Value;
use shopfront_core::{
    Cart, CartId, LineItem, LineItemId, Price, ProductId, ProductSnapshot, SizeId, SizeSnapshot,
};
use tracing::warn;

use crate::backend::payload::{ServerCartItem, ServerCartPayload};

/// Flatten a server cart into the render-ready [`Cart`].
///
/// - `total` is taken from the payload, defaulting to zero; it is never
///   recomputed locally.
/// - `item_count` prefers the server's `total_items`, otherwise sums the
///   line quantities.
#[must_use]
pub fn normalize_cart(raw: Option<ServerCartPayload>) -> Cart {
    let Some(raw) = raw else {
        return Cart::empty();
    };

    let items: Vec<LineItem> = raw
        .items
        .unwrap_or_default()
        .into_iter()
        .map(normalize_line)
        .collect();

    let item_count = raw
        .total_items
        .unwrap_or_else(|| items.iter().map(|i| u64::from(i.quantity)).sum());

    Cart {
        id: CartId::from(raw.id.unwrap_or_default()),
        items,
        total: raw.total.map_or(Price::ZERO, Price::new),
        item_count,
    }
}

/// Normalize a response body.
///
/// An empty body, `null`, a non-object document, or invalid JSON all count
/// as an absent cart.
#[must_use]
pub fn normalize_cart_json(body: &str) -> Cart {
    if body.trim().is_empty() {
        return Cart::empty();
    }

    let value = match serde_json::from_str::<Value>(body) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Cart response is not valid JSON, treating as empty");
            return Cart::empty();
        }
    };

    match value {
        Value::Null => Cart::empty(),
        Value::Object(_) => normalize_cart(serde_json::from_value(value).ok()),
        other => {
            warn!(kind = %json_kind(&other), "Cart response is not an object, treating as empty");
            Cart::empty()
        }
    }
}

fn normalize_line(raw: ServerCartItem) -> LineItem {
    let detail = raw.product_detail.unwrap_or_default();
    let size = raw.size_detail.unwrap_or_default();

    LineItem {
        id: LineItemId::from(raw.id.unwrap_or_default()),
        product: ProductSnapshot {
            id: ProductId::from(detail.id.or(raw.product).unwrap_or_default()),
            name: detail.name.unwrap_or_default(),
            slug: detail.slug.unwrap_or_default(),
            // Embedded product price first, then the price captured when the line was added
            price: detail.price.or(raw.unit_price).map_or(Price::ZERO, Price::new),
            image: detail.image,
        },
        size: SizeSnapshot {
            id: SizeId::from(size.id.or(raw.size).unwrap_or_default()),
            name: size.name.unwrap_or_default(),
        },
        quantity: raw.quantity.unwrap_or(0),
        subtotal: Some(raw.subtotal.map_or(Price::ZERO, Price::new)),
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
