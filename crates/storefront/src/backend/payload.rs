//! Raw payload types for the REST backend.
//!
//! The add-item, fetch-cart and update-item endpoints embed product and size
//! details inconsistently, so every field here is optional. Fields are also
//! lenient about their JSON type: a value of the wrong shape becomes `None`
//! rather than failing the whole document. Ids may arrive as strings or
//! numbers, prices as decimal strings or numbers.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// Cart document as returned by `GET cart/` and the cart mutations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerCartPayload {
    /// Cart ID.
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    /// Cart lines.
    #[serde(deserialize_with = "lenient_vec")]
    pub items: Option<Vec<ServerCartItem>>,
    /// Server-computed cart total.
    #[serde(deserialize_with = "lenient_decimal")]
    pub total: Option<Decimal>,
    /// Server-computed unit count.
    #[serde(deserialize_with = "lenient_u64")]
    pub total_items: Option<u64>,
}

/// One raw cart line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerCartItem {
    /// Server-assigned line ID.
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    /// Flat product ID.
    #[serde(deserialize_with = "lenient_string")]
    pub product: Option<String>,
    /// Embedded product details.
    #[serde(deserialize_with = "lenient")]
    pub product_detail: Option<ServerProductDetail>,
    /// Flat size ID.
    #[serde(deserialize_with = "lenient_string")]
    pub size: Option<String>,
    /// Embedded size details.
    #[serde(deserialize_with = "lenient")]
    pub size_detail: Option<ServerSizeDetail>,
    /// Quantity.
    #[serde(deserialize_with = "lenient_u32")]
    pub quantity: Option<u32>,
    /// Unit price recorded when the line was added.
    #[serde(deserialize_with = "lenient_decimal")]
    pub unit_price: Option<Decimal>,
    /// Server-computed line subtotal.
    #[serde(deserialize_with = "lenient_decimal")]
    pub subtotal: Option<Decimal>,
}

/// Product details embedded in a cart line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerProductDetail {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub slug: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub price: Option<Decimal>,
    #[serde(deserialize_with = "lenient_string")]
    pub image: Option<String>,
}

/// Size details embedded in a cart line or listed on a product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerSizeDetail {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
}

/// Catalog product as returned by `GET products/{slug}/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerProduct {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub slug: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub price: Option<Decimal>,
    #[serde(deserialize_with = "lenient_string")]
    pub image: Option<String>,
    #[serde(deserialize_with = "lenient_vec")]
    pub sizes: Option<Vec<ServerSizeDetail>>,
}

/// Body of `POST cart/items/`.
#[derive(Debug, Clone, Serialize)]
pub struct AddItemRequest<'a> {
    pub product_id: &'a str,
    pub size_id: &'a str,
    pub quantity: u32,
}

/// Body of `PATCH cart/items/{id}/`.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateItemRequest {
    pub quantity: u32,
}

// =============================================================================
// Lenient field deserializers
// =============================================================================

/// Any JSON value, or `None` for null/absent. Never fails on well-formed JSON.
fn raw_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Option::<Value>::deserialize(deserializer)
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(raw_value(deserializer)?.and_then(|v| serde_json::from_value(v).ok()))
}

fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Some(Value::Array(entries)) = raw_value(deserializer)? else {
        return Ok(None);
    };
    let parsed = entries
        .into_iter()
        .filter_map(|entry| match entry {
            Value::Object(_) => serde_json::from_value(entry).ok(),
            other => {
                warn!(entry = %other, "Skipping non-object list entry in backend payload");
                None
            }
        })
        .collect();
    Ok(Some(parsed))
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match raw_value(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_decimal<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Decimal>, D::Error> {
    Ok(match raw_value(deserializer)? {
        Some(Value::String(s)) => parse_decimal(&s),
        Some(Value::Number(n)) => parse_decimal(&n.to_string()),
        _ => None,
    })
}

fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    Ok(match raw_value(deserializer)? {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    Ok(lenient_u64(deserializer)?.and_then(|n| u32::try_from(n).ok()))
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}
