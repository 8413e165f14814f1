//! Cart line items and the flat cart view model.
//!
//! Product and size data are copied into each line when it is created, so a
//! later catalog price change never rewrites what is already in the cart.

use serde::{Deserialize, Serialize};

use super::id::{CartId, LineItemId, ProductId, SizeId};
use super::price::Price;

/// Product details captured at the moment a line was created.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProductSnapshot {
    /// Product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// URL slug.
    pub slug: String,
    /// Unit price.
    pub price: Price,
    /// Primary image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Size (variant) details captured at the moment a line was created.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SizeSnapshot {
    /// Size ID.
    pub id: SizeId,
    /// Display name (e.g. "M", "42").
    pub name: String,
}

/// The identity two lines are merged on: product plus size.
pub type LineKey<'a> = (&'a ProductId, &'a SizeId);

/// One row of a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Line ID. Local lines use `"{product}-{size}"`; server lines keep the
    /// id the backend assigned.
    pub id: LineItemId,
    /// Product snapshot.
    pub product: ProductSnapshot,
    /// Size snapshot.
    pub size: SizeSnapshot,
    /// Quantity.
    pub quantity: u32,
    /// Server-computed line subtotal, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<Price>,
}

impl LineItem {
    /// Create a local line with the composite product/size id.
    #[must_use]
    pub fn new(product: ProductSnapshot, size: SizeSnapshot, quantity: u32) -> Self {
        Self {
            id: Self::compose_id(&product.id, &size.id),
            product,
            size,
            quantity,
            subtotal: None,
        }
    }

    /// The composite id used for lines that have not been confirmed by the server.
    ///
    /// `-` separates the parts and a `-` or `\` inside either id is escaped
    /// with `\`, so distinct pairs never share an id: `a-b`/`c` gives
    /// `a\-b-c` while `a`/`b-c` gives `a-b\-c`.
    #[must_use]
    pub fn compose_id(product: &ProductId, size: &SizeId) -> LineItemId {
        let mut id = String::with_capacity(product.as_str().len() + size.as_str().len() + 1);
        push_escaped(&mut id, product.as_str());
        id.push(ID_SEPARATOR);
        push_escaped(&mut id, size.as_str());
        LineItemId::new(id)
    }

    /// Merge key for this line.
    #[must_use]
    pub const fn key(&self) -> LineKey<'_> {
        (&self.product.id, &self.size.id)
    }

    /// Unit price times quantity, computed locally.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

const ID_SEPARATOR: char = '-';
const ID_ESCAPE: char = '\\';

fn push_escaped(out: &mut String, part: &str) {
    for c in part.chars() {
        if c == ID_SEPARATOR || c == ID_ESCAPE {
            out.push(ID_ESCAPE);
        }
        out.push(c);
    }
}

/// Flat, render-ready cart.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cart {
    /// Cart ID (empty for a local or absent cart).
    pub id: CartId,
    /// Lines in display order.
    pub items: Vec<LineItem>,
    /// Cart total.
    pub total: Price,
    /// Total number of units.
    pub item_count: u64,
}

impl Cart {
    /// The cart every absent payload normalizes to.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: &str, cents: i64) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            slug: format!("product-{id}"),
            price: Price::from_cents(cents),
            image: None,
        }
    }

    fn size(id: &str) -> SizeSnapshot {
        SizeSnapshot {
            id: SizeId::new(id),
            name: id.to_uppercase(),
        }
    }

    #[test]
    fn test_new_derives_composite_id() {
        let line = LineItem::new(product("7", 1000), size("m"), 2);
        assert_eq!(line.id.as_str(), "7-m");
        assert_eq!(line.subtotal, None);
    }

    #[test]
    fn test_composite_id_escapes_separator() {
        let a = LineItem::compose_id(&ProductId::new("a-b"), &SizeId::new("c"));
        let b = LineItem::compose_id(&ProductId::new("a"), &SizeId::new("b-c"));
        assert_eq!(a.as_str(), r"a\-b-c");
        assert_eq!(b.as_str(), r"a-b\-c");
        assert_ne!(a, b);

        let c = LineItem::compose_id(&ProductId::new(r"a\"), &SizeId::new("b"));
        let d = LineItem::compose_id(&ProductId::new("a"), &SizeId::new(r"\b"));
        assert_ne!(c, d);
    }

    #[test]
    fn test_key_ignores_line_id() {
        let mut a = LineItem::new(product("7", 1000), size("m"), 1);
        let b = LineItem::new(product("7", 1000), size("m"), 4);
        a.id = LineItemId::new("server-99");
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_line_total() {
        let line = LineItem::new(product("1", 1250), size("s"), 3);
        assert_eq!(line.line_total(), Price::from_cents(3750));
    }

    #[test]
    fn test_empty_cart_shape() {
        let cart = Cart::empty();
        assert!(cart.id.is_empty());
        assert!(cart.is_empty());
        assert_eq!(cart.total, Price::ZERO);
        assert_eq!(cart.item_count, 0);
    }

    #[test]
    fn test_local_line_omits_subtotal_when_serialized() {
        let line = LineItem::new(product("1", 500), size("s"), 1);
        let json = serde_json::to_value(&line).unwrap();
        assert!(json.get("subtotal").is_none());
        assert_eq!(json["product"]["price"], "5.00");
    }
}
