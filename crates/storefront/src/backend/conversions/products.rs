//! Catalog product conversion.

use shopfront_core::{LineItem, Price, ProductId, ProductSnapshot, SizeId, SizeSnapshot};

use crate::backend::payload::{ServerProduct, ServerSizeDetail};

/// A catalog product with the sizes it can be ordered in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogProduct {
    /// Snapshot copied into cart lines.
    pub snapshot: ProductSnapshot,
    /// Orderable sizes.
    pub sizes: Vec<SizeSnapshot>,
}

impl CatalogProduct {
    /// Find a size by id, or by name ignoring case.
    #[must_use]
    pub fn size(&self, id_or_name: &str) -> Option<&SizeSnapshot> {
        self.sizes
            .iter()
            .find(|s| s.id.as_str() == id_or_name)
            .or_else(|| {
                self.sizes
                    .iter()
                    .find(|s| s.name.eq_ignore_ascii_case(id_or_name))
            })
    }

    /// A local cart line for this product in `size`.
    #[must_use]
    pub fn line_item(&self, size: &SizeSnapshot, quantity: u32) -> LineItem {
        LineItem::new(self.snapshot.clone(), size.clone(), quantity)
    }
}

/// Convert a catalog product, defaulting every missing field.
#[must_use]
pub fn normalize_product(raw: ServerProduct) -> CatalogProduct {
    CatalogProduct {
        snapshot: ProductSnapshot {
            id: ProductId::from(raw.id.unwrap_or_default()),
            name: raw.name.unwrap_or_default(),
            slug: raw.slug.unwrap_or_default(),
            price: raw.price.map_or(Price::ZERO, Price::new),
            image: raw.image,
        },
        sizes: raw
            .sizes
            .unwrap_or_default()
            .into_iter()
            .map(convert_size)
            .collect(),
    }
}

fn convert_size(raw: ServerSizeDetail) -> SizeSnapshot {
    SizeSnapshot {
        id: SizeId::from(raw.id.unwrap_or_default()),
        name: raw.name.unwrap_or_default(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn product() -> CatalogProduct {
        let raw: ServerProduct = serde_json::from_value(json!({
            "id": 7,
            "name": "Linen Shirt",
            "slug": "linen-shirt",
            "price": "45.00",
            "sizes": [{ "id": 1, "name": "S" }, { "id": 2, "name": "M" }]
        }))
        .unwrap();
        normalize_product(raw)
    }

    #[test]
    fn test_normalize_product() {
        let product = product();
        assert_eq!(product.snapshot.id.as_str(), "7");
        assert_eq!(product.snapshot.price, Price::from_cents(4500));
        assert_eq!(product.snapshot.image, None);
        assert_eq!(product.sizes.len(), 2);
    }

    #[test]
    fn test_size_lookup_by_id_or_name() {
        let product = product();
        assert_eq!(product.size("2").unwrap().name, "M");
        assert_eq!(product.size("s").unwrap().id.as_str(), "1");
        assert!(product.size("XL").is_none());
    }

    #[test]
    fn test_line_item_uses_composite_id() {
        let product = product();
        let size = product.size("M").unwrap();
        let line = product.line_item(size, 2);
        assert_eq!(line.id.as_str(), "7-2");
        assert_eq!(line.quantity, 2);
    }

    #[test]
    fn test_empty_product() {
        let product = normalize_product(ServerProduct::default());
        assert!(product.snapshot.id.is_empty());
        assert!(product.sizes.is_empty());
    }
}
