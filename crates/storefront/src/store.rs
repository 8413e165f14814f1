//! Local cart store.
//!
//! Holds the cart the shopper is building before checkout. Mutations are
//! synchronous and applied in call order; after each one the full line
//! sequence is written to the injected [`CartStorage`]. A failed write is
//! logged and otherwise ignored, since the in-memory cart is still correct.
//!
//! Invariants held for every reachable state:
//! - at most one line per (product id, size id)
//! - no two lines share a line id
//! - every line has quantity >= 1
//!
//! `add_item` accumulates quantity onto an existing line while
//! `update_quantity` replaces it.

use shopfront_core::{Cart, CartId, LineItem, LineItemId, Price};
use tracing::{debug, warn};

use crate::storage::CartStorage;

/// Cart state container backed by injected persistence.
#[derive(Debug)]
pub struct CartStore<S> {
    items: Vec<LineItem>,
    storage: S,
}

impl<S: CartStorage> CartStore<S> {
    /// Open the store, rehydrating whatever `storage` holds.
    ///
    /// An unreadable slot is logged and the store starts empty.
    pub fn open(storage: S) -> Self {
        let items = match storage.load() {
            Ok(Some(items)) => rehydrate(items),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to load persisted cart, starting empty");
                Vec::new()
            }
        };
        debug!(lines = items.len(), "Cart store opened");
        Self { items, storage }
    }

    /// Add a line, merging onto an existing line with the same product and size.
    ///
    /// A zero-quantity line is ignored.
    pub fn add_item(&mut self, mut item: LineItem) {
        if item.quantity == 0 {
            warn!(line = %item.id, "Ignoring add of zero-quantity line");
            return;
        }

        if let Some(existing) = self.items.iter_mut().find(|i| i.key() == item.key()) {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
            debug!(line = %existing.id, quantity = existing.quantity, "Merged cart line");
        } else {
            assign_unique_id(&self.items, &mut item);
            debug!(line = %item.id, quantity = item.quantity, "Added cart line");
            self.items.push(item);
        }
        self.persist();
    }

    /// Remove the line with `item_id`. Unknown ids are a no-op.
    pub fn remove_item(&mut self, item_id: &LineItemId) {
        let before = self.items.len();
        self.items.retain(|i| &i.id != item_id);
        if self.items.len() < before {
            debug!(line = %item_id, "Removed cart line");
        }
        self.persist();
    }

    /// Set the quantity of `item_id`; zero or less removes the line.
    pub fn update_quantity(&mut self, item_id: &LineItemId, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(item_id);
            return;
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(item) = self.items.iter_mut().find(|i| &i.id == item_id) {
            item.quantity = quantity;
            debug!(line = %item_id, quantity, "Updated cart line");
        }
        self.persist();
    }

    /// Remove every line.
    pub fn clear_cart(&mut self) {
        self.items.clear();
        debug!("Cleared cart");
        self.persist();
    }

    /// Sum of unit price times quantity over all lines.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn items_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Look up a line by id.
    #[must_use]
    pub fn get(&self, item_id: &LineItemId) -> Option<&LineItem> {
        self.items.iter().find(|i| &i.id == item_id)
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The cart as the same flat view the server cart normalizes to.
    #[must_use]
    pub fn to_cart(&self) -> Cart {
        Cart {
            id: CartId::default(),
            items: self.items.clone(),
            total: self.total(),
            item_count: self.items_count(),
        }
    }

    /// The injected storage.
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    fn persist(&self) {
        if let Err(e) = self.storage.save(&self.items) {
            warn!(error = %e, "Failed to persist cart; keeping in-memory state");
        }
    }
}

/// Restore the invariants on lines read back from storage, which may have
/// been written by something other than this store.
fn rehydrate(raw: Vec<LineItem>) -> Vec<LineItem> {
    let mut items: Vec<LineItem> = Vec::with_capacity(raw.len());
    for mut item in raw {
        if item.quantity == 0 {
            warn!(line = %item.id, "Dropping persisted zero-quantity line");
            continue;
        }
        if let Some(existing) = items.iter_mut().find(|i| i.key() == item.key()) {
            warn!(line = %item.id, "Merging duplicate persisted line");
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            assign_unique_id(&items, &mut item);
            items.push(item);
        }
    }
    items
}

/// Make sure `item` does not reuse the id of a line already in `items`.
///
/// A taken id is replaced by the composite id, and if that is taken too, by
/// the composite id with a `#n` suffix.
fn assign_unique_id(items: &[LineItem], item: &mut LineItem) {
    let taken = |id: &LineItemId| items.iter().any(|i| &i.id == id);
    if !taken(&item.id) {
        return;
    }

    let base = LineItem::compose_id(&item.product.id, &item.size.id);
    let mut candidate = base.clone();
    let mut suffix: u64 = 1;
    while taken(&candidate) {
        suffix += 1;
        candidate = LineItemId::new(format!("{base}#{suffix}"));
    }
    warn!(line = %item.id, reassigned = %candidate, "Line id already in use, reassigning");
    item.id = candidate;
}
