//! CLI subcommand implementations.

pub mod cart;
pub mod remote;

use std::fmt::Write;

use shopfront_core::{Cart, LineItem};

/// Render a cart as plain text, one line per row.
pub fn render(cart: &Cart) -> String {
    let mut out = String::new();

    if !cart.id.is_empty() {
        let _ = writeln!(out, "Cart {}", cart.id);
    }
    if cart.is_empty() {
        out.push_str("Cart is empty\n");
    }
    for item in &cart.items {
        let _ = writeln!(out, "{}", render_line(item));
    }
    let _ = writeln!(out, "Items: {}  Total: {}", cart.item_count, cart.total);
    out
}

fn render_line(item: &LineItem) -> String {
    let size = if item.size.name.is_empty() {
        String::new()
    } else {
        format!(" ({})", item.size.name)
    };
    // Server lines carry their own subtotal; local lines are priced here
    let amount = item.subtotal.unwrap_or_else(|| item.line_total());
    format!(
        "  {}  {}{}  {} x {} = {}",
        item.id, item.product.name, size, item.quantity, item.product.price, amount
    )
}
