use crate::models::{LineItem, ProductSnapshot};
use bazaar_core::Cents;

/// Owns the cart line items. Lines keep insertion order because order
/// submission replicates them to the remote cart in that order.
#[derive(Debug, Default, Clone)]
pub struct CartStore {
    lines: Vec<LineItem>,
}

impl CartStore {
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add a product to the cart. An existing line for the same product
    /// id absorbs the quantity; otherwise a new line is appended.
    pub fn add_item(&mut self, product: ProductSnapshot, quantity: u32) {
        let quantity = quantity.max(1);
        if let Some(line) = self.lines.iter_mut().find(|l| l.product.id == product.id) {
            line.quantity += quantity;
            tracing::debug!(product_id = product.id, quantity = line.quantity, "merged cart line");
        } else {
            tracing::debug!(product_id = product.id, quantity, "added cart line");
            self.lines.push(LineItem::new(product, quantity));
        }
    }

    /// Set a line's quantity, clamped to a minimum of 1. Deleting a
    /// line is `remove_item`'s job, never a zero quantity here.
    pub fn update_quantity(&mut self, product_id: u64, quantity: u32) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product.id == product_id) {
            line.quantity = quantity.max(1);
        }
    }

    /// Delete the matching line. No-op when the product is not in the cart.
    pub fn remove_item(&mut self, product_id: u64) {
        self.lines.retain(|l| l.product.id != product_id);
    }

    /// Exact integer sum of snapshot price times quantity over all lines.
    pub fn subtotal(&self) -> Cents {
        self.lines.iter().map(LineItem::line_total).sum()
    }

    /// Total units across all lines, for the cart badge.
    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Lines in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Empty the cart. Called only after a confirmed successful order.
    pub fn clear(&mut self) {
        tracing::info!(lines = self.lines.len(), "clearing cart");
        self.lines.clear();
    }
}
