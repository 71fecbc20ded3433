use bazaar_core::Cents;
use serde::{Deserialize, Serialize};

/// Product details frozen at add-to-cart time. Later catalog price
/// changes do not reach lines already in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductSnapshot {
    pub id: u64,
    pub name: String,
    pub price_cents: Cents,
    pub image: String,
    pub category: String,
}

/// One product entry in the cart. `quantity` is never zero; removal
/// deletes the line instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LineItem {
    pub product: ProductSnapshot,
    pub quantity: u32,
}

impl LineItem {
    pub fn new(product: ProductSnapshot, quantity: u32) -> Self {
        Self {
            product,
            quantity: quantity.max(1),
        }
    }

    /// Snapshot price times quantity.
    pub fn line_total(&self) -> Cents {
        self.product.price_cents * Cents::from(self.quantity)
    }
}
