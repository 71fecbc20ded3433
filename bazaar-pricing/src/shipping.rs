use bazaar_core::Cents;
use serde::{Deserialize, Serialize};

/// The fixed delivery choices. Exactly one is selected at a time;
/// the checkout form pre-selects `Standard`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShippingOption {
    Express,
    Standard,
    Economy,
}

impl ShippingOption {
    /// Flat fee charged when the subtotal does not reach the
    /// free-shipping threshold.
    pub fn fee_cents(&self) -> Cents {
        match self {
            ShippingOption::Express => 15_00,
            ShippingOption::Standard => 5_00,
            ShippingOption::Economy => 2_00,
        }
    }

    pub fn delivery_label(&self) -> &'static str {
        match self {
            ShippingOption::Express => "1-2 business days",
            ShippingOption::Standard => "3-5 business days",
            ShippingOption::Economy => "7-10 business days",
        }
    }
}

impl Default for ShippingOption {
    fn default() -> Self {
        ShippingOption::Standard
    }
}
