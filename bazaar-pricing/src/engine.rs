use crate::policy::PricingPolicy;
use bazaar_core::Cents;
use serde::{Deserialize, Serialize};

/// The four derived amounts shown on the order summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceBreakdown {
    pub shipping: Cents,
    pub discount: Cents,
    pub tax: Cents,
    pub total: Cents,
}

/// Pure price computation. All flow-specific rules come in through the
/// policy; the engine itself holds no state.
pub struct PricingEngine;

impl PricingEngine {
    /// Derive shipping, tax, discount and total for one summary render.
    ///
    /// `option_fee` is the fee of the shipping option in force;
    /// `coupon_discount` is the accepted coupon's flat amount, or 0.
    pub fn quote(
        subtotal: Cents,
        option_fee: Cents,
        coupon_discount: Cents,
        policy: &PricingPolicy,
    ) -> PriceBreakdown {
        let shipping = if subtotal > policy.free_shipping_threshold_cents {
            0
        } else {
            option_fee
        };

        let tax = match policy.tax_rate {
            Some(rate) => (subtotal as f64 * rate).round() as Cents,
            None => 0,
        };

        let discount = coupon_discount.max(0);

        // Defensive clamp: a large coupon must never produce a
        // negative amount due.
        let total = (subtotal + shipping + tax - discount).max(0);

        PriceBreakdown {
            shipping,
            discount,
            tax,
            total,
        }
    }
}
