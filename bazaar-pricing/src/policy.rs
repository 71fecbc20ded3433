use bazaar_core::Cents;
use serde::{Deserialize, Serialize};

/// Which flow a pricing policy belongs to. The cart page and the
/// checkout page historically carried separate, inconsistent rule
/// tables; both now live behind the same engine, keyed by this tag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FlowContext {
    CartPage,
    Checkout,
}

/// One valid coupon code and the flat amount it takes off the total.
///
/// `min_subtotal` exists so a minimum-spend rule is a policy decision
/// and not an implicit branch; the default tables leave it unset, so
/// acceptance is not gated by subtotal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CouponRule {
    pub code: String,
    pub discount_cents: Cents,
    pub min_subtotal: Option<Cents>,
}

impl CouponRule {
    pub fn flat(code: &str, discount_cents: Cents) -> Self {
        Self {
            code: code.to_string(),
            discount_cents,
            min_subtotal: None,
        }
    }
}

/// The pricing rules governing one flow: free-shipping threshold,
/// explicit tax rate, and the coupon table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingPolicy {
    pub flow: FlowContext,
    /// Subtotals strictly above this ship free.
    pub free_shipping_threshold_cents: Cents,
    /// Flat percentage of the subtotal; `None` means no tax line.
    pub tax_rate: Option<f64>,
    pub coupons: Vec<CouponRule>,
}

impl PricingPolicy {
    /// The default table for a flow.
    pub fn for_flow(flow: FlowContext) -> Self {
        match flow {
            FlowContext::CartPage => Self {
                flow,
                free_shipping_threshold_cents: 50_00,
                tax_rate: None,
                coupons: vec![CouponRule::flat("SAVE10", 10_00)],
            },
            FlowContext::Checkout => Self {
                flow,
                free_shipping_threshold_cents: 100_00,
                tax_rate: Some(0.05),
                coupons: vec![
                    CouponRule::flat("WELCOME15", 15_00),
                    CouponRule::flat("SAVE10", 10_00),
                ],
            },
        }
    }

    /// Checkout policy with thresholds taken from configuration.
    pub fn checkout_with_rules(rules: &bazaar_core::app_config::BusinessRules) -> Self {
        let mut policy = Self::for_flow(FlowContext::Checkout);
        policy.free_shipping_threshold_cents = rules.free_shipping_threshold_cents;
        policy.tax_rate = rules.tax_rate;
        policy
    }
}
