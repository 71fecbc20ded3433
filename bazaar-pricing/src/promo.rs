use crate::policy::PricingPolicy;
use bazaar_core::Cents;
use serde::{Deserialize, Serialize};

/// Outcome of a successful coupon validation, held by the checkout
/// session. At most one per session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CouponState {
    pub code: String,
    pub accepted: bool,
    pub discount_cents: Cents,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum PromoRejected {
    #[error("Invalid promo code")]
    UnknownCode,

    #[error("This code requires a minimum order amount")]
    BelowMinimum,
}

/// Stateless coupon lookup against a policy's table. The validator
/// keeps no memory of prior calls; the UI disables re-entry while a
/// coupon is already accepted.
pub struct PromoCodeValidator<'a> {
    policy: &'a PricingPolicy,
}

impl<'a> PromoCodeValidator<'a> {
    pub fn new(policy: &'a PricingPolicy) -> Self {
        Self { policy }
    }

    /// Case-insensitive exact match against the table. Rules without a
    /// `min_subtotal` accept regardless of the subtotal value.
    pub fn validate(&self, code: &str, subtotal: Cents) -> Result<CouponState, PromoRejected> {
        let trimmed = code.trim();
        let rule = self
            .policy
            .coupons
            .iter()
            .find(|r| r.code.eq_ignore_ascii_case(trimmed))
            .ok_or(PromoRejected::UnknownCode)?;

        if let Some(min) = rule.min_subtotal {
            if subtotal < min {
                return Err(PromoRejected::BelowMinimum);
            }
        }

        tracing::debug!(code = %rule.code, discount = rule.discount_cents, "coupon accepted");
        Ok(CouponState {
            code: rule.code.clone(),
            accepted: true,
            discount_cents: rule.discount_cents,
        })
    }
}
