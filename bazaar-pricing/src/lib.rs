pub mod engine;
pub mod policy;
pub mod promo;
pub mod shipping;

pub use engine::{PriceBreakdown, PricingEngine};
pub use policy::{CouponRule, FlowContext, PricingPolicy};
pub use promo::{CouponState, PromoCodeValidator, PromoRejected};
pub use shipping::ShippingOption;
