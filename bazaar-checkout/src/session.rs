use crate::coordinator::{OrderSubmissionCoordinator, SubmissionError};
use crate::forms::{CardDetails, FieldError, ShippingDetails, ShippingForm};
use bazaar_cart::CartStore;
use bazaar_core::gateway::{OrderConfirmation, PaymentMethod};
use bazaar_core::identity::AuthGate;
use bazaar_pricing::{CouponState, PriceBreakdown, PricingEngine, PricingPolicy, ShippingOption};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Where the checkout flow currently stands. Each step carries exactly
/// the data captured so far; there is no shared half-filled structure
/// behind conditional rendering.
#[derive(Debug, Clone)]
pub enum CheckoutStep {
    Shipping,
    Payment {
        shipping: ShippingDetails,
        option: ShippingOption,
    },
    Review {
        shipping: ShippingDetails,
        option: ShippingOption,
        method: PaymentMethod,
        card: Option<CardDetails>,
    },
    Submitted {
        confirmation: OrderConfirmation,
    },
}

impl CheckoutStep {
    pub fn name(&self) -> &'static str {
        match self {
            CheckoutStep::Shipping => "shipping",
            CheckoutStep::Payment { .. } => "payment",
            CheckoutStep::Review { .. } => "review",
            CheckoutStep::Submitted { .. } => "submitted",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("Sign in to continue to checkout")]
    NotAuthenticated,

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Cannot {action} from the {step} step")]
    InvalidTransition {
        step: &'static str,
        action: &'static str,
    },

    #[error("Shipping form has {} invalid field(s)", .0.len())]
    InvalidForm(Vec<FieldError>),

    #[error("Shipping details are missing")]
    MissingPrerequisite,

    #[error("A promo code is already applied")]
    CouponAlreadyApplied,

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

/// One checkout attempt: Shipping → Payment → Review → Submitted.
/// Lives in memory only; navigation away discards it, and nothing is
/// persisted across a reload (the cart itself is a separate store).
pub struct CheckoutSession {
    pub id: Uuid,
    step: CheckoutStep,
    coupon: Option<CouponState>,
    policy: PricingPolicy,
    pub started_at: DateTime<Utc>,
}

impl CheckoutSession {
    /// Entry gate. Unauthenticated users and empty carts never reach
    /// the state machine.
    pub fn begin(
        auth: &dyn AuthGate,
        cart: &CartStore,
        policy: PricingPolicy,
    ) -> Result<Self, CheckoutError> {
        if !auth.is_authenticated() {
            return Err(CheckoutError::NotAuthenticated);
        }
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let session = Self {
            id: Uuid::new_v4(),
            step: CheckoutStep::Shipping,
            coupon: None,
            policy,
            started_at: Utc::now(),
        };
        tracing::info!(session_id = %session.id, lines = cart.len(), "checkout started");
        Ok(session)
    }

    pub fn step(&self) -> &CheckoutStep {
        &self.step
    }

    #[cfg(test)]
    fn force_step(&mut self, step: CheckoutStep) {
        self.step = step;
    }

    pub fn coupon(&self) -> Option<&CouponState> {
        self.coupon.as_ref()
    }

    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    /// Shipping → Payment, gated on form validity. Captures the
    /// address snapshot and the currently selected shipping option;
    /// re-running after a Back replaces both.
    pub fn submit_shipping(
        &mut self,
        form: &ShippingForm,
        option: ShippingOption,
    ) -> Result<(), CheckoutError> {
        if !matches!(self.step, CheckoutStep::Shipping) {
            return Err(CheckoutError::InvalidTransition {
                step: self.step.name(),
                action: "submit shipping",
            });
        }
        let shipping = form.validate().map_err(CheckoutError::InvalidForm)?;
        tracing::debug!(session_id = %self.id, ?option, "shipping step completed");
        self.step = CheckoutStep::Payment { shipping, option };
        Ok(())
    }

    /// Payment → Review. A payment method is always pre-selected, so
    /// the only guard is being on the payment step. Card sub-fields
    /// are carried along unvalidated; the provider checks them
    /// server-side.
    pub fn submit_payment(
        &mut self,
        method: PaymentMethod,
        card: Option<CardDetails>,
    ) -> Result<(), CheckoutError> {
        let CheckoutStep::Payment { shipping, option } = &self.step else {
            return Err(CheckoutError::InvalidTransition {
                step: self.step.name(),
                action: "submit payment",
            });
        };
        let next = CheckoutStep::Review {
            shipping: shipping.clone(),
            option: *option,
            method,
            card,
        };
        self.step = next;
        Ok(())
    }

    /// Unconditional single-step regression. Returns `false` at the
    /// shipping step, where Back means leaving checkout entirely.
    /// Captured snapshots survive until the step is re-submitted.
    pub fn back(&mut self) -> bool {
        match &self.step {
            CheckoutStep::Shipping | CheckoutStep::Submitted { .. } => false,
            CheckoutStep::Payment { .. } => {
                self.step = CheckoutStep::Shipping;
                true
            }
            CheckoutStep::Review {
                shipping, option, ..
            } => {
                let previous = CheckoutStep::Payment {
                    shipping: shipping.clone(),
                    option: *option,
                };
                self.step = previous;
                true
            }
        }
    }

    /// Record the session's single coupon. Re-validation while one is
    /// accepted is prevented here as well as by the disabled input.
    pub fn apply_coupon(&mut self, state: CouponState) -> Result<(), CheckoutError> {
        if self.coupon.as_ref().is_some_and(|c| c.accepted) {
            return Err(CheckoutError::CouponAlreadyApplied);
        }
        self.coupon = Some(state);
        Ok(())
    }

    /// Price the order summary for the current step. Before a shipping
    /// option is captured the pre-selected default is assumed.
    pub fn quote(&self, cart: &CartStore) -> PriceBreakdown {
        let option = match &self.step {
            CheckoutStep::Payment { option, .. } | CheckoutStep::Review { option, .. } => *option,
            _ => ShippingOption::default(),
        };
        let discount = self
            .coupon
            .as_ref()
            .filter(|c| c.accepted)
            .map_or(0, |c| c.discount_cents);
        PricingEngine::quote(cart.subtotal(), option.fee_cents(), discount, &self.policy)
    }

    /// Review → Submitted via the three-phase commit. On failure the
    /// session stays at Review with the cart untouched and the user
    /// may retry; on success the cart is cleared and the session ends.
    pub async fn place_order(
        &mut self,
        cart: &mut CartStore,
        coordinator: &OrderSubmissionCoordinator,
    ) -> Result<OrderConfirmation, CheckoutError> {
        let CheckoutStep::Review {
            shipping, method, ..
        } = &self.step
        else {
            return Err(CheckoutError::InvalidTransition {
                step: self.step.name(),
                action: "place order",
            });
        };

        // Defensive double-check, intentionally redundant with the sum
        // type: never dispatch without a usable shipping snapshot.
        if shipping.first_name.is_empty() || shipping.address.is_empty() {
            return Err(CheckoutError::MissingPrerequisite);
        }
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let confirmation = coordinator.submit(cart.items(), shipping, *method).await?;

        cart.clear();
        self.step = CheckoutStep::Submitted {
            confirmation: confirmation.clone(),
        };
        tracing::info!(session_id = %self.id, order_id = %confirmation.order_id, "checkout completed");
        Ok(confirmation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_cart::ProductSnapshot;
    use bazaar_core::identity::StaticAuthGate;
    use bazaar_pricing::FlowContext;

    fn cart_with_one_line() -> CartStore {
        let mut cart = CartStore::new();
        cart.add_item(
            ProductSnapshot {
                id: 1,
                name: "Clay Teapot".to_string(),
                price_cents: 100_00,
                image: "/images/teapot.png".to_string(),
                category: "kitchen".to_string(),
            },
            2,
        );
        cart
    }

    fn valid_form() -> ShippingForm {
        ShippingForm {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: "01712345678".to_string(),
            address: "123 Street".to_string(),
            city: "Dhaka".to_string(),
            zip: "1212".to_string(),
        }
    }

    fn session() -> CheckoutSession {
        CheckoutSession::begin(
            &StaticAuthGate::new(true),
            &cart_with_one_line(),
            PricingPolicy::for_flow(FlowContext::Checkout),
        )
        .unwrap()
    }

    #[test]
    fn unauthenticated_users_never_reach_the_machine() {
        let result = CheckoutSession::begin(
            &StaticAuthGate::new(false),
            &cart_with_one_line(),
            PricingPolicy::for_flow(FlowContext::Checkout),
        );
        assert!(matches!(result, Err(CheckoutError::NotAuthenticated)));
    }

    #[test]
    fn empty_cart_cannot_enter_checkout() {
        let result = CheckoutSession::begin(
            &StaticAuthGate::new(true),
            &CartStore::new(),
            PricingPolicy::for_flow(FlowContext::Checkout),
        );
        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
    }

    #[test]
    fn missing_zip_keeps_the_step_at_shipping() {
        let mut session = session();
        let mut form = valid_form();
        form.zip = String::new();

        let err = session.submit_shipping(&form, ShippingOption::Standard).unwrap_err();
        let CheckoutError::InvalidForm(errors) = err else {
            panic!("expected a form error");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, crate::forms::Field::Zip);
        assert_eq!(session.step().name(), "shipping");
    }

    #[test]
    fn happy_path_walks_shipping_payment_review() {
        let mut session = session();
        session
            .submit_shipping(&valid_form(), ShippingOption::Express)
            .unwrap();
        assert_eq!(session.step().name(), "payment");

        session
            .submit_payment(PaymentMethod::default_selection(), None)
            .unwrap();
        assert_eq!(session.step().name(), "review");
    }

    #[test]
    fn back_regresses_one_step_without_guards() {
        let mut session = session();
        session
            .submit_shipping(&valid_form(), ShippingOption::Standard)
            .unwrap();
        session.submit_payment(PaymentMethod::Card, None).unwrap();

        assert!(session.back());
        assert_eq!(session.step().name(), "payment");
        assert!(session.back());
        assert_eq!(session.step().name(), "shipping");
        assert!(!session.back(), "back at shipping means leaving checkout");
    }

    #[test]
    fn resubmitting_shipping_replaces_the_snapshot() {
        let mut session = session();
        session
            .submit_shipping(&valid_form(), ShippingOption::Standard)
            .unwrap();
        assert!(session.back());

        let mut form = valid_form();
        form.city = "Chattogram".to_string();
        form.zip = "4000".to_string();
        session.submit_shipping(&form, ShippingOption::Economy).unwrap();

        let CheckoutStep::Payment { shipping, option } = session.step() else {
            panic!("expected payment step");
        };
        assert_eq!(shipping.city, "Chattogram");
        assert_eq!(*option, ShippingOption::Economy);
    }

    #[test]
    fn second_coupon_is_refused_while_one_is_accepted() {
        let mut session = session();
        session
            .apply_coupon(CouponState {
                code: "SAVE10".to_string(),
                accepted: true,
                discount_cents: 10_00,
            })
            .unwrap();

        let err = session
            .apply_coupon(CouponState {
                code: "WELCOME15".to_string(),
                accepted: true,
                discount_cents: 15_00,
            })
            .unwrap_err();
        assert!(matches!(err, CheckoutError::CouponAlreadyApplied));
    }

    #[test]
    fn quote_uses_captured_option_and_coupon() {
        let mut session = CheckoutSession::begin(
            &StaticAuthGate::new(true),
            &cart_with_one_line(),
            PricingPolicy {
                free_shipping_threshold_cents: 500_00,
                tax_rate: None,
                ..PricingPolicy::for_flow(FlowContext::Checkout)
            },
        )
        .unwrap();
        let cart = cart_with_one_line();

        session
            .submit_shipping(&valid_form(), ShippingOption::Express)
            .unwrap();
        session
            .apply_coupon(CouponState {
                code: "SAVE10".to_string(),
                accepted: true,
                discount_cents: 10_00,
            })
            .unwrap();

        let quote = session.quote(&cart);
        assert_eq!(quote.shipping, ShippingOption::Express.fee_cents());
        assert_eq!(quote.discount, 10_00);
        assert_eq!(quote.total, 200_00 + 15_00 - 10_00);
    }

    #[tokio::test]
    async fn degenerate_shipping_snapshot_trips_the_defensive_check() {
        let mut session = session();
        let mut cart = cart_with_one_line();
        session.force_step(CheckoutStep::Review {
            shipping: ShippingDetails {
                first_name: String::new(),
                last_name: String::new(),
                email: String::new(),
                phone: String::new(),
                address: String::new(),
                city: String::new(),
                zip: String::new(),
            },
            option: ShippingOption::Standard,
            method: PaymentMethod::Card,
            card: None,
        });
        let coordinator = OrderSubmissionCoordinator::new(std::sync::Arc::new(
            crate::coordinator::MockOrderGateway::new(),
        ));

        let err = session.place_order(&mut cart, &coordinator).await.unwrap_err();
        assert!(matches!(err, CheckoutError::MissingPrerequisite));
        assert_eq!(cart.len(), 1);
    }

    #[tokio::test]
    async fn place_order_is_review_only() {
        let mut session = session();
        let mut cart = cart_with_one_line();
        let coordinator = OrderSubmissionCoordinator::new(std::sync::Arc::new(
            crate::coordinator::MockOrderGateway::new(),
        ));

        let err = session.place_order(&mut cart, &coordinator).await.unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidTransition { .. }));
        assert_eq!(session.step().name(), "shipping");
    }
}
