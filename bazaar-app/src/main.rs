use bazaar_cart::{CartStore, ProductSnapshot};
use bazaar_checkout::{CheckoutSession, MockOrderGateway, OrderSubmissionCoordinator, ShippingForm};
use bazaar_core::gateway::PaymentMethod;
use bazaar_core::identity::StaticAuthGate;
use bazaar_pricing::{PricingPolicy, PromoCodeValidator, ShippingOption};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bazaar_app=debug,bazaar_checkout=debug,bazaar_cart=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = bazaar_core::app_config::Config::load().expect("Failed to load config");
    let policy = PricingPolicy::checkout_with_rules(&config.business_rules);
    tracing::info!(
        threshold = policy.free_shipping_threshold_cents,
        tax_rate = ?policy.tax_rate,
        "pricing policy loaded"
    );

    // A scripted session against the in-memory gateway: browse, fill
    // the cart, walk the three checkout steps, place the order.
    let mut cart = CartStore::new();
    cart.add_item(
        ProductSnapshot {
            id: 101,
            name: "Jamdani Scarf".to_string(),
            price_cents: 45_00,
            image: "/images/jamdani-scarf.png".to_string(),
            category: "clothing".to_string(),
        },
        1,
    );
    cart.add_item(
        ProductSnapshot {
            id: 204,
            name: "Clay Teapot".to_string(),
            price_cents: 30_00,
            image: "/images/clay-teapot.png".to_string(),
            category: "kitchen".to_string(),
        },
        2,
    );
    tracing::info!(lines = cart.len(), subtotal = cart.subtotal(), "cart ready");

    let auth = StaticAuthGate::new(true);
    let mut session =
        CheckoutSession::begin(&auth, &cart, policy).expect("checkout entry refused");

    let form = ShippingForm {
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        email: "jane@example.com".to_string(),
        phone: "01712345678".to_string(),
        address: "123 Street".to_string(),
        city: "Dhaka".to_string(),
        zip: "1212".to_string(),
    };
    session
        .submit_shipping(&form, ShippingOption::Standard)
        .expect("shipping form rejected");

    let coupon = {
        let validator = PromoCodeValidator::new(session.policy());
        validator.validate("save10", cart.subtotal())
    };
    match coupon {
        Ok(state) => {
            tracing::info!(code = %state.code, discount = state.discount_cents, "coupon applied");
            session.apply_coupon(state).expect("coupon already applied");
        }
        Err(err) => tracing::warn!(error = %err, "coupon rejected"),
    }

    session
        .submit_payment(PaymentMethod::default_selection(), None)
        .expect("payment step rejected");

    let quote = session.quote(&cart);
    tracing::info!(
        shipping = quote.shipping,
        tax = quote.tax,
        discount = quote.discount,
        total = quote.total,
        "order summary"
    );

    let gateway = Arc::new(MockOrderGateway::new());
    let coordinator = OrderSubmissionCoordinator::with_timeout(
        gateway,
        Duration::from_secs(config.submission.phase_timeout_seconds),
    );

    match session.place_order(&mut cart, &coordinator).await {
        Ok(confirmation) => {
            tracing::info!(order_id = %confirmation.order_id, "order placed");
        }
        Err(err) => {
            tracing::error!(error = %err, "order submission failed; cart left intact");
        }
    }
}
