use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payment methods the order backend accepts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    CashOnDelivery,
    MobileWallet,
}

impl PaymentMethod {
    /// The storefront pre-selects this before the payment step renders.
    pub fn default_selection() -> Self {
        PaymentMethod::CashOnDelivery
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::CashOnDelivery => "cash_on_delivery",
            PaymentMethod::MobileWallet => "mobile_wallet",
        }
    }
}

/// One cart line as the remote service sees it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteCartEntry {
    pub product_id: u64,
    pub quantity: u32,
}

/// Boundary value passed to the order backend. The client does not
/// model the resulting order beyond the confirmation below.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateOrderRequest {
    pub shipping_address: String,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub order_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl OrderConfirmation {
    pub fn new() -> Self {
        Self {
            order_id: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }
}

impl Default for OrderConfirmation {
    fn default() -> Self {
        Self::new()
    }
}

/// Failures reported by the order backend. Server-provided text is
/// surfaced verbatim; `Unavailable` carries the generic fallback for
/// responses without a message.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("{0}")]
    Remote(String),

    #[error("Something went wrong. Please try again.")]
    Unavailable,
}

impl GatewayError {
    /// Wrap an optional server message, falling back to the generic text.
    pub fn from_remote(message: Option<String>) -> Self {
        match message {
            Some(msg) if !msg.trim().is_empty() => GatewayError::Remote(msg),
            _ => GatewayError::Unavailable,
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// The three operations the order backend exposes. Session credentials
/// are carried implicitly by the implementation.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Remove every remote cart entry for the authenticated session.
    async fn clear_cart(&self) -> GatewayResult<()>;

    /// Append one entry to the remote cart.
    async fn push_item(&self, entry: RemoteCartEntry) -> GatewayResult<()>;

    /// Create the order from whatever the remote cart currently holds.
    async fn create_order(&self, request: CreateOrderRequest) -> GatewayResult<OrderConfirmation>;
}
