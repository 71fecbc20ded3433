use crate::forms::ShippingDetails;
use bazaar_cart::LineItem;
use bazaar_core::gateway::{
    CreateOrderRequest, GatewayError, GatewayResult, OrderConfirmation, OrderGateway,
    PaymentMethod, RemoteCartEntry,
};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::Mutex;

/// One of the three sequential remote calls in order submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    ClearRemoteCart,
    ReplicateItems,
    CreateOrder,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::ClearRemoteCart => "clear-remote-cart",
            Phase::ReplicateItems => "replicate-items",
            Phase::CreateOrder => "create-order",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("Order submission failed at {phase}: {source}")]
    Phase {
        phase: Phase,
        #[source]
        source: GatewayError,
    },

    #[error("Order submission timed out at {0}")]
    Timeout(Phase),

    #[error("An order submission is already in progress")]
    AlreadyInFlight,
}

impl SubmissionError {
    pub fn phase(&self) -> Phase {
        match self {
            SubmissionError::Phase { phase, .. } | SubmissionError::Timeout(phase) => *phase,
            SubmissionError::AlreadyInFlight => Phase::ClearRemoteCart,
        }
    }
}

/// Drives the three-phase remote commit: clear the remote cart,
/// replicate the local lines, create the order. The phases are not one
/// transaction; a failure in phase 2 or 3 triggers a best-effort
/// compensating re-clear so no orphaned items survive server-side.
pub struct OrderSubmissionCoordinator {
    gateway: Arc<dyn OrderGateway>,
    phase_timeout: Duration,
    // Real lock, not a disabled button: rapid repeated clicks must not
    // create duplicate orders.
    in_flight: Mutex<()>,
}

impl OrderSubmissionCoordinator {
    pub fn new(gateway: Arc<dyn OrderGateway>) -> Self {
        Self::with_timeout(gateway, Duration::from_secs(10))
    }

    pub fn with_timeout(gateway: Arc<dyn OrderGateway>, phase_timeout: Duration) -> Self {
        Self {
            gateway,
            phase_timeout,
            in_flight: Mutex::new(()),
        }
    }

    /// Execute the commit. Each phase is awaited to completion before
    /// the next begins; the first failure ends the run. The caller's
    /// local cart is never touched here.
    pub async fn submit(
        &self,
        items: &[LineItem],
        shipping: &ShippingDetails,
        payment_method: PaymentMethod,
    ) -> Result<OrderConfirmation, SubmissionError> {
        let _guard = self
            .in_flight
            .try_lock()
            .map_err(|_| SubmissionError::AlreadyInFlight)?;

        self.run_phase(Phase::ClearRemoteCart, self.gateway.clear_cart())
            .await?;

        for line in items {
            let entry = RemoteCartEntry {
                product_id: line.product.id,
                quantity: line.quantity,
            };
            if let Err(err) = self.run_phase(Phase::ReplicateItems, self.gateway.push_item(entry)).await {
                self.compensate(Phase::ReplicateItems).await;
                return Err(err);
            }
        }

        let request = CreateOrderRequest {
            shipping_address: shipping.formatted_address(),
            payment_method,
        };
        match self.run_phase(Phase::CreateOrder, self.gateway.create_order(request)).await {
            Ok(confirmation) => {
                tracing::info!(order_id = %confirmation.order_id, "order submitted");
                Ok(confirmation)
            }
            Err(err) => {
                self.compensate(Phase::CreateOrder).await;
                Err(err)
            }
        }
    }

    async fn run_phase<T>(
        &self,
        phase: Phase,
        call: impl Future<Output = GatewayResult<T>>,
    ) -> Result<T, SubmissionError> {
        match tokio::time::timeout(self.phase_timeout, call).await {
            Ok(Ok(value)) => {
                tracing::debug!(%phase, "phase completed");
                Ok(value)
            }
            Ok(Err(source)) => {
                tracing::error!(%phase, error = %source, "phase failed");
                Err(SubmissionError::Phase { phase, source })
            }
            Err(_) => {
                tracing::error!(%phase, timeout = ?self.phase_timeout, "phase timed out");
                Err(SubmissionError::Timeout(phase))
            }
        }
    }

    /// Compensating action for a failed phase 2 or 3: re-clear the
    /// remote cart so already-pushed items do not linger with no order
    /// behind them. Best effort; its own failure must not mask the
    /// phase error.
    async fn compensate(&self, failed: Phase) {
        match tokio::time::timeout(self.phase_timeout, self.gateway.clear_cart()).await {
            Ok(Ok(())) => {
                tracing::info!(%failed, "compensating re-clear of remote cart succeeded")
            }
            Ok(Err(err)) => {
                tracing::warn!(%failed, error = %err, "compensating re-clear failed; remote cart may hold orphaned items")
            }
            Err(_) => {
                tracing::warn!(%failed, "compensating re-clear timed out; remote cart may hold orphaned items")
            }
        }
    }
}

/// A recorded gateway invocation, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    ClearCart,
    PushItem(RemoteCartEntry),
    CreateOrder(CreateOrderRequest),
}

/// Scripted failure injection for [`MockOrderGateway`].
#[derive(Debug, Default)]
pub struct FailurePlan {
    pub fail_clear: Option<GatewayError>,
    /// Fail the nth push (0-based), counting across the whole run.
    pub fail_push_at: Option<(usize, GatewayError)>,
    pub fail_create: Option<GatewayError>,
    /// Never complete this phase, for timeout tests.
    pub stall: Option<Phase>,
}

/// In-memory stand-in for the remote order service. Records every call
/// and keeps a model of the remote cart so tests can assert on what
/// the server would be left holding.
#[derive(Default)]
pub struct MockOrderGateway {
    plan: FailurePlan,
    calls: StdMutex<Vec<GatewayCall>>,
    remote_cart: StdMutex<Vec<RemoteCartEntry>>,
    orders: StdMutex<Vec<CreateOrderRequest>>,
    push_count: AtomicUsize,
}

impl MockOrderGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plan(plan: FailurePlan) -> Self {
        Self {
            plan,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().expect("mock calls lock").clone()
    }

    pub fn remote_cart(&self) -> Vec<RemoteCartEntry> {
        self.remote_cart.lock().expect("mock cart lock").clone()
    }

    pub fn orders(&self) -> Vec<CreateOrderRequest> {
        self.orders.lock().expect("mock orders lock").clone()
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().expect("mock calls lock").push(call);
    }

    async fn maybe_stall(&self, phase: Phase) {
        if self.plan.stall == Some(phase) {
            tokio::time::sleep(Duration::from_secs(86_400)).await;
        }
    }
}

#[async_trait::async_trait]
impl OrderGateway for MockOrderGateway {
    async fn clear_cart(&self) -> GatewayResult<()> {
        self.maybe_stall(Phase::ClearRemoteCart).await;
        self.record(GatewayCall::ClearCart);
        if let Some(err) = &self.plan.fail_clear {
            return Err(err.clone());
        }
        self.remote_cart.lock().expect("mock cart lock").clear();
        Ok(())
    }

    async fn push_item(&self, entry: RemoteCartEntry) -> GatewayResult<()> {
        self.maybe_stall(Phase::ReplicateItems).await;
        self.record(GatewayCall::PushItem(entry.clone()));
        let index = self.push_count.fetch_add(1, Ordering::SeqCst);
        if let Some((fail_index, err)) = &self.plan.fail_push_at {
            if index == *fail_index {
                return Err(err.clone());
            }
        }
        self.remote_cart.lock().expect("mock cart lock").push(entry);
        Ok(())
    }

    async fn create_order(&self, request: CreateOrderRequest) -> GatewayResult<OrderConfirmation> {
        self.maybe_stall(Phase::CreateOrder).await;
        self.record(GatewayCall::CreateOrder(request.clone()));
        if let Some(err) = &self.plan.fail_create {
            return Err(err.clone());
        }
        self.orders.lock().expect("mock orders lock").push(request);
        Ok(OrderConfirmation::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: u64, price_cents: i64, quantity: u32) -> LineItem {
        LineItem::new(
            bazaar_cart::ProductSnapshot {
                id,
                name: format!("Product {}", id),
                price_cents,
                image: "/images/placeholder.png".to_string(),
                category: "general".to_string(),
            },
            quantity,
        )
    }

    fn shipping() -> ShippingDetails {
        ShippingDetails {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: "01712345678".to_string(),
            address: "123 Street".to_string(),
            city: "Dhaka".to_string(),
            zip: "1212".to_string(),
        }
    }

    #[tokio::test]
    async fn phases_run_strictly_in_order() {
        let gateway = Arc::new(MockOrderGateway::new());
        let coordinator = OrderSubmissionCoordinator::new(gateway.clone());

        let items = vec![line(1, 100_00, 2)];
        coordinator
            .submit(&items, &shipping(), PaymentMethod::CashOnDelivery)
            .await
            .unwrap();

        let calls = gateway.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0], GatewayCall::ClearCart);
        assert_eq!(
            calls[1],
            GatewayCall::PushItem(RemoteCartEntry {
                product_id: 1,
                quantity: 2
            })
        );
        assert!(matches!(calls[2], GatewayCall::CreateOrder(_)));
    }

    #[tokio::test]
    async fn clear_failure_aborts_before_any_push() {
        let gateway = Arc::new(MockOrderGateway::with_plan(FailurePlan {
            fail_clear: Some(GatewayError::Remote("session expired".to_string())),
            ..FailurePlan::default()
        }));
        let coordinator = OrderSubmissionCoordinator::new(gateway.clone());

        let items = vec![line(1, 10_00, 1), line(2, 20_00, 1)];
        let err = coordinator
            .submit(&items, &shipping(), PaymentMethod::Card)
            .await
            .unwrap_err();

        assert_eq!(err.phase(), Phase::ClearRemoteCart);
        assert_eq!(err.to_string(), "Order submission failed at clear-remote-cart: session expired");
        assert_eq!(gateway.calls().len(), 1);
    }

    #[tokio::test]
    async fn partial_push_failure_compensates_with_a_re_clear() {
        let gateway = Arc::new(MockOrderGateway::with_plan(FailurePlan {
            fail_push_at: Some((1, GatewayError::Unavailable)),
            ..FailurePlan::default()
        }));
        let coordinator = OrderSubmissionCoordinator::new(gateway.clone());

        let items = vec![line(1, 10_00, 1), line(2, 20_00, 1), line(3, 30_00, 1)];
        let err = coordinator
            .submit(&items, &shipping(), PaymentMethod::Card)
            .await
            .unwrap_err();

        assert_eq!(err.phase(), Phase::ReplicateItems);
        // Third push abandoned, no order created, remote cart re-cleared.
        let calls = gateway.calls();
        assert!(!calls.iter().any(|c| matches!(c, GatewayCall::CreateOrder(_))));
        assert_eq!(
            calls.iter().filter(|c| matches!(c, GatewayCall::PushItem(_))).count(),
            2
        );
        assert_eq!(*calls.last().unwrap(), GatewayCall::ClearCart);
        assert!(gateway.remote_cart().is_empty());
    }

    #[tokio::test]
    async fn create_order_failure_surfaces_server_text_verbatim() {
        let gateway = Arc::new(MockOrderGateway::with_plan(FailurePlan {
            fail_create: Some(GatewayError::Remote("Payment method not supported".to_string())),
            ..FailurePlan::default()
        }));
        let coordinator = OrderSubmissionCoordinator::new(gateway.clone());

        let items = vec![line(1, 10_00, 1)];
        let err = coordinator
            .submit(&items, &shipping(), PaymentMethod::MobileWallet)
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Order submission failed at create-order: Payment method not supported"
        );
        assert!(gateway.orders().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_counts_as_phase_failure() {
        let gateway = Arc::new(MockOrderGateway::with_plan(FailurePlan {
            stall: Some(Phase::CreateOrder),
            ..FailurePlan::default()
        }));
        let coordinator =
            OrderSubmissionCoordinator::with_timeout(gateway.clone(), Duration::from_secs(5));

        let items = vec![line(1, 10_00, 1)];
        let err = coordinator
            .submit(&items, &shipping(), PaymentMethod::Card)
            .await
            .unwrap_err();

        assert_eq!(err, SubmissionError::Timeout(Phase::CreateOrder));
    }

    #[tokio::test(start_paused = true)]
    async fn re_entrant_submission_is_rejected_by_the_lock() {
        let gateway = Arc::new(MockOrderGateway::with_plan(FailurePlan {
            stall: Some(Phase::ReplicateItems),
            ..FailurePlan::default()
        }));
        let coordinator = Arc::new(OrderSubmissionCoordinator::with_timeout(
            gateway.clone(),
            Duration::from_secs(60),
        ));

        let items = vec![line(1, 10_00, 1)];
        let first = {
            let coordinator = coordinator.clone();
            let items = items.clone();
            tokio::spawn(async move {
                coordinator
                    .submit(&items, &shipping(), PaymentMethod::Card)
                    .await
            })
        };
        // Let the first submission take the lock and stall in phase 2.
        tokio::time::sleep(Duration::from_millis(10)).await;

        let second = coordinator
            .submit(&items, &shipping(), PaymentMethod::Card)
            .await;
        assert_eq!(second.unwrap_err(), SubmissionError::AlreadyInFlight);

        let first = first.await.unwrap();
        assert_eq!(first.unwrap_err(), SubmissionError::Timeout(Phase::ReplicateItems));
    }
}
