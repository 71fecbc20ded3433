pub mod coordinator;
pub mod forms;
pub mod session;

pub use coordinator::{
    FailurePlan, GatewayCall, MockOrderGateway, OrderSubmissionCoordinator, Phase, SubmissionError,
};
pub use forms::{CardDetails, Field, FieldError, ShippingDetails, ShippingForm};
pub use session::{CheckoutError, CheckoutSession, CheckoutStep};
