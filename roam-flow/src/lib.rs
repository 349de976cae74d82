pub mod bridge;
pub mod flow;
pub mod validation;
pub mod view;

pub use bridge::{BridgeConfig, MockGateway, PaymentBridge, PaymentOutcome};
pub use flow::{BookingFlow, CustomerProfile, FlowError, FlowStage};
pub use validation::ValidationError;
pub use view::View;
