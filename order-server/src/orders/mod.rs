//! Orders: creation, payment, status workflow and consumption

pub mod consumption;
pub mod money;
pub mod workflow;

pub use consumption::ConsumptionProcess;
pub use workflow::{OrderWorkflow, PaymentOutcome};
