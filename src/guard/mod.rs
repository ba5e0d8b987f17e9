//! Authentication attempt throttling.

mod engine;
mod request;

pub use engine::{Decision, DecisionEngine, DenyReason, Thresholds};
pub use request::AttemptRequest;
