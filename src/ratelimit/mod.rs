//! Attempt counting and counter state management.

mod backend;
mod counter;
mod janitor;
mod store;

pub use backend::AttemptLimiter;
#[cfg(test)]
pub use backend::MockAttemptLimiter;
pub use counter::Counter;
pub use janitor::Janitor;
pub use store::CounterStore;
