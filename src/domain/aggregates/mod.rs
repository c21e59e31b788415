//! Aggregates module
pub mod order;

pub use order::Order;
