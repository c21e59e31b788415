//! Domain model: order lines and the value objects used to classify and group them.
pub mod aggregates;
pub mod value_objects;

pub use aggregates::Order;
pub use value_objects::{DateRange, GroupKey, StatusClass};
