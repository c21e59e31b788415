//! Best-effort heuristics used while ingesting exports.
//!
//! Unlike the calculations these are guesses and may come back empty.
pub mod country;
pub mod product_name;

pub use country::{CityTableDetector, Country, CountryDetector};
pub use product_name::extract_base_name;
