//! Value Objects for COD analytics

pub mod status;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use status::StatusClass;

/// Field used to bucket order lines for per-product projection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupKey {
    #[default]
    ProductId,
    ProductGroup,
    ProductName,
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProductId => write!(f, "productId"),
            Self::ProductGroup => write!(f, "productGroup"),
            Self::ProductName => write!(f, "productName"),
        }
    }
}

/// Inclusive date window applied to order lines before computing metrics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self { Self { from, to } }
    pub fn is_unbounded(&self) -> bool { self.from.is_none() && self.to.is_none() }

    pub fn is_ordered(&self) -> bool {
        match (self.from, self.to) { (Some(f), Some(t)) => f <= t, _ => true }
    }

    /// Undated lines only pass an unbounded window.
    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        if self.is_unbounded() { return true; }
        let Some(d) = date else { return false };
        self.from.map_or(true, |f| d >= f) && self.to.map_or(true, |t| d <= t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(2025, 3, d).unwrap() }

    #[test]
    fn test_group_key_serde() {
        let k: GroupKey = serde_json::from_str("\"productGroup\"").unwrap();
        assert_eq!(k, GroupKey::ProductGroup);
        assert_eq!(GroupKey::default().to_string(), "productId");
    }

    #[test]
    fn test_date_range_inclusive() {
        let r = DateRange::new(Some(day(5)), Some(day(10)));
        assert!(r.contains(Some(day(5))));
        assert!(r.contains(Some(day(10))));
        assert!(!r.contains(Some(day(11))));
        assert!(!r.contains(None));
        assert!(DateRange::default().contains(None));
    }

    #[test]
    fn test_date_range_order() {
        assert!(!DateRange::new(Some(day(9)), Some(day(2))).is_ordered());
        assert!(DateRange::new(None, Some(day(2))).is_ordered());
    }
}
