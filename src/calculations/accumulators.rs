//! Accumulators used by the KPI and geo aggregations.
//!
//! Monetary totals that belong to the order (invoice total, shipping) must not be
//! counted once per line, so they go through [`PerOrderOnce`]. Costs that belong to
//! the line (cost of goods) go through [`PerLine`] and are summed for every line.
//! Keep the two apart: swapping one for the other changes reported profit.

use std::collections::HashSet;

/// Sums a value the first time each order id is offered. Lines without an id are ignored.
#[derive(Debug, Default)]
pub struct PerOrderOnce<'a> {
    seen: HashSet<&'a str>,
    total: f64,
}

impl<'a> PerOrderOnce<'a> {
    pub fn new() -> Self { Self::default() }

    pub fn add(&mut self, id: Option<&'a str>, value: f64) {
        if let Some(id) = id {
            if self.seen.insert(id) { self.total += value; }
        }
    }

    pub fn total(&self) -> f64 { self.total }
}

/// Sums every line, no deduplication.
#[derive(Debug, Default)]
pub struct PerLine {
    total: f64,
}

impl PerLine {
    pub fn new() -> Self { Self::default() }
    pub fn add(&mut self, value: f64) { self.total += value; }
    pub fn total(&self) -> f64 { self.total }
}

/// Distinct order ids seen for one count.
#[derive(Debug, Default)]
pub struct DistinctIds<'a>(HashSet<&'a str>);

impl<'a> DistinctIds<'a> {
    pub fn new() -> Self { Self::default() }
    pub fn insert(&mut self, id: Option<&'a str>) { if let Some(id) = id { self.0.insert(id); } }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

/// Division that yields 0 unless the denominator is strictly positive. Never NaN or infinite.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 { numerator / denominator } else { 0.0 }
}

pub fn percent(numerator: f64, denominator: f64) -> f64 { ratio(numerator, denominator) * 100.0 }

/// Count-based ratio; counts are never negative so only zero is guarded.
pub fn count_ratio(numerator: usize, denominator: usize) -> f64 {
    ratio(numerator as f64, denominator as f64)
}
