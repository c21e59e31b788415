//! Delivery performance broken down by destination city.

use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use crate::calculations::accumulators::{count_ratio, ratio, PerOrderOnce};
use crate::calculations::kpis::count_statuses;
use crate::domain::{Order, StatusClass};

const UNKNOWN_CITY: &str = "Unknown";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityMetrics {
    pub city: String,
    pub total_orders: usize,
    pub delivered: usize,
    pub canceled: usize,
    pub returned: usize,
    pub transit: usize,
    pub delivery_rate: f64,
    pub return_rate: f64,
    pub avg_shipping: f64,
    pub delivered_revenue: f64,
}

/// Cities are matched case-insensitively; the first spelling seen is displayed.
/// Sorted by order volume, busiest first.
pub fn aggregate_by_city(orders: &[Order]) -> Vec<CityMetrics> {
    let mut cities: HashMap<String, (String, Vec<&Order>)> = HashMap::new();
    for order in orders {
        let display = order.city.as_deref().map(str::trim).filter(|c| !c.is_empty()).unwrap_or(UNKNOWN_CITY);
        cities
            .entry(display.to_lowercase())
            .or_insert_with(|| (display.to_string(), Vec::new()))
            .1
            .push(order);
    }

    let mut results: Vec<CityMetrics> = cities.into_values().map(|(city, lines)| city_metrics(city, &lines)).collect();
    results.sort_by(|a, b| b.total_orders.cmp(&a.total_orders).then_with(|| a.city.cmp(&b.city)));
    results
}

fn city_metrics(city: String, lines: &[&Order]) -> CityMetrics {
    let counts = count_statuses(lines.iter().copied());
    let mut shipping = PerOrderOnce::new();
    let mut revenue = PerOrderOnce::new();
    for line in lines.iter().copied() {
        shipping.add(line.order_id(), line.forward_shipping());
        if line.status_class() == StatusClass::Delivered {
            revenue.add(line.order_id(), line.total());
        }
    }
    CityMetrics {
        city,
        total_orders: counts.total,
        delivered: counts.delivered,
        canceled: counts.canceled,
        returned: counts.returned,
        transit: counts.transit,
        delivery_rate: count_ratio(counts.delivered, counts.total.saturating_sub(counts.canceled)) * 100.0,
        return_rate: count_ratio(counts.returned, counts.delivered + counts.returned) * 100.0,
        avg_shipping: ratio(shipping.total(), counts.total as f64),
        delivered_revenue: revenue.total(),
    }
}
