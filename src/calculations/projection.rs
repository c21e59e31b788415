//! What-if profit projection per product.
//!
//! For each product bucket, observed non-canceled orders are re-played under a target
//! delivery percentage: delivered orders earn the average ticket and pay average cost
//! and forward shipping, the rest pay return/other shipping inflated by a buffer.

use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use crate::domain::{GroupKey, Order, StatusClass};

pub const DEFAULT_TARGET_DELIVERY_PCT: f64 = 80.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    /// Display name
    pub product: String,
    /// Grouping value, also the key for targets and ad spend
    pub product_id: String,
    /// Distinct non-canceled order ids
    pub orders: usize,
    pub delivery_pct: f64,
    pub revenue: f64,
    pub cost_of_goods: f64,
    pub forward_shipping: f64,
    pub return_shipping: f64,
    pub ad_spend: f64,
    pub profit: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionTotals {
    pub orders: usize,
    pub revenue: f64,
    pub cost_of_goods: f64,
    pub forward_shipping: f64,
    pub return_shipping: f64,
    pub ad_spend: f64,
    pub profit: f64,
}

struct Bucket<'a> {
    key: &'a str,
    name: &'a str,
    lines: Vec<&'a Order>,
}

/// Project profit for every bucket that has non-canceled orders or ad spend.
///
/// Buckets come out in first-seen order, followed by ad-spend-only keys sorted by key.
pub fn compute_projection(
    orders: &[Order],
    group_key: GroupKey,
    target_delivery: &HashMap<String, f64>,
    buffer_multiplier: f64,
    ad_spend: &HashMap<String, f64>,
) -> Vec<ProjectionResult> {
    let mut buckets: Vec<Bucket<'_>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for order in orders {
        let key = order.group_value(group_key);
        let slot = *index.entry(key).or_insert_with(|| {
            buckets.push(Bucket { key, name: order.display_name(group_key), lines: Vec::new() });
            buckets.len() - 1
        });
        buckets[slot].lines.push(order);
    }

    let mut spend_only: Vec<&str> = ad_spend.keys().map(String::as_str).filter(|k| !index.contains_key(k)).collect();
    spend_only.sort_unstable();
    buckets.extend(spend_only.into_iter().map(|key| Bucket { key, name: key, lines: Vec::new() }));

    let results: Vec<ProjectionResult> = buckets
        .iter()
        .filter_map(|b| project_bucket(b, target_delivery, buffer_multiplier, ad_spend))
        .collect();
    tracing::debug!(lines = orders.len(), %group_key, products = results.len(), "computed projection");
    results
}

fn project_bucket(
    bucket: &Bucket<'_>,
    target_delivery: &HashMap<String, f64>,
    buffer_multiplier: f64,
    ad_spend: &HashMap<String, f64>,
) -> Option<ProjectionResult> {
    let mut delivered = Vec::new();
    let mut non_canceled = Vec::new();
    let mut other = Vec::new();
    for line in &bucket.lines {
        match line.status_class() {
            StatusClass::Canceled => continue,
            StatusClass::Delivered => delivered.push(*line),
            StatusClass::Returned | StatusClass::Transit => other.push(*line),
        }
        non_canceled.push(*line);
    }

    let basis = if delivered.is_empty() { &non_canceled } else { &delivered };
    let avg_ticket = mean(basis, Order::total).unwrap_or(0.0);
    let avg_cost = mean(basis, Order::cost_of_goods).unwrap_or(0.0);
    let avg_shipping = mean(basis, Order::forward_shipping).unwrap_or(0.0);
    let avg_other_shipping = mean(&other, Order::forward_shipping).unwrap_or(avg_shipping);

    let orders = distinct_ids(&non_canceled);
    let delivery_pct = target_delivery_pct(target_delivery, bucket.key, bucket.name);
    let projected_delivered = orders as f64 * (delivery_pct / 100.0);
    let projected_not_delivered = orders as f64 - projected_delivered;

    let revenue = projected_delivered * avg_ticket;
    let cost_of_goods = projected_delivered * avg_cost;
    let forward_shipping = projected_delivered * avg_shipping;
    let return_shipping = projected_not_delivered * avg_other_shipping * buffer_multiplier;
    let ads = ad_spend.get(bucket.key).copied().filter(|v| !v.is_nan()).unwrap_or(0.0);
    let profit = revenue - cost_of_goods - forward_shipping - return_shipping - ads;

    if orders == 0 && ads <= 0.0 {
        return None;
    }
    Some(ProjectionResult {
        product: bucket.name.to_string(),
        product_id: bucket.key.to_string(),
        orders,
        delivery_pct,
        revenue,
        cost_of_goods,
        forward_shipping,
        return_shipping,
        ad_spend: ads,
        profit,
    })
}

/// Looks up the bucket key, then the display name, then the default.
///
/// A stored 0 (or NaN) is treated the same as a missing entry, so a target of 0% can
/// never be set; it projects at the default instead.
fn target_delivery_pct(targets: &HashMap<String, f64>, key: &str, name: &str) -> f64 {
    [key, name]
        .into_iter()
        .filter_map(|k| targets.get(k).copied())
        .find(|pct| *pct != 0.0 && !pct.is_nan())
        .unwrap_or(DEFAULT_TARGET_DELIVERY_PCT)
}

fn mean(lines: &[&Order], value: impl Fn(&Order) -> f64) -> Option<f64> {
    if lines.is_empty() { return None; }
    Some(lines.iter().map(|o| value(o)).sum::<f64>() / lines.len() as f64)
}

fn distinct_ids(lines: &[&Order]) -> usize {
    lines.iter().map(|o| o.id.as_str()).collect::<std::collections::HashSet<_>>().len()
}

/// Portfolio totals across all projected products.
pub fn summarize(results: &[ProjectionResult]) -> ProjectionTotals {
    results.iter().fold(ProjectionTotals::default(), |mut t, r| {
        t.orders += r.orders;
        t.revenue += r.revenue;
        t.cost_of_goods += r.cost_of_goods;
        t.forward_shipping += r.forward_shipping;
        t.return_shipping += r.return_shipping;
        t.ad_spend += r.ad_spend;
        t.profit += r.profit;
        t
    })
}
