//! KPI aggregation over order lines and ad spend.
//!
//! Counts are distinct order ids. Order-level money (invoice totals, shipping) is
//! summed once per order id; cost of goods is summed once per line. Every ratio is 0
//! when its denominator is not positive, so empty input and zero spend are both valid.

use serde::{Deserialize, Serialize};
use crate::calculations::accumulators::{count_ratio, percent, ratio, DistinctIds, PerLine, PerOrderOnce};
use crate::domain::{Order, StatusClass};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiResults {
    // Counts (distinct order ids)
    pub total_orders: usize,
    pub delivered: usize,
    pub canceled: usize,
    pub returned: usize,
    pub in_transit: usize,
    pub non_canceled: usize,

    // Rates, percent
    /// delivered / non-canceled
    pub delivery_rate: f64,
    /// canceled / total
    pub cancellation_rate: f64,
    /// returned / (delivered + returned); transit orders are not in the base
    pub return_rate: f64,

    // Money
    pub net_invoiced: f64,
    pub dispatched_invoiced: f64,
    pub real_income: f64,
    pub cost_of_goods: f64,
    pub forward_shipping: f64,
    pub return_shipping: f64,
    pub transit_shipping: f64,
    pub ad_spend: f64,
    pub real_profit: f64,

    // Performance
    pub roas_gross: f64,
    pub roas_real: f64,
    pub cpa: f64,
    pub cpe: f64,
    pub mer: f64,
    pub ad_spend_pct_of_revenue: f64,
    pub return_shipping_per_order: f64,
    pub profit_per_delivered: f64,
}

/// Metrics addressable by key, used by health targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiKey {
    RoasGross,
    RoasReal,
    Cpa,
    Cpe,
    Mer,
    DeliveryRate,
    CancellationRate,
    ReturnRate,
    NetMargin,
    AdSpendPctOfRevenue,
    ReturnShippingPerOrder,
    ProfitPerDelivered,
    RealProfit,
}

impl KpiResults {
    /// Real profit as a percentage of delivered revenue.
    pub fn net_margin_pct(&self) -> f64 { percent(self.real_profit, self.real_income) }

    pub fn value(&self, key: KpiKey) -> f64 {
        match key {
            KpiKey::RoasGross => self.roas_gross,
            KpiKey::RoasReal => self.roas_real,
            KpiKey::Cpa => self.cpa,
            KpiKey::Cpe => self.cpe,
            KpiKey::Mer => self.mer,
            KpiKey::DeliveryRate => self.delivery_rate,
            KpiKey::CancellationRate => self.cancellation_rate,
            KpiKey::ReturnRate => self.return_rate,
            KpiKey::NetMargin => self.net_margin_pct(),
            KpiKey::AdSpendPctOfRevenue => self.ad_spend_pct_of_revenue,
            KpiKey::ReturnShippingPerOrder => self.return_shipping_per_order,
            KpiKey::ProfitPerDelivered => self.profit_per_delivered,
            KpiKey::RealProfit => self.real_profit,
        }
    }
}

#[derive(Default)]
struct OrderIds<'a> {
    all: DistinctIds<'a>,
    delivered: DistinctIds<'a>,
    canceled: DistinctIds<'a>,
    returned: DistinctIds<'a>,
    transit: DistinctIds<'a>,
    non_canceled: DistinctIds<'a>,
}

#[derive(Default)]
struct Sums<'a> {
    net_invoiced: PerOrderOnce<'a>,
    dispatched_invoiced: PerOrderOnce<'a>,
    real_income: PerOrderOnce<'a>,
    forward_shipping: PerOrderOnce<'a>,
    return_shipping: PerOrderOnce<'a>,
    transit_shipping: PerOrderOnce<'a>,
    cost_of_goods: PerLine,
}

/// Aggregate order lines into one [`KpiResults`].
///
/// `global_revenue` overrides net invoiced as the MER numerator when supplied and non-zero.
pub fn compute_kpis(orders: &[Order], ad_spend: f64, global_revenue: Option<f64>) -> KpiResults {
    let ad_spend = if ad_spend.is_nan() { 0.0 } else { ad_spend };
    let mut ids = OrderIds::default();
    let mut money = Sums::default();

    for order in orders {
        let id = order.order_id();
        let class = order.status_class();

        ids.all.insert(id);
        match class {
            StatusClass::Delivered => ids.delivered.insert(id),
            StatusClass::Canceled => ids.canceled.insert(id),
            StatusClass::Returned => ids.returned.insert(id),
            StatusClass::Transit => ids.transit.insert(id),
        }
        if class.is_dispatched() {
            ids.non_canceled.insert(id);
            money.net_invoiced.add(id, order.total());
            money.dispatched_invoiced.add(id, order.total());
        }

        match class {
            StatusClass::Delivered => {
                money.real_income.add(id, order.total());
                money.cost_of_goods.add(order.cost_of_goods());
                money.forward_shipping.add(id, order.forward_shipping());
            }
            StatusClass::Returned => money.return_shipping.add(id, order.return_shipping()),
            StatusClass::Transit => money.transit_shipping.add(id, order.forward_shipping()),
            StatusClass::Canceled => {}
        }
    }

    let total_orders = ids.all.len();
    let delivered = ids.delivered.len();
    let canceled = ids.canceled.len();
    let returned = ids.returned.len();
    let non_canceled = ids.non_canceled.len();

    let net_invoiced = money.net_invoiced.total();
    let real_income = money.real_income.total();
    let cost_of_goods = money.cost_of_goods.total();
    let forward_shipping = money.forward_shipping.total();
    let return_shipping = money.return_shipping.total();
    let transit_shipping = money.transit_shipping.total();

    let real_profit = real_income - cost_of_goods - ad_spend - forward_shipping - return_shipping - transit_shipping;
    let mer_revenue = global_revenue.filter(|r| *r != 0.0 && !r.is_nan()).unwrap_or(net_invoiced);

    let results = KpiResults {
        total_orders,
        delivered,
        canceled,
        returned,
        in_transit: ids.transit.len(),
        non_canceled,
        delivery_rate: count_ratio(delivered, non_canceled) * 100.0,
        cancellation_rate: count_ratio(canceled, total_orders) * 100.0,
        return_rate: count_ratio(returned, delivered + returned) * 100.0,
        net_invoiced,
        dispatched_invoiced: money.dispatched_invoiced.total(),
        real_income,
        cost_of_goods,
        forward_shipping,
        return_shipping,
        transit_shipping,
        ad_spend,
        real_profit,
        roas_gross: ratio(net_invoiced, ad_spend),
        roas_real: ratio(real_income, ad_spend),
        cpa: if total_orders > 0 { ad_spend / total_orders as f64 } else { 0.0 },
        cpe: if delivered > 0 { ad_spend / delivered as f64 } else { 0.0 },
        mer: ratio(mer_revenue, ad_spend),
        ad_spend_pct_of_revenue: percent(ad_spend, net_invoiced),
        return_shipping_per_order: if total_orders > 0 { return_shipping / total_orders as f64 } else { 0.0 },
        profit_per_delivered: if delivered > 0 { real_profit / delivered as f64 } else { 0.0 },
    };
    tracing::debug!(lines = orders.len(), orders = total_orders, delivered, real_profit, "computed KPIs");
    results
}

/// Distinct order ids per status class.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub total: usize,
    pub delivered: usize,
    pub canceled: usize,
    pub returned: usize,
    pub transit: usize,
    /// Subset of the other classes whose status carries a carrier incident.
    pub novelty: usize,
}

pub fn count_statuses<'a>(orders: impl IntoIterator<Item = &'a Order>) -> StatusCounts {
    let mut ids = OrderIds::default();
    let mut novelty = DistinctIds::new();
    for order in orders {
        let id = order.order_id();
        ids.all.insert(id);
        match order.status_class() {
            StatusClass::Delivered => ids.delivered.insert(id),
            StatusClass::Canceled => ids.canceled.insert(id),
            StatusClass::Returned => ids.returned.insert(id),
            StatusClass::Transit => ids.transit.insert(id),
        }
        if order.has_novelty() { novelty.insert(id); }
    }
    StatusCounts {
        total: ids.all.len(),
        delivered: ids.delivered.len(),
        canceled: ids.canceled.len(),
        returned: ids.returned.len(),
        transit: ids.transit.len(),
        novelty: novelty.len(),
    }
}
