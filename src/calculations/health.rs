//! KPI health against good/warning thresholds.

use serde::{Deserialize, Serialize};
use crate::calculations::kpis::{KpiKey, KpiResults};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Good,
    Warning,
    Bad,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiTarget {
    pub key: KpiKey,
    pub label: String,
    pub unit: String,
    pub good: f64,
    pub warning: f64,
    /// Lower is better (costs, cancellation).
    #[serde(default)]
    pub inverse: bool,
    #[serde(default)]
    pub description: String,
}

impl KpiTarget {
    pub fn new(key: KpiKey, label: &str, unit: &str, good: f64, warning: f64, inverse: bool) -> Self {
        Self { key, label: label.into(), unit: unit.into(), good, warning, inverse, description: String::new() }
    }

    pub fn with_description(mut self, description: &str) -> Self { self.description = description.into(); self }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiAssessment {
    pub key: KpiKey,
    pub label: String,
    pub value: f64,
    pub status: HealthStatus,
}

/// Good is checked before Bad, so a value meeting both thresholds reads as Good.
pub fn evaluate_health(value: f64, target: &KpiTarget) -> HealthStatus {
    if target.inverse {
        if value <= target.good { return HealthStatus::Good; }
        if value >= target.warning { return HealthStatus::Bad; }
    } else {
        if value >= target.good { return HealthStatus::Good; }
        if value <= target.warning { return HealthStatus::Bad; }
    }
    HealthStatus::Warning
}

pub fn default_kpi_targets() -> Vec<KpiTarget> {
    vec![
        KpiTarget::new(KpiKey::RoasReal, "ROAS Real", "x", 2.0, 1.5, false)
            .with_description("Delivered revenue per unit of ad spend. Higher is better."),
        KpiTarget::new(KpiKey::Cpa, "CPA", "$", 25000.0, 30000.0, true)
            .with_description("Ad spend per order. Lower is better."),
        KpiTarget::new(KpiKey::DeliveryRate, "Delivery Rate", "%", 65.0, 50.0, false)
            .with_description("Delivered orders over non-canceled orders. Higher is better."),
        KpiTarget::new(KpiKey::CancellationRate, "Cancellation Rate", "%", 30.0, 40.0, true)
            .with_description("Canceled orders over all orders. Lower is better."),
        KpiTarget::new(KpiKey::NetMargin, "Net Margin", "%", 15.0, 5.0, false)
            .with_description("Real profit over delivered revenue. Higher is better."),
        KpiTarget::new(KpiKey::AdSpendPctOfRevenue, "% Ads vs Revenue", "%", 25.0, 35.0, true)
            .with_description("Ad spend over net invoiced revenue. Lower is better."),
        KpiTarget::new(KpiKey::ReturnRate, "Return Rate", "%", 10.0, 20.0, true)
            .with_description("Returned orders over delivered plus returned. Lower is better."),
    ]
}

pub fn find_target(targets: &[KpiTarget], key: KpiKey) -> Option<&KpiTarget> {
    targets.iter().find(|t| t.key == key)
}

pub fn assess(kpis: &KpiResults, targets: &[KpiTarget]) -> Vec<KpiAssessment> {
    targets
        .iter()
        .map(|t| {
            let value = kpis.value(t.key);
            KpiAssessment { key: t.key, label: t.label.clone(), value, status: evaluate_health(value, t) }
        })
        .collect()
}
