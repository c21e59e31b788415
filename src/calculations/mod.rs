//! Pure metric calculations. No I/O, no shared state: every call builds its own accumulators.
pub mod accumulators;
pub mod geo;
pub mod health;
pub mod kpis;
pub mod projection;

pub use geo::{aggregate_by_city, CityMetrics};
pub use health::{assess, default_kpi_targets, evaluate_health, find_target, HealthStatus, KpiAssessment, KpiTarget};
pub use kpis::{compute_kpis, count_statuses, KpiKey, KpiResults, StatusCounts};
pub use projection::{compute_projection, summarize, ProjectionResult, ProjectionTotals, DEFAULT_TARGET_DELIVERY_PCT};
