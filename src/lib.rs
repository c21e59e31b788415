//! OpenSASE COD Analytics
//!
//! Performance metrics for cash-on-delivery dropshipping, computed from normalized
//! order exports and ad spend.
//!
//! ## Features
//! - Status classification of free-text carrier statuses
//! - KPI aggregation (delivery/cancel/return rates, real profit, ROAS, CPA, CPE, MER)
//! - Per-product profit projection under target delivery rates
//! - KPI health against configurable thresholds
//! - City-level delivery breakdown
//! - Country and product-name heuristics for ingestion
//! - JSON API over the engine

pub mod calculations;
pub mod config;
pub mod domain;
pub mod http;
pub mod ingest;

use thiserror::Error;

pub use calculations::{
    compute_kpis, compute_projection, count_statuses, KpiResults, ProjectionResult, ProjectionTotals,
};
pub use config::Config;
pub use domain::{DateRange, GroupKey, Order, StatusClass};

// =============================================================================
// Error Types
// =============================================================================

/// Failures of the service layer. The calculations themselves never fail.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Invalid configuration for {key}: {value:?}")]
    InvalidConfig { key: &'static str, value: String },

    #[error("Invalid request: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
