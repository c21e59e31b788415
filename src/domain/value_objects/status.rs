//! Order status classification
//!
//! Carrier statuses arrive as free text ("ENTREGADO", "EN CAMINO", "Devolución"...).
//! Every string maps to exactly one [`StatusClass`]; anything unrecognised is transit.

use serde::{Deserialize, Serialize};

pub const DELIVERED_TOKENS: &[&str] = &["ENTREGADO"];
pub const CANCELED_TOKENS: &[&str] = &["CANCELADO", "RECHAZADO"];
/// Accented and unaccented spellings are both listed; matching is not accent-folded.
pub const RETURNED_TOKENS: &[&str] = &["DEVOLUCION", "DEVOLUCIÓN", "EN DEVOLUCION", "EN DEVOLUCIÓN"];
pub const NOVELTY_TOKENS: &[&str] = &["NOVEDAD", "CON NOVEDAD"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusClass {
    Delivered,
    Canceled,
    Returned,
    /// Catch-all: any status that is not delivered, canceled or returned.
    Transit,
}

impl StatusClass {
    pub fn is_delivered(self) -> bool { self == Self::Delivered }
    pub fn is_canceled(self) -> bool { self == Self::Canceled }
    pub fn is_returned(self) -> bool { self == Self::Returned }
    pub fn is_transit(self) -> bool { self == Self::Transit }

    /// Left the warehouse: delivered, returned or still in transit.
    pub fn is_dispatched(self) -> bool { !self.is_canceled() }
}

/// Trimmed, upper-cased substring match against any token in the list.
pub fn matches_status(status: &str, tokens: &[&str]) -> bool {
    let normalized = status.trim().to_uppercase();
    tokens.iter().any(|t| normalized.contains(t))
}

pub fn classify(status: &str) -> StatusClass {
    if matches_status(status, DELIVERED_TOKENS) {
        StatusClass::Delivered
    } else if matches_status(status, CANCELED_TOKENS) {
        StatusClass::Canceled
    } else if matches_status(status, RETURNED_TOKENS) {
        StatusClass::Returned
    } else {
        StatusClass::Transit
    }
}

pub fn is_delivered(status: &str) -> bool { classify(status).is_delivered() }
pub fn is_canceled(status: &str) -> bool { classify(status).is_canceled() }
pub fn is_returned(status: &str) -> bool { classify(status).is_returned() }
pub fn is_transit(status: &str) -> bool { classify(status).is_transit() }

/// Carrier flagged an incident. Informational only, not a class of its own.
pub fn is_novelty(status: &str) -> bool { matches_status(status, NOVELTY_TOKENS) }
