//! Validation error types.

use thiserror::Error;

/// Ordering direction of a price ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceOrder {
    /// Bids: highest first.
    Descending,
    /// Asks: lowest first.
    Ascending,
}

/// A single failed check.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Schema validation failed at {path}: {reason}")]
    Schema { path: String, reason: String },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Timestamp is too far in future: {ts} (now {now})")]
    FutureTimestamp { ts: f64, now: f64 },

    #[error("Timestamps not strictly increasing: {prev} >= {next} at index {index}")]
    NotIncreasing { index: usize, prev: f64, next: f64 },

    #[error("Order book is crossed: best_bid={best_bid} >= best_ask={best_ask}")]
    CrossedBook { best_bid: f64, best_ask: f64 },

    #[error("Prices not in {order:?} order: {prev} then {next} at index {index}")]
    PriceOrdering {
        order: PriceOrder,
        index: usize,
        prev: f64,
        next: f64,
    },

    #[error("{lhs} ({lhs_value}) must be {relation} {rhs} ({rhs_value})")]
    Relation {
        lhs: &'static str,
        lhs_value: f64,
        relation: &'static str,
        rhs: &'static str,
        rhs_value: f64,
    },

    #[error("{field} must be positive: {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must be non-negative: {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} is empty")]
    Empty { field: &'static str },

    #[error("{field} mismatch: expected {expected}, got {actual}")]
    Mismatch {
        field: &'static str,
        expected: String,
        actual: String,
    },
}

impl ValidationError {
    pub(crate) fn relation(
        lhs: &'static str,
        lhs_value: f64,
        relation: &'static str,
        rhs: &'static str,
        rhs_value: f64,
    ) -> Self {
        ValidationError::Relation {
            lhs,
            lhs_value,
            relation,
            rhs,
            rhs_value,
        }
    }

    pub(crate) fn mismatch(
        field: &'static str,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        ValidationError::Mismatch {
            field,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

/// Result alias for single checks.
pub type ValidationResult = Result<(), ValidationError>;
