// src/error.rs

use thiserror::Error;

/// Errors surfaced by the planner library.
///
/// Input defects are not errors: the normalizer repairs them and reports
/// [`InputWarning`](crate::planning::normalizer::InputWarning)s instead.
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("failed to read {table} table: {source}")]
    Read {
        table: String,
        #[source]
        source: csv::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("allocation invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),
}

/// A broken guarantee of the allocation engine. Seeing one of these means a bug.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvariantViolation {
    #[error("line {line} in {month} consumes {consumed} of {available} available time")]
    CapacityExceeded {
        line: String,
        month: String,
        consumed: f64,
        available: f64,
    },

    #[error("product {product} in {month} allocated {allocated} against demand {demand}")]
    DemandExceeded {
        product: String,
        month: String,
        allocated: f64,
        demand: f64,
    },

    #[error("product {product} allocated to line {line} in {month} without a production rate")]
    InfeasibleAllocation {
        product: String,
        line: String,
        month: String,
    },

    #[error("negative {what} ({value}) for {key}")]
    NegativeValue {
        what: &'static str,
        key: String,
        value: f64,
    },
}
