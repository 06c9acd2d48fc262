//! Errors raised by the body composition model.

use thiserror::Error;

/// Failure modes of model construction and evaluation.
#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    /// Exactly one intake mode must be configured.
    #[error("exactly one of the intake table and the logistic intake parameters must be given")]
    ConfigurationConflict,

    /// The tabulated intake lookup ran past the end of the table.
    #[error("intake row {row} is out of range for a table with {rows} rows")]
    IndexOutOfRange { row: usize, rows: usize },

    /// A covariate lies outside its admissible domain.
    #[error("domain violation: {0}")]
    DomainViolation(String),

    /// Per-individual arrays disagree in length.
    #[error("{what} must have length {expected}, but has length {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}
