//! Error types for structured error handling.
//!
//! This module provides `ProcessError`, the single error taxonomy shared by
//! the distribution type, the linear-algebra helpers, and the process layer:
//! - `InvalidConfiguration`: invalid constructor arguments, raised eagerly
//! - `UnsupportedOperation`: an operation the process variant cannot perform
//! - `NumericalFailure`: a numerical step broke down (e.g. Cholesky on a
//!   covariance that is not positive definite)

use thiserror::Error;

/// Categorised process errors.
///
/// Construction fails fast: a process that was successfully constructed
/// never raises `InvalidConfiguration` from `propagate`/`propagate_distr`.
/// Numerical failures during propagation are surfaced unmodified; they are
/// the caller's responsibility to handle and are never silently recovered.
///
/// # Examples
/// ```
/// use ito_core::types::ProcessError;
///
/// let err = ProcessError::InvalidConfiguration {
///     reason: "mean has 2 rows but vol has 3".to_string(),
/// };
/// assert_eq!(
///     format!("{}", err),
///     "Invalid configuration: mean has 2 rows but vol has 3"
/// );
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProcessError {
    /// Invalid constructor arguments (mismatched row counts, non-square
    /// transition matrix, non-positive dimension).
    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration {
        /// What was wrong with the supplied arguments.
        reason: String,
    },

    /// The requested operation has no implementation for this variant.
    #[error("Unsupported operation: {reason}")]
    UnsupportedOperation {
        /// Why the operation is unavailable.
        reason: String,
    },

    /// A numerical step failed.
    #[error("Numerical failure in {context}: {reason}")]
    NumericalFailure {
        /// The operation that failed (e.g. "cholesky").
        context: &'static str,
        /// What went wrong.
        reason: String,
    },
}

impl ProcessError {
    /// Shorthand for an `InvalidConfiguration` error.
    pub fn config(reason: impl Into<String>) -> Self {
        ProcessError::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// Shorthand for an `UnsupportedOperation` error.
    pub fn unsupported(reason: impl Into<String>) -> Self {
        ProcessError::UnsupportedOperation {
            reason: reason.into(),
        }
    }

    /// Shorthand for a `NumericalFailure` error.
    pub fn numerical(context: &'static str, reason: impl Into<String>) -> Self {
        ProcessError::NumericalFailure {
            context,
            reason: reason.into(),
        }
    }
}
