//! Error type shared by every MCL stage.
//!
//! Only configuration problems and malformed input are errors. Isolated
//! nodes (zero-sum columns) and hitting the iteration cap are normal
//! outcomes and never surface here.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, MclError>;

/// Errors raised before (or instead of) mutating the affinity matrix.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
#[non_exhaustive]
pub enum MclError {
    /// Expansion factor outside `{2, 3, 4}`.
    #[error("expansion factor must be 2, 3 or 4 (got {0})")]
    InvalidExpansionFactor(u32),

    /// Inflation exponent that is zero, negative, or not finite.
    ///
    /// `0^0` is NaN under elementwise power, so the exponent must be
    /// strictly positive.
    #[error("inflation exponent must be finite and strictly positive (got {0})")]
    InvalidInflation(f64),

    /// A parameter that must be finite and non-negative was not.
    #[error("{name} must be finite and non-negative (got {value})")]
    NegativeParameter {
        /// Settings field name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// `max_iterations` was zero.
    #[error("max_iterations must be at least 1")]
    ZeroIterations,

    /// The affinity matrix holds a negative or non-finite entry.
    #[error("affinity matrix entry ({row}, {col}) = {value} is negative or not finite")]
    InvalidEntries {
        /// Row of the first offending entry.
        row: usize,
        /// Column of the first offending entry.
        col: usize,
        /// The entry itself.
        value: f64,
    },

    /// Input shape does not describe a square matrix of the expected size.
    #[error("dimension mismatch (expected {expected}, got {actual})")]
    DimensionMismatch {
        /// Expected length or bound.
        expected: usize,
        /// Length or index actually supplied.
        actual: usize,
    },
}
