//! Matrix capability set consumed by the MCL loop.
//!
//! The loop never branches on representation. It is written once against
//! [`MarkovMatrix`], and the two backends below implement that trait:
//!
//! | Backend | Storage | Pruning |
//! |---------|---------|---------|
//! | [`DenseMatrix`] | flat row-major `Vec<f64>`, row stride `n` | writes exact zeros |
//! | [`SparseMatrix`] | sorted `(column, value)` list per row | drops entries from storage |
//!
//! Per-row passes run on the rayon pool when the `parallel` feature is on.
//! Each worker owns a disjoint row, so no locking is involved. Reductions
//! across rows (column sums, difference ranges) always run in row order so
//! the result does not depend on scheduling.
//!
//! # Two kinds of power
//!
//! [`MarkovMatrix::pow_elementwise`] raises every entry to a real exponent
//! (inflation). [`MarkovMatrix::matmul`] is the matrix product, which
//! expansion applies repeatedly. They are kept as separately named
//! operations on purpose.

use alloc::vec::Vec;

pub mod dense;
pub mod sparse;

pub use dense::DenseMatrix;
pub use sparse::SparseMatrix;

/// Square non-negative matrix operations required by the MCL loop.
///
/// Indices are `(row, col)` with `0 <= row, col < dim()`. Out-of-range
/// indices panic, as slice indexing does.
pub trait MarkovMatrix: Clone + Send + Sync {
    /// Number of rows (= number of columns).
    fn dim(&self) -> usize;

    /// Entry at `(row, col)`; implicit zeros read as `0.0`.
    fn get(&self, row: usize, col: usize) -> f64;

    /// Overwrite the entry at `(row, col)`.
    ///
    /// Writing `0.0` into a sparse backend removes the stored entry.
    fn set(&mut self, row: usize, col: usize, value: f64);

    /// Add `weight` to every diagonal entry, creating missing entries.
    fn add_to_diagonal(&mut self, weight: f64);

    /// Sum of every column, indexed by column.
    fn column_sums(&self) -> Vec<f64>;

    /// Multiply every entry of column `j` by `factors[j]`.
    fn scale_columns(&mut self, factors: &[f64]);

    /// Apply `f` to every stored entry. `f(0.0)` must be `0.0`.
    fn map_stored<F>(&mut self, f: F)
    where
        F: Fn(f64) -> f64 + Send + Sync;

    /// Raise every entry to `exponent` (elementwise, not a matrix power).
    fn pow_elementwise(&mut self, exponent: f64) {
        self.map_stored(|x| if x == 0.0 { 0.0 } else { libm::pow(x, exponent) });
    }

    /// Erase every entry strictly below `threshold`.
    fn erase_below(&mut self, threshold: f64);

    /// Matrix product `self · rhs`.
    fn matmul(&self, rhs: &Self) -> Self;

    /// Nonzero entries of a row as `(column, value)`, ascending by column.
    fn row_entries(&self, row: usize) -> Vec<(usize, f64)>;

    /// Largest entry of a row (implicit zeros included).
    fn row_max(&self, row: usize) -> f64;

    /// `(min, max)` over all entries of `self − rhs`.
    ///
    /// Both matrices must have the same dimension.
    fn difference_range(&self, rhs: &Self) -> (f64, f64);

    /// Number of physically stored entries.
    fn stored_entries(&self) -> usize;

    /// Number of entries that are not exactly zero.
    fn nonzeros(&self) -> usize {
        (0..self.dim()).map(|r| self.row_entries(r).len()).sum()
    }

    /// First entry that is negative or not finite, if any.
    fn first_invalid_entry(&self) -> Option<(usize, usize, f64)>;
}

/// Fold `(min, max)` over a sequence of differences.
pub(crate) fn range_of(diffs: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    diffs.fold(None, |acc, d| match acc {
        None => Some((d, d)),
        Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
    })
}
