//! Pruning: erase small entries so expansion cost stays bounded.
//!
//! Runs after inflation and before expansion, so each product is paid for
//! at the pruned density. On [`crate::matrix::SparseMatrix`] erased entries
//! leave storage entirely; on [`crate::matrix::DenseMatrix`] they become
//! exact zeros.

use crate::matrix::MarkovMatrix;

/// Erase every entry strictly below `threshold`.
///
/// Returns how many nonzero entries were removed. A zero threshold is a
/// no-op.
pub fn prune<M: MarkovMatrix>(matrix: &mut M, threshold: f64) -> usize {
    if threshold <= 0.0 {
        return 0;
    }
    let before = matrix.nonzeros();
    matrix.erase_below(threshold);
    before - matrix.nonzeros()
}
