/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Self-loop augmentation and column-stochastic normalisation.
//!
//! Each column `j` is read as the outgoing transition distribution of node
//! `j`. After [`normalize`] every column with a positive sum sums to 1.
//!
//! # Zero-sum columns
//!
//! An isolated node with no self-loop has an all-zero column. Its scale
//! factor is 1, not `1/0`, so the column stays exactly zero and no NaN or
//! infinity ever enters the matrix. Such nodes later fall out of the
//! cluster result because their rows are zero too (after the first
//! expansion nothing flows into them).

use alloc::vec::Vec;

use crate::matrix::MarkovMatrix;

/// Add `weight` to every diagonal entry. No-op when `weight == 0`.
///
/// Self-loops let each node keep some of its own mass through every
/// expansion, which stops mass oscillating between symmetric neighbours.
pub fn augment<M: MarkovMatrix>(matrix: &mut M, weight: f64) {
    if weight != 0.0 {
        matrix.add_to_diagonal(weight);
    }
}

/// Scale every column to sum to 1.
///
/// Returns the number of zero-sum columns that were left untouched.
pub fn normalize<M: MarkovMatrix>(matrix: &mut M) -> usize {
    let sums = matrix.column_sums();
    let mut zero_columns = 0;
    let factors: Vec<f64> = sums
        .iter()
        .map(|&s| {
            if s > 0.0 {
                1.0 / s
            } else {
                zero_columns += 1;
                1.0
            }
        })
        .collect();
    matrix.scale_columns(&factors);
    zero_columns
}

/// `true` when every column sums to 1 within `tol`, or is entirely zero.
pub fn is_column_stochastic<M: MarkovMatrix>(matrix: &M, tol: f64) -> bool {
    matrix
        .column_sums()
        .iter()
        .all(|&s| s == 0.0 || libm::fabs(s - 1.0) <= tol)
}
