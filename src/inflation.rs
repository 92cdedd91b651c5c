/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Inflation: elementwise re-sharpening of transition weights.
//!
//! Every entry `x` becomes `x^r`. With `r > 1` strong transitions gain on
//! weak ones within each column. Powering does not preserve column sums,
//! so inflation is always followed by [`crate::stochastic::normalize`].

use crate::error::{MclError, Result};
use crate::matrix::MarkovMatrix;

/// Raise every entry to `exponent`.
///
/// `exponent` must be finite and strictly positive; otherwise the matrix
/// is left untouched and [`MclError::InvalidInflation`] is returned.
/// Zeros stay zero.
pub fn inflate<M: MarkovMatrix>(matrix: &mut M, exponent: f64) -> Result<()> {
    if !(exponent.is_finite() && exponent > 0.0) {
        return Err(MclError::InvalidInflation(exponent));
    }
    if exponent != 1.0 {
        matrix.pow_elementwise(exponent);
    }
    Ok(())
}
