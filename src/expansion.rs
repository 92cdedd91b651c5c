/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Expansion: integer matrix power (multi-step diffusion).
//!
//! `M^e` spreads each node's mass along every path of length `e`.
//!
//! | Factor | Schedule |
//! |--------|----------|
//! | 2 | `M·M` |
//! | 3 | `(M·M)·M` |
//! | 4 | `(M·M)·(M·M)` |

use crate::error::Result;
use crate::matrix::MarkovMatrix;
use crate::settings::ExpansionFactor;

/// `matrix` raised to `factor` by repeated matrix multiplication.
pub fn expand<M: MarkovMatrix>(matrix: &M, factor: ExpansionFactor) -> M {
    let square = matrix.matmul(matrix);
    match factor {
        ExpansionFactor::Two => square,
        ExpansionFactor::Three => square.matmul(matrix),
        ExpansionFactor::Four => square.matmul(&square),
    }
}

/// Like [`expand`], taking the factor as a raw integer.
///
/// Factors outside `{2, 3, 4}` fail before any multiplication happens.
pub fn expand_raw<M: MarkovMatrix>(matrix: &M, factor: u32) -> Result<M> {
    let factor = ExpansionFactor::try_from(factor)?;
    Ok(expand(matrix, factor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MclError;
    use crate::matrix::{DenseMatrix, SparseMatrix};

    fn sample() -> DenseMatrix {
        DenseMatrix::from_rows(&[[0.5, 0.25, 0.0], [0.5, 0.5, 0.5], [0.0, 0.25, 0.5]]).unwrap()
    }

    #[test]
    fn factor_two_is_one_squaring() {
        let m = sample();
        assert_eq!(expand(&m, ExpansionFactor::Two), m.matmul(&m));
    }

    #[test]
    fn factor_three_is_triple_product() {
        let m = sample();
        assert_eq!(expand(&m, ExpansionFactor::Three), m.matmul(&m).matmul(&m));
    }

    #[test]
    fn factor_four_is_double_squaring() {
        let m = sample();
        let sq = m.matmul(&m);
        assert_eq!(expand(&m, ExpansionFactor::Four), sq.matmul(&sq));
    }

    #[test]
    fn sparse_expansion_matches_dense() {
        let dense = sample();
        let sparse = SparseMatrix::from_dense(&dense);
        for factor in [ExpansionFactor::Two, ExpansionFactor::Three, ExpansionFactor::Four] {
            assert_eq!(expand(&sparse, factor).to_dense(), expand(&dense, factor));
        }
    }

    #[test]
    fn invalid_raw_factor_is_an_error() {
        let m = sample();
        assert_eq!(expand_raw(&m, 5), Err(MclError::InvalidExpansionFactor(5)));
        assert_eq!(expand_raw(&m, 1), Err(MclError::InvalidExpansionFactor(1)));
        assert!(expand_raw(&m, 3).is_ok());
    }
}
