//! Python FFI bindings via PyO3.
//!
//! Exposes one entry point. The matrix arrives as a list of dense rows,
//! is copied into a [`SparseMatrix`] and clustered on the sparse backend.
//!
//! # Building the Python extension
//!
//! ```bash
//! pip install maturin
//! maturin develop --features python-ffi
//! ```
//!
//! # Usage
//!
//! ```python
//! from mcl_core import mcl
//!
//! rows = [[0, 1, 0, 0], [1, 0, 0, 0], [0, 0, 0, 1], [0, 0, 1, 0]]
//! centers, assignments, iterations, converged = mcl(rows, inflation=2.0)
//! print(centers)       # [0, 2]
//! print(assignments)   # [[(0, 0.5), (1, 0.5)], [(2, 0.5), (3, 0.5)]]
//! ```

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::error::MclError;
use crate::matrix::{DenseMatrix, SparseMatrix};
use crate::settings::Settings;

fn to_py_err(e: MclError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// Cluster an affinity matrix with MCL.
///
/// Args:
///     matrix:          square list of rows, non-negative floats
///     expansion:       matrix power per iteration (2, 3 or 4)
///     inflation:       elementwise exponent, > 0
///     self_loop:       weight added to the diagonal before the first pass
///     max_iterations:  iteration cap
///     prune_threshold: entries below this are dropped each iteration
///     tolerance:       convergence tolerance (0 disables early stopping)
///
/// Returns:
///     (centers, assignments, iterations, converged)
#[pyfunction]
#[pyo3(signature = (
    matrix,
    expansion = 2,
    inflation = 2.0,
    self_loop = 1.0,
    max_iterations = 1000,
    prune_threshold = 1e-9,
    tolerance = 1e-9
))]
#[allow(clippy::too_many_arguments, clippy::type_complexity)]
pub fn mcl(
    matrix: Vec<Vec<f64>>,
    expansion: u32,
    inflation: f64,
    self_loop: f64,
    max_iterations: usize,
    prune_threshold: f64,
    tolerance: f64,
) -> PyResult<(Vec<usize>, Vec<Vec<(usize, f64)>>, usize, bool)> {
    let settings = Settings::new(
        expansion,
        inflation,
        self_loop,
        max_iterations,
        prune_threshold,
        tolerance,
    )
    .map_err(to_py_err)?;
    let dense = DenseMatrix::from_rows(&matrix).map_err(to_py_err)?;
    let mut sparse = SparseMatrix::from_dense(&dense);
    let result = crate::run(&mut sparse, &settings).map_err(to_py_err)?;
    Ok((
        result.centers,
        result.assignments,
        result.report.iterations,
        result.report.converged,
    ))
}

// ── Module entry point ────────────────────────────────────────────────────────

/// Markov Cluster (MCL) algorithm Python bindings.
#[pymodule]
pub fn mcl_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(mcl, m)?)?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}
