//! # mcl-core
//!
//! Markov Cluster (MCL) algorithm over dense and sparse affinity matrices.
//!
//! Given an `N × N` non-negative affinity matrix, MCL alternates two
//! operators on a column-stochastic iterate until it stops changing:
//!
//! - **Expansion**: matrix power. Mass diffuses along paths.
//! - **Inflation**: elementwise power plus renormalisation. Strong
//!   transitions win over weak ones.
//!
//! The fixed point is block structured. Its surviving nonzero rows are the
//! cluster attractors, and each attractor row lists the nodes it attracts.
//!
//! ## The pipeline
//!
//! ```text
//! Settings + matrix → MclDriver ─┬─ Init: augment → normalise
//!                                └─ Loop: inflate → prune → normalise → expand → converged?
//!                              → extract → ClusterResult { centers, assignments }
//! ```
//!
//! ## Module overview
//!
//! | Module | Key items | What it does |
//! |--------|-----------|--------------|
//! | [`matrix`] | [`MarkovMatrix`], [`DenseMatrix`], [`SparseMatrix`] | Capability set the loop is generic over |
//! | [`settings`] | [`Settings`], [`ExpansionFactor`], [`ConvergenceMetric`] | Per-run configuration and validation |
//! | [`stochastic`] | [`stochastic::augment`], [`stochastic::normalize`] | Self-loops and column normalisation |
//! | [`inflation`] | [`inflation::inflate`] | Elementwise power |
//! | [`expansion`] | [`expansion::expand`] | Matrix power |
//! | [`pruning`] | [`pruning::prune`] | Threshold erase |
//! | [`convergence`] | [`ConvergenceDetector`], [`ConvergenceReport`] | Stopping rule |
//! | [`driver`] | [`MclDriver`], [`Stage`] | Loop state machine |
//! | [`extract`] | [`ClusterResult`], [`Cluster`] | Attractor scan |
//!
//! ## Example
//!
//! ```
//! use mcl_core::{run, DenseMatrix, Settings};
//!
//! let mut m = DenseMatrix::from_rows(&[
//!     [0.0, 1.0, 0.0, 0.0],
//!     [1.0, 0.0, 0.0, 0.0],
//!     [0.0, 0.0, 0.0, 1.0],
//!     [0.0, 0.0, 1.0, 0.0],
//! ])
//! .unwrap();
//! let clusters = run(&mut m, &Settings::default()).unwrap();
//! assert_eq!(clusters.centers, vec![0, 2]);
//! ```
//!
//! ## Features
//!
//! | Feature | Effect |
//! |---------|--------|
//! | `std` | Links `std` |
//! | `parallel` | Row-parallel passes and products on rayon (implies `std`) |
//! | `serde` | Serialisation for settings, matrices and results |
//! | `python-ffi` | PyO3 bindings (implies `std`) |
//!
//! ## `no_std`
//!
//! The crate is `#![no_std]` with `alloc` unless `std` is enabled.
//! Elementwise powers go through `libm`.

#![cfg_attr(not(any(feature = "std", feature = "python-ffi")), no_std)]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

pub mod convergence;
pub mod driver;
pub mod error;
pub mod expansion;
pub mod extract;
pub mod inflation;
pub mod matrix;
pub mod pruning;
pub mod settings;
pub mod stochastic;

#[cfg(feature = "python-ffi")]
pub mod ffi;

pub use convergence::{ConvergenceDetector, ConvergenceReport};
pub use driver::{MclDriver, Stage};
pub use error::{MclError, Result};
pub use extract::{extract, Cluster, ClusterResult};
pub use matrix::{DenseMatrix, MarkovMatrix, SparseMatrix};
pub use settings::{ConvergenceMetric, ExpansionFactor, Settings};

/// Run MCL on `matrix` and extract the clusters.
///
/// `matrix` is rewritten in place and holds the final iterate afterwards.
/// Invalid settings or a negative / non-finite entry are reported before
/// anything is written.
pub fn run<M: MarkovMatrix>(matrix: &mut M, settings: &Settings) -> Result<ClusterResult> {
    let report = MclDriver::new(matrix, *settings)?.run()?;
    Ok(extract(matrix, report))
}
