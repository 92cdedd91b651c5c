/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Convergence detection for the MCL loop.
//!
//! MCL has settled once expansion no longer changes the iterate: the matrix
//! is (nearly) idempotent and its rows have split into attractor blocks.
//! Two measures are available, chosen by [`ConvergenceMetric`]:
//!
//! - **ExpansionDispersion**: `max(E − P) − min(E − P)` where `P` is the
//!   iterate right before expansion and `E = P^e` right after. For `e = 2`
//!   this is the range of `P² − P`.
//! - **IterateChange**: `max |E_k − E_{k−1}|` between consecutive
//!   post-expansion iterates. The first check compares against `P`.
//!
//! A measure `<= tolerance` stops the loop. A tolerance of zero turns the
//! detector off: measures are still reported, the verdict is never
//! "converged".

use crate::matrix::MarkovMatrix;
use crate::settings::{ConvergenceMetric, Settings};

/// Outcome of one MCL run's iteration phase.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConvergenceReport {
    /// Whether the convergence measure reached the tolerance before the cap.
    pub converged: bool,
    /// Number of full loop iterations performed.
    pub iterations: usize,
    /// Convergence measure after the final iteration.
    pub residual: f64,
}

/// Result of a single convergence check.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Verdict {
    /// Value of the configured measure.
    pub measure: f64,
    /// `true` when detection is enabled and `measure <= tolerance`.
    pub converged: bool,
}

/// Range `max − min` of `a − b`, entrywise.
pub fn dispersion<M: MarkovMatrix>(a: &M, b: &M) -> f64 {
    let (lo, hi) = a.difference_range(b);
    hi - lo
}

/// Largest `|a − b|`, entrywise.
pub fn max_abs_change<M: MarkovMatrix>(a: &M, b: &M) -> f64 {
    let (lo, hi) = a.difference_range(b);
    libm::fabs(lo).max(libm::fabs(hi))
}

/// Stateful convergence check, owned by the driver for one run.
#[derive(Clone, Debug)]
pub struct ConvergenceDetector<M> {
    metric: ConvergenceMetric,
    tolerance: f64,
    previous: Option<M>,
}

impl<M: MarkovMatrix> ConvergenceDetector<M> {
    /// Create a detector. `tolerance == 0` disables the stop signal.
    pub fn new(metric: ConvergenceMetric, tolerance: f64) -> Self {
        Self { metric, tolerance, previous: None }
    }

    /// Detector configured from run settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.metric, settings.convergence_tolerance)
    }

    /// Compare the iterate before and after one expansion.
    pub fn check(&mut self, pre_expansion: &M, expanded: &M) -> Verdict {
        let measure = match self.metric {
            ConvergenceMetric::ExpansionDispersion => dispersion(expanded, pre_expansion),
            ConvergenceMetric::IterateChange => {
                let baseline = self.previous.as_ref().unwrap_or(pre_expansion);
                let change = max_abs_change(expanded, baseline);
                self.previous = Some(expanded.clone());
                change
            }
        };
        Verdict { measure, converged: self.tolerance > 0.0 && measure <= self.tolerance }
    }
}
