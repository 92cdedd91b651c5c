/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Iteration driver: the MCL loop as an explicit state machine.
//!
//! ```text
//! Init ──augment + normalise──▶ Normalized
//!   ┌──────────────────────────────┘
//!   ▼
//! Inflated ──prune──▶ Pruned ──normalise + expand──▶ Expanded ──check──▶ ConvergenceChecked
//!   ▲                                                                      │
//!   └─────────────── not converged and iteration < max ◀──────────────────┤
//!                                                                          ▼
//!                                                                         Done
//! ```
//!
//! Augmentation happens exactly once, on the `Init → Normalized` edge.
//! Every later pass goes through the loop body. Reaching `Done` by
//! convergence and reaching it by the iteration cap are both successful
//! outcomes; [`ConvergenceReport::converged`] tells them apart.
//!
//! Iterations are strictly sequential. Parallelism lives inside each stage
//! (row passes, products), never across stages.

use core::mem;

use tracing::{debug, info};

use crate::convergence::{ConvergenceDetector, ConvergenceReport, Verdict};
use crate::error::{MclError, Result};
use crate::expansion::expand;
use crate::inflation::inflate;
use crate::matrix::MarkovMatrix;
use crate::pruning::prune;
use crate::settings::Settings;
use crate::stochastic::{augment, normalize};

/// Position of the driver in the MCL state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Nothing applied yet.
    Init,
    /// Self-loops added and columns normalised (one-time phase complete).
    Normalized,
    /// Elementwise power applied.
    Inflated,
    /// Small entries erased.
    Pruned,
    /// Columns re-normalised and matrix power applied.
    Expanded,
    /// Convergence measured for the current iteration.
    ConvergenceChecked,
    /// Loop finished (converged or capped).
    Done,
}

/// Drives one MCL run over a caller-owned matrix.
///
/// The matrix is borrowed mutably for the whole run and rewritten in place
/// by every stage.
pub struct MclDriver<'m, M: MarkovMatrix> {
    matrix: &'m mut M,
    settings: Settings,
    stage: Stage,
    iteration: usize,
    pre_expansion: Option<M>,
    detector: ConvergenceDetector<M>,
    last: Option<Verdict>,
}

impl<'m, M: MarkovMatrix> MclDriver<'m, M> {
    /// Validate settings and input, then park the driver in [`Stage::Init`].
    ///
    /// Nothing is written to `matrix` if this fails.
    pub fn new(matrix: &'m mut M, settings: Settings) -> Result<Self> {
        settings.validate()?;
        if let Some((row, col, value)) = matrix.first_invalid_entry() {
            return Err(MclError::InvalidEntries { row, col, value });
        }
        Ok(Self {
            matrix,
            settings,
            stage: Stage::Init,
            iteration: 0,
            pre_expansion: None,
            detector: ConvergenceDetector::from_settings(&settings),
            last: None,
        })
    }

    /// Current stage.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Completed loop iterations.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Read-only view of the current iterate.
    pub fn matrix(&self) -> &M {
        &*self.matrix
    }

    /// Perform exactly one transition and return the new stage.
    ///
    /// Calling this in [`Stage::Done`] does nothing.
    pub fn advance(&mut self) -> Result<Stage> {
        self.stage = match self.stage {
            Stage::Init => {
                augment(self.matrix, self.settings.self_loop_weight);
                let isolated = normalize(self.matrix);
                debug!(
                    nodes = self.matrix.dim(),
                    isolated,
                    self_loop = self.settings.self_loop_weight,
                    "mcl initialised"
                );
                Stage::Normalized
            }
            Stage::Normalized => self.inflate()?,
            Stage::ConvergenceChecked if self.should_stop() => {
                let report = self.report();
                info!(
                    converged = report.converged,
                    iterations = report.iterations,
                    residual = report.residual,
                    "mcl finished"
                );
                Stage::Done
            }
            Stage::ConvergenceChecked => self.inflate()?,
            Stage::Inflated => {
                prune(self.matrix, self.settings.prune_threshold);
                Stage::Pruned
            }
            Stage::Pruned => {
                normalize(self.matrix);
                let expanded = expand(&*self.matrix, self.settings.expansion);
                self.pre_expansion = Some(mem::replace(self.matrix, expanded));
                Stage::Expanded
            }
            Stage::Expanded => {
                if let Some(pre) = self.pre_expansion.take() {
                    let verdict = self.detector.check(&pre, self.matrix);
                    self.last = Some(verdict);
                }
                self.iteration += 1;
                debug!(
                    iteration = self.iteration,
                    measure = self.last.map_or(f64::INFINITY, |v| v.measure),
                    stored = self.matrix.stored_entries(),
                    "mcl iteration"
                );
                Stage::ConvergenceChecked
            }
            Stage::Done => Stage::Done,
        };
        Ok(self.stage)
    }

    /// Advance until [`Stage::Done`] and report how the loop ended.
    pub fn run(mut self) -> Result<ConvergenceReport> {
        while self.advance()? != Stage::Done {}
        Ok(self.report())
    }

    /// Convergence state so far.
    pub fn report(&self) -> ConvergenceReport {
        ConvergenceReport {
            converged: self.last.is_some_and(|v| v.converged),
            iterations: self.iteration,
            residual: self.last.map_or(f64::INFINITY, |v| v.measure),
        }
    }

    fn should_stop(&self) -> bool {
        self.iteration >= self.settings.max_iterations || self.last.is_some_and(|v| v.converged)
    }

    fn inflate(&mut self) -> Result<Stage> {
        inflate(self.matrix, self.settings.inflation)?;
        Ok(Stage::Inflated)
    }
}
