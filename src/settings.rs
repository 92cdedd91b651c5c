//! Per-run configuration for the MCL loop.
//!
//! A [`Settings`] value is built once before the run and never mutated while
//! the loop is iterating. Every constraint on its fields is checked by
//! [`Settings::validate`], which the driver calls before touching the matrix.
//!
//! # Defaults
//!
//! | Field | Default |
//! |-------|---------|
//! | `expansion` | [`ExpansionFactor::Two`] |
//! | `inflation` | 2.0 |
//! | `self_loop_weight` | 1.0 |
//! | `max_iterations` | 1000 |
//! | `prune_threshold` | 1e-9 |
//! | `convergence_tolerance` | 1e-9 |
//! | `metric` | [`ConvergenceMetric::ExpansionDispersion`] |

use crate::error::{MclError, Result};

// ─── ExpansionFactor ─────────────────────────────────────────────────────────

/// Integer matrix power applied during expansion.
///
/// Only the three factors the loop knows how to schedule exist as values;
/// anything else is rejected at conversion time by [`TryFrom<u32>`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u32", into = "u32"))]
pub enum ExpansionFactor {
    /// `M²`, one squaring.
    #[default]
    Two,
    /// `M³` as `(M·M)·M`.
    Three,
    /// `M⁴`, squaring twice.
    Four,
}

impl ExpansionFactor {
    /// The factor as a plain integer.
    pub fn get(self) -> u32 {
        match self {
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
        }
    }
}

impl TryFrom<u32> for ExpansionFactor {
    type Error = MclError;

    fn try_from(factor: u32) -> Result<Self> {
        match factor {
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            4 => Ok(Self::Four),
            other => Err(MclError::InvalidExpansionFactor(other)),
        }
    }
}

impl From<ExpansionFactor> for u32 {
    fn from(factor: ExpansionFactor) -> Self {
        factor.get()
    }
}

// ─── ConvergenceMetric ───────────────────────────────────────────────────────

/// Scalar used to decide whether the iterate has stopped changing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConvergenceMetric {
    /// Range (max − min) of `expanded − pre_expansion`, entrywise.
    ///
    /// With factor 2 this is exactly the range of `M² − M`: zero once the
    /// matrix is idempotent under expansion.
    #[default]
    ExpansionDispersion,
    /// Largest absolute entrywise change between consecutive iterates.
    IterateChange,
}

// ─── Settings ────────────────────────────────────────────────────────────────

/// Immutable configuration for one MCL run.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Settings {
    /// Matrix power used by the expansion step.
    pub expansion: ExpansionFactor,
    /// Elementwise exponent used by the inflation step. Must be > 0.
    pub inflation: f64,
    /// Weight added to every diagonal entry before the first normalisation.
    /// Zero disables augmentation.
    pub self_loop_weight: f64,
    /// Hard cap on loop iterations (inflate → prune → normalise → expand).
    pub max_iterations: usize,
    /// Entries strictly below this value are erased after inflation.
    pub prune_threshold: f64,
    /// The loop stops once the convergence measure is `<=` this value.
    /// Zero disables convergence detection; only the cap applies.
    pub convergence_tolerance: f64,
    /// Which convergence measure to compute.
    pub metric: ConvergenceMetric,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            expansion: ExpansionFactor::Two,
            inflation: 2.0,
            self_loop_weight: 1.0,
            max_iterations: 1000,
            prune_threshold: 1e-9,
            convergence_tolerance: 1e-9,
            metric: ConvergenceMetric::ExpansionDispersion,
        }
    }
}

impl Settings {
    /// Build settings from raw values, rejecting any invalid field.
    ///
    /// The metric starts at its default; use [`Settings::with_metric`] to change it.
    pub fn new(
        expansion: u32,
        inflation: f64,
        self_loop_weight: f64,
        max_iterations: usize,
        prune_threshold: f64,
        convergence_tolerance: f64,
    ) -> Result<Self> {
        let settings = Self {
            expansion: ExpansionFactor::try_from(expansion)?,
            inflation,
            self_loop_weight,
            max_iterations,
            prune_threshold,
            convergence_tolerance,
            metric: ConvergenceMetric::default(),
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Check every field constraint.
    pub fn validate(&self) -> Result<()> {
        if !(self.inflation.is_finite() && self.inflation > 0.0) {
            return Err(MclError::InvalidInflation(self.inflation));
        }
        non_negative("self_loop_weight", self.self_loop_weight)?;
        non_negative("prune_threshold", self.prune_threshold)?;
        non_negative("convergence_tolerance", self.convergence_tolerance)?;
        if self.max_iterations == 0 {
            return Err(MclError::ZeroIterations);
        }
        Ok(())
    }

    /// `true` when the loop may stop before `max_iterations`.
    pub fn convergence_enabled(&self) -> bool {
        self.convergence_tolerance > 0.0
    }

    /// Replace the expansion factor.
    pub fn with_expansion(mut self, expansion: ExpansionFactor) -> Self {
        self.expansion = expansion;
        self
    }

    /// Replace the inflation exponent.
    pub fn with_inflation(mut self, inflation: f64) -> Self {
        self.inflation = inflation;
        self
    }

    /// Replace the self-loop weight.
    pub fn with_self_loop_weight(mut self, weight: f64) -> Self {
        self.self_loop_weight = weight;
        self
    }

    /// Replace the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Replace the prune threshold.
    pub fn with_prune_threshold(mut self, threshold: f64) -> Self {
        self.prune_threshold = threshold;
        self
    }

    /// Replace the convergence tolerance.
    pub fn with_convergence_tolerance(mut self, tolerance: f64) -> Self {
        self.convergence_tolerance = tolerance;
        self
    }

    /// Replace the convergence metric.
    pub fn with_metric(mut self, metric: ConvergenceMetric) -> Self {
        self.metric = metric;
        self
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(MclError::NegativeParameter { name, value })
    }
}
