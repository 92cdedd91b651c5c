//! Dense row-major backend.

use alloc::vec;
use alloc::vec::Vec;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::{range_of, MarkovMatrix};
use crate::error::{MclError, Result};

/// Square matrix stored as a flat row-major `Vec<f64>` with row stride `n`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DenseMatrix {
    n: usize,
    data: Vec<f64>,
}

impl DenseMatrix {
    /// All-zero `n × n` matrix.
    pub fn zeros(n: usize) -> Self {
        Self { n, data: vec![0.0; n * n] }
    }

    /// `n × n` identity.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n);
        for i in 0..n {
            m.data[i * n + i] = 1.0;
        }
        m
    }

    /// Build from a list of rows. Every row must have `rows.len()` entries.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self> {
        let n = rows.len();
        let mut data = Vec::with_capacity(n * n);
        for row in rows {
            let row = row.as_ref();
            if row.len() != n {
                return Err(MclError::DimensionMismatch { expected: n, actual: row.len() });
            }
            data.extend_from_slice(row);
        }
        Ok(Self { n, data })
    }

    /// Wrap an existing row-major buffer of length `n * n`.
    pub fn from_row_major(n: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != n * n {
            return Err(MclError::DimensionMismatch { expected: n * n, actual: data.len() });
        }
        Ok(Self { n, data })
    }

    /// Row-major view of every entry.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// One row as a slice.
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.n..(row + 1) * self.n]
    }

    /// Run `f` over every row, on the rayon pool when `parallel` is enabled.
    fn for_each_row_mut<F>(&mut self, f: F)
    where
        F: Fn(usize, &mut [f64]) + Send + Sync,
    {
        if self.n == 0 {
            return;
        }
        #[cfg(feature = "parallel")]
        self.data
            .par_chunks_mut(self.n)
            .enumerate()
            .for_each(|(i, row)| f(i, row));
        #[cfg(not(feature = "parallel"))]
        self.data
            .chunks_mut(self.n)
            .enumerate()
            .for_each(|(i, row)| f(i, row));
    }

    /// Row `i` of `self · rhs`, written into `out`.
    fn product_row(&self, rhs: &Self, i: usize, out: &mut [f64]) {
        for (k, &a) in self.row(i).iter().enumerate() {
            if a == 0.0 {
                continue;
            }
            for (o, &b) in out.iter_mut().zip(rhs.row(k)) {
                *o += a * b;
            }
        }
    }
}

impl MarkovMatrix for DenseMatrix {
    fn dim(&self) -> usize {
        self.n
    }

    fn get(&self, row: usize, col: usize) -> f64 {
        assert!(col < self.n, "column {col} out of range for dimension {}", self.n);
        self.data[row * self.n + col]
    }

    fn set(&mut self, row: usize, col: usize, value: f64) {
        assert!(col < self.n, "column {col} out of range for dimension {}", self.n);
        self.data[row * self.n + col] = value;
    }

    fn add_to_diagonal(&mut self, weight: f64) {
        let n = self.n;
        for i in 0..n {
            self.data[i * n + i] += weight;
        }
    }

    fn column_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.n];
        if self.n == 0 {
            return sums;
        }
        for row in self.data.chunks(self.n) {
            for (s, &x) in sums.iter_mut().zip(row) {
                *s += x;
            }
        }
        sums
    }

    fn scale_columns(&mut self, factors: &[f64]) {
        assert_eq!(factors.len(), self.n, "one factor per column");
        self.for_each_row_mut(|_, row| {
            for (x, &f) in row.iter_mut().zip(factors) {
                *x *= f;
            }
        });
    }

    fn map_stored<F>(&mut self, f: F)
    where
        F: Fn(f64) -> f64 + Send + Sync,
    {
        self.for_each_row_mut(|_, row| {
            for x in row.iter_mut() {
                *x = f(*x);
            }
        });
    }

    fn erase_below(&mut self, threshold: f64) {
        self.for_each_row_mut(|_, row| {
            for x in row.iter_mut() {
                if *x < threshold {
                    *x = 0.0;
                }
            }
        });
    }

    fn matmul(&self, rhs: &Self) -> Self {
        assert_eq!(self.n, rhs.n, "matmul dimension mismatch");
        let mut out = Self::zeros(self.n);
        if self.n == 0 {
            return out;
        }
        #[cfg(feature = "parallel")]
        out.data
            .par_chunks_mut(self.n)
            .enumerate()
            .for_each(|(i, row)| self.product_row(rhs, i, row));
        #[cfg(not(feature = "parallel"))]
        out.data
            .chunks_mut(self.n)
            .enumerate()
            .for_each(|(i, row)| self.product_row(rhs, i, row));
        out
    }

    fn row_entries(&self, row: usize) -> Vec<(usize, f64)> {
        self.row(row)
            .iter()
            .enumerate()
            .filter(|(_, &x)| x != 0.0)
            .map(|(j, &x)| (j, x))
            .collect()
    }

    fn row_max(&self, row: usize) -> f64 {
        self.row(row).iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    fn difference_range(&self, rhs: &Self) -> (f64, f64) {
        assert_eq!(self.n, rhs.n, "difference_range dimension mismatch");
        range_of(self.data.iter().zip(&rhs.data).map(|(a, b)| a - b)).unwrap_or((0.0, 0.0))
    }

    fn stored_entries(&self) -> usize {
        self.data.len()
    }

    fn nonzeros(&self) -> usize {
        self.data.iter().filter(|&&x| x != 0.0).count()
    }

    fn first_invalid_entry(&self) -> Option<(usize, usize, f64)> {
        let n = self.n;
        self.data
            .iter()
            .position(|&x| !(x.is_finite() && x >= 0.0))
            .map(|idx| (idx / n, idx % n, self.data[idx]))
    }
}
