//! Row-compressed sparse backend.
//!
//! Each row is a `Vec<(column, value)>` kept sorted by column with no
//! duplicate columns and no stored zeros. Pruning drops entries from the
//! row, so the stored count shrinks with it and later products get cheaper.
//!
//! Products use Gustavson's row-by-row scheme: row `i` of `A·B` is the sum of
//! `A[i,k] · B[k,:]` over the stored `k`, accumulated in a hash map and then
//! sorted. Accumulation visits `k` in ascending order, so each output value
//! is summed in the same order on every run.

use alloc::vec;
use alloc::vec::Vec;

use hashbrown::HashMap;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::{range_of, DenseMatrix, MarkovMatrix};
use crate::error::{MclError, Result};

type Row = Vec<(usize, f64)>;

/// Square sparse matrix, one sorted entry list per row.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SparseMatrix {
    n: usize,
    rows: Vec<Row>,
}

impl SparseMatrix {
    /// Empty `n × n` matrix (no stored entries).
    pub fn zeros(n: usize) -> Self {
        Self { n, rows: vec![Vec::new(); n] }
    }

    /// `n × n` identity.
    pub fn identity(n: usize) -> Self {
        Self { n, rows: (0..n).map(|i| vec![(i, 1.0)]).collect() }
    }

    /// Build from `(row, col, value)` triplets.
    ///
    /// Duplicate positions are summed and zero values are not stored.
    /// Any index `>= n` is a [`MclError::DimensionMismatch`].
    pub fn from_triplets<I>(n: usize, triplets: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, usize, f64)>,
    {
        let mut rows: Vec<Row> = vec![Vec::new(); n];
        for (r, c, v) in triplets {
            let out_of_range = r.max(c);
            if out_of_range >= n {
                return Err(MclError::DimensionMismatch { expected: n, actual: out_of_range });
            }
            rows[r].push((c, v));
        }
        for row in rows.iter_mut() {
            row.sort_by_key(|&(c, _)| c);
            row.dedup_by(|later, kept| {
                if later.0 == kept.0 {
                    kept.1 += later.1;
                    true
                } else {
                    false
                }
            });
            row.retain(|&(_, v)| v != 0.0);
        }
        Ok(Self { n, rows })
    }

    /// Copy the nonzero entries of a dense matrix.
    pub fn from_dense(dense: &DenseMatrix) -> Self {
        let n = dense.dim();
        Self { n, rows: (0..n).map(|i| dense.row_entries(i)).collect() }
    }

    /// Expand into a dense matrix.
    pub fn to_dense(&self) -> DenseMatrix {
        let mut dense = DenseMatrix::zeros(self.n);
        for (i, row) in self.rows.iter().enumerate() {
            for &(j, v) in row {
                dense.set(i, j, v);
            }
        }
        dense
    }

    /// Stored entries of one row.
    pub fn row(&self, row: usize) -> &[(usize, f64)] {
        &self.rows[row]
    }

    fn for_each_row_mut<F>(&mut self, f: F)
    where
        F: Fn(usize, &mut Row) + Send + Sync,
    {
        #[cfg(feature = "parallel")]
        self.rows.par_iter_mut().enumerate().for_each(|(i, row)| f(i, row));
        #[cfg(not(feature = "parallel"))]
        self.rows.iter_mut().enumerate().for_each(|(i, row)| f(i, row));
    }

    fn product_row(&self, rhs: &Self, i: usize) -> Row {
        let mut acc: HashMap<usize, f64> = HashMap::new();
        for &(k, a) in &self.rows[i] {
            for &(j, b) in &rhs.rows[k] {
                *acc.entry(j).or_insert(0.0) += a * b;
            }
        }
        let mut row: Row = acc.into_iter().filter(|&(_, v)| v != 0.0).collect();
        row.sort_unstable_by_key(|&(c, _)| c);
        row
    }
}

impl MarkovMatrix for SparseMatrix {
    fn dim(&self) -> usize {
        self.n
    }

    fn get(&self, row: usize, col: usize) -> f64 {
        assert!(col < self.n, "column {col} out of range for dimension {}", self.n);
        let r = &self.rows[row];
        match r.binary_search_by_key(&col, |&(c, _)| c) {
            Ok(pos) => r[pos].1,
            Err(_) => 0.0,
        }
    }

    fn set(&mut self, row: usize, col: usize, value: f64) {
        assert!(col < self.n, "column {col} out of range for dimension {}", self.n);
        let r = &mut self.rows[row];
        match r.binary_search_by_key(&col, |&(c, _)| c) {
            Ok(pos) if value == 0.0 => {
                r.remove(pos);
            }
            Ok(pos) => r[pos].1 = value,
            Err(_) if value == 0.0 => {}
            Err(pos) => r.insert(pos, (col, value)),
        }
    }

    fn add_to_diagonal(&mut self, weight: f64) {
        if weight == 0.0 {
            return;
        }
        self.for_each_row_mut(|i, row| match row.binary_search_by_key(&i, |&(c, _)| c) {
            Ok(pos) => row[pos].1 += weight,
            Err(pos) => row.insert(pos, (i, weight)),
        });
    }

    fn column_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.n];
        for row in &self.rows {
            for &(c, v) in row {
                sums[c] += v;
            }
        }
        sums
    }

    fn scale_columns(&mut self, factors: &[f64]) {
        assert_eq!(factors.len(), self.n, "one factor per column");
        self.for_each_row_mut(|_, row| {
            for (c, v) in row.iter_mut() {
                *v *= factors[*c];
            }
            row.retain(|&(_, v)| v != 0.0);
        });
    }

    fn map_stored<F>(&mut self, f: F)
    where
        F: Fn(f64) -> f64 + Send + Sync,
    {
        self.for_each_row_mut(|_, row| {
            for (_, v) in row.iter_mut() {
                *v = f(*v);
            }
            row.retain(|&(_, v)| v != 0.0);
        });
    }

    fn erase_below(&mut self, threshold: f64) {
        self.for_each_row_mut(|_, row| row.retain(|&(_, v)| v >= threshold));
    }

    fn matmul(&self, rhs: &Self) -> Self {
        assert_eq!(self.n, rhs.n, "matmul dimension mismatch");
        #[cfg(feature = "parallel")]
        let rows = (0..self.n).into_par_iter().map(|i| self.product_row(rhs, i)).collect();
        #[cfg(not(feature = "parallel"))]
        let rows = (0..self.n).map(|i| self.product_row(rhs, i)).collect();
        Self { n: self.n, rows }
    }

    fn row_entries(&self, row: usize) -> Vec<(usize, f64)> {
        self.rows[row].clone()
    }

    fn row_max(&self, row: usize) -> f64 {
        let r = &self.rows[row];
        let stored = r.iter().map(|&(_, v)| v).fold(f64::NEG_INFINITY, f64::max);
        if r.len() < self.n {
            stored.max(0.0)
        } else {
            stored
        }
    }

    fn difference_range(&self, rhs: &Self) -> (f64, f64) {
        assert_eq!(self.n, rhs.n, "difference_range dimension mismatch");
        let mut covered = 0usize;
        let mut acc: Option<(f64, f64)> = None;
        for (a, b) in self.rows.iter().zip(&rhs.rows) {
            let diffs = MergedDiff { a, b, i: 0, j: 0 };
            let row_range = range_of(diffs.inspect(|_| covered += 1));
            acc = match (acc, row_range) {
                (Some((lo, hi)), Some((rlo, rhi))) => Some((lo.min(rlo), hi.max(rhi))),
                (None, r) | (r, None) => r,
            };
        }
        // Positions absent from both operands differ by exactly zero.
        let (lo, hi) = acc.unwrap_or((0.0, 0.0));
        if covered < self.n * self.n {
            (lo.min(0.0), hi.max(0.0))
        } else {
            (lo, hi)
        }
    }

    fn stored_entries(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    fn nonzeros(&self) -> usize {
        self.stored_entries()
    }

    fn first_invalid_entry(&self) -> Option<(usize, usize, f64)> {
        self.rows.iter().enumerate().find_map(|(i, row)| {
            row.iter()
                .find(|&&(_, v)| !(v.is_finite() && v >= 0.0))
                .map(|&(j, v)| (i, j, v))
        })
    }
}

/// `a − b` over the union of two sorted rows.
struct MergedDiff<'a> {
    a: &'a [(usize, f64)],
    b: &'a [(usize, f64)],
    i: usize,
    j: usize,
}

impl Iterator for MergedDiff<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        match (self.a.get(self.i), self.b.get(self.j)) {
            (Some(&(ca, va)), Some(&(cb, vb))) => {
                if ca == cb {
                    self.i += 1;
                    self.j += 1;
                    Some(va - vb)
                } else if ca < cb {
                    self.i += 1;
                    Some(va)
                } else {
                    self.j += 1;
                    Some(-vb)
                }
            }
            (Some(&(_, va)), None) => {
                self.i += 1;
                Some(va)
            }
            (None, Some(&(_, vb))) => {
                self.j += 1;
                Some(-vb)
            }
            (None, None) => None,
        }
    }
}
