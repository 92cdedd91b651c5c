/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Attractor-based cluster extraction from a converged iterate.
//!
//! A row whose largest entry is strictly positive is an attractor. Its
//! nonzero entries are the nodes it attracts, weighted by membership
//! strength. All-zero rows (isolated nodes, or nodes drained into another
//! attractor's basin) never appear.
//!
//! # Attractor systems
//!
//! Symmetric blocks converge to several identical attractor rows, e.g. two
//! fully connected nodes both end at `[0.5, 0.5]`. Rows with the same
//! nonzero support form one attractor system and yield one cluster,
//! centred on the row carrying the most mass (lowest index on a tie).
//! Rows left over from expansion share the support but carry only a
//! residue of the mass.
//!
//! # Determinism
//!
//! The center scan is partition-then-merge. Each rayon worker collects
//! the attractors in its own chunk of rows, the chunks are concatenated and
//! the list is sorted ascending. The result is identical on every run,
//! however the rows were scheduled.

use alloc::vec::Vec;

use hashbrown::HashMap;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::debug;

use crate::convergence::ConvergenceReport;
use crate::matrix::MarkovMatrix;

/// One extracted cluster, borrowed from a [`ClusterResult`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cluster<'a> {
    /// Attractor row index.
    pub center: usize,
    /// `(node, weight)` pairs, ascending by node.
    pub members: &'a [(usize, f64)],
}

impl Cluster<'_> {
    /// Member node indices without weights.
    pub fn nodes(&self) -> impl Iterator<Item = usize> + '_ {
        self.members.iter().map(|&(node, _)| node)
    }

    /// Membership weight of `node`, or `None` if it is not a member.
    pub fn weight_of(&self, node: usize) -> Option<f64> {
        self.members
            .binary_search_by_key(&node, |&(n, _)| n)
            .ok()
            .map(|pos| self.members[pos].1)
    }
}

/// Centers and their member rows, index-aligned.
///
/// `assignments[i]` holds the members of `centers[i]`. The rows are copies,
/// so the result stays valid after the matrix is dropped or reused.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClusterResult {
    /// Number of nodes in the clustered matrix.
    pub nodes: usize,
    /// Attractor row indices, ascending.
    pub centers: Vec<usize>,
    /// Sparse `(node, weight)` row for each center.
    pub assignments: Vec<Vec<(usize, f64)>>,
    /// How the iteration phase ended.
    pub report: ConvergenceReport,
}

impl ClusterResult {
    /// Number of clusters.
    pub fn len(&self) -> usize {
        self.centers.len()
    }

    /// `true` when no attractor survived.
    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    /// Iterate clusters in center order.
    pub fn clusters(&self) -> impl Iterator<Item = Cluster<'_>> + '_ {
        self.centers
            .iter()
            .zip(&self.assignments)
            .map(|(&center, members)| Cluster { center, members })
    }

    /// Index of the cluster where `node` has its largest weight.
    ///
    /// Ties go to the lower cluster index. `None` if no cluster lists `node`.
    pub fn cluster_of(&self, node: usize) -> Option<usize> {
        self.clusters()
            .enumerate()
            .filter_map(|(idx, c)| c.weight_of(node).map(|w| (idx, w)))
            .fold(None, |best: Option<(usize, f64)>, (idx, w)| match best {
                Some((_, bw)) if bw >= w => best,
                _ => Some((idx, w)),
            })
            .map(|(idx, _)| idx)
    }

    /// Assign every node to the cluster where its weight is largest.
    ///
    /// Ties go to the lower cluster index. Nodes in no cluster map to `None`.
    pub fn hard_partition(&self) -> Vec<Option<usize>> {
        let mut best: Vec<Option<(usize, f64)>> = alloc::vec![None; self.nodes];
        for (idx, members) in self.assignments.iter().enumerate() {
            for &(node, w) in members {
                match best[node] {
                    Some((_, bw)) if bw >= w => {}
                    _ => best[node] = Some((idx, w)),
                }
            }
        }
        best.into_iter().map(|b| b.map(|(idx, _)| idx)).collect()
    }
}

/// Scan a converged matrix for attractors and copy out their rows.
pub fn extract<M: MarkovMatrix>(matrix: &M, report: ConvergenceReport) -> ClusterResult {
    let attractors = attractor_rows(matrix);

    // Rows with identical support form one system. The heaviest row holds
    // the system's mass and becomes its center; ties keep the lower index.
    let mut systems: HashMap<Vec<usize>, usize> = HashMap::new();
    let mut heaviest: Vec<(usize, f64, Vec<(usize, f64)>)> = Vec::new();
    for row in attractors {
        let members = matrix.row_entries(row);
        let mass: f64 = members.iter().map(|&(_, w)| w).sum();
        let support: Vec<usize> = members.iter().map(|&(c, _)| c).collect();
        match systems.get(&support) {
            Some(&slot) => {
                if mass > heaviest[slot].1 {
                    heaviest[slot] = (row, mass, members);
                }
            }
            None => {
                systems.insert(support, heaviest.len());
                heaviest.push((row, mass, members));
            }
        }
    }
    heaviest.sort_unstable_by_key(|&(row, _, _)| row);
    let (centers, assignments): (Vec<usize>, Vec<Vec<(usize, f64)>>) =
        heaviest.into_iter().map(|(row, _, members)| (row, members)).unzip();

    debug!(clusters = centers.len(), nodes = matrix.dim(), "mcl clusters extracted");
    ClusterResult { nodes: matrix.dim(), centers, assignments, report }
}

/// Ascending indices of rows whose maximum is strictly positive.
pub fn attractor_rows<M: MarkovMatrix>(matrix: &M) -> Vec<usize> {
    #[cfg(feature = "parallel")]
    let mut rows: Vec<usize> = (0..matrix.dim())
        .into_par_iter()
        .fold(Vec::new, |mut local, i| {
            if matrix.row_max(i) > 0.0 {
                local.push(i);
            }
            local
        })
        .reduce(Vec::new, |mut merged, mut chunk| {
            merged.append(&mut chunk);
            merged
        });
    #[cfg(not(feature = "parallel"))]
    let mut rows: Vec<usize> = (0..matrix.dim()).filter(|&i| matrix.row_max(i) > 0.0).collect();
    rows.sort_unstable();
    rows
}
