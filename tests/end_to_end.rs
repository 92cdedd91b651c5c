//! End-to-end MCL runs on small graphs with known cluster structure.
//!
//! Every scenario runs on both backends; the cluster membership must match
//! the planted structure exactly.

use mcl_core::{
    run, ClusterResult, ConvergenceMetric, DenseMatrix, ExpansionFactor, MarkovMatrix, MclError,
    Settings, SparseMatrix,
};

// ─── helpers ─────────────────────────────────────────────────────────────────

fn symmetric(n: usize, edges: &[(usize, usize)]) -> DenseMatrix {
    let mut m = DenseMatrix::zeros(n);
    for &(i, j) in edges {
        m.set(i, j, 1.0);
        m.set(j, i, 1.0);
    }
    m
}

/// Two disjoint 2-node blocks: {0, 1} and {2, 3}.
fn two_pairs() -> DenseMatrix {
    symmetric(4, &[(0, 1), (2, 3)])
}

/// Three cliques (sizes 4, 5, 3) joined by 0.05-weight bridges.
fn planted_blocks() -> DenseMatrix {
    let blocks = [0..4, 4..9, 9..12];
    let mut m = DenseMatrix::zeros(12);
    for block in &blocks {
        for i in block.clone() {
            for j in block.clone() {
                if i != j {
                    m.set(i, j, 1.0);
                }
            }
        }
    }
    for (a, b) in [(3, 4), (8, 9)] {
        m.set(a, b, 0.05);
        m.set(b, a, 0.05);
    }
    m
}

fn members(result: &ClusterResult) -> Vec<Vec<usize>> {
    result.clusters().map(|c| c.nodes().collect()).collect()
}

fn paper_settings() -> Settings {
    Settings::default()
        .with_self_loop_weight(1.0)
        .with_inflation(2.0)
        .with_expansion(ExpansionFactor::Two)
        .with_prune_threshold(1e-7)
        .with_max_iterations(20)
}

fn run_both(input: &DenseMatrix, settings: &Settings) -> (ClusterResult, ClusterResult) {
    let mut dense = input.clone();
    let mut sparse = SparseMatrix::from_dense(input);
    let d = run(&mut dense, settings).expect("dense run");
    let s = run(&mut sparse, settings).expect("sparse run");
    (d, s)
}

// ─── tests ───────────────────────────────────────────────────────────────────

#[test]
fn two_disjoint_pairs_give_two_clusters() {
    let (dense, sparse) = run_both(&two_pairs(), &paper_settings());
    for result in [&dense, &sparse] {
        assert!(result.report.converged, "did not converge: {:?}", result.report);
        assert!(result.report.iterations <= 20);
        assert_eq!(result.len(), 2);
        assert_eq!(members(result), vec![vec![0, 1], vec![2, 3]]);
        for members in &result.assignments {
            assert_eq!(members.len(), 2);
        }
    }
}

#[test]
fn isolated_node_is_never_clustered() {
    // {0, 1} and {2, 3} are fully connected including self-affinity; node 4 has no edges.
    let mut input = symmetric(5, &[(0, 1), (2, 3)]);
    for i in 0..4 {
        input.set(i, i, 1.0);
    }
    let settings = paper_settings().with_self_loop_weight(0.0);
    let (dense, sparse) = run_both(&input, &settings);
    for result in [&dense, &sparse] {
        assert!(!result.centers.contains(&4));
        assert_eq!(result.cluster_of(4), None);
        assert_eq!(members(result), vec![vec![0, 1], vec![2, 3]]);
        for row in &result.assignments {
            assert!(row.iter().all(|&(_, w)| w.is_finite() && w > 0.0));
        }
    }

    let mut m = input.clone();
    run(&mut m, &settings).unwrap();
    assert_eq!(m.first_invalid_entry(), None, "NaN or negative value leaked into the iterate");
    assert_eq!(m.row_max(4), 0.0);
}

#[test]
fn planted_blocks_recovered_for_every_expansion_factor() {
    for factor in [ExpansionFactor::Two, ExpansionFactor::Three, ExpansionFactor::Four] {
        let settings = Settings::default().with_expansion(factor).with_max_iterations(100);
        let (dense, sparse) = run_both(&planted_blocks(), &settings);
        let expected = vec![(0..4).collect::<Vec<_>>(), (4..9).collect(), (9..12).collect()];
        assert_eq!(members(&dense), expected, "dense, factor {factor:?}");
        assert_eq!(members(&sparse), expected, "sparse, factor {factor:?}");
        assert_eq!(
            sparse.hard_partition(),
            vec![Some(0), Some(0), Some(0), Some(0), Some(1), Some(1), Some(1), Some(1), Some(1), Some(2), Some(2), Some(2)]
        );
    }
}

#[test]
fn iterate_change_metric_recovers_the_same_partition() {
    let settings = Settings::default()
        .with_metric(ConvergenceMetric::IterateChange)
        .with_max_iterations(100);
    let (dense, sparse) = run_both(&planted_blocks(), &settings);
    for result in [&dense, &sparse] {
        assert!(result.report.converged);
        let mut sets = members(result);
        sets.sort();
        assert_eq!(sets, vec![(0..4).collect::<Vec<_>>(), (4..9).collect(), (9..12).collect()]);
    }
}

#[test]
fn triangles_joined_by_a_single_edge_split() {
    let input = symmetric(6, &[(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5), (2, 3)]);
    let (dense, sparse) = run_both(&input, &Settings::default().with_max_iterations(100));
    assert_eq!(members(&dense), vec![vec![0, 1, 2], vec![3, 4, 5]]);
    assert_eq!(members(&sparse), vec![vec![0, 1, 2], vec![3, 4, 5]]);
}

#[test]
fn zero_tolerance_runs_to_the_cap() {
    let settings = paper_settings().with_convergence_tolerance(0.0).with_max_iterations(6);
    let (dense, sparse) = run_both(&two_pairs(), &settings);
    for result in [&dense, &sparse] {
        assert_eq!(result.report.iterations, 6);
        assert!(!result.report.converged);
        assert_eq!(members(result), vec![vec![0, 1], vec![2, 3]]);
    }
}

#[test]
fn identity_is_a_fixed_point() {
    let mut m = SparseMatrix::identity(4);
    let result = run(&mut m, &Settings::default().with_self_loop_weight(0.0)).unwrap();
    assert!(result.report.converged);
    assert_eq!(result.report.iterations, 1);
    assert_eq!(result.centers, vec![0, 1, 2, 3]);
}

#[test]
fn empty_matrix_yields_no_clusters() {
    let mut m = DenseMatrix::zeros(0);
    let result = run(&mut m, &Settings::default()).unwrap();
    assert!(result.is_empty());
}

#[test]
fn invalid_configuration_leaves_matrix_untouched() {
    let mut m = two_pairs();
    let before = m.clone();

    assert_eq!(
        Settings::new(5, 2.0, 1.0, 10, 0.0, 0.0).unwrap_err(),
        MclError::InvalidExpansionFactor(5)
    );
    let err = run(&mut m, &Settings::default().with_inflation(0.0)).unwrap_err();
    assert_eq!(err, MclError::InvalidInflation(0.0));
    let err = run(&mut m, &Settings::default().with_max_iterations(0)).unwrap_err();
    assert_eq!(err, MclError::ZeroIterations);
    assert_eq!(m, before);
}

#[test]
fn negative_affinity_is_rejected() {
    let mut m = SparseMatrix::from_triplets(3, [(0, 1, 1.0), (2, 0, -0.5)]).unwrap();
    let err = run(&mut m, &Settings::default()).unwrap_err();
    assert_eq!(err, MclError::InvalidEntries { row: 2, col: 0, value: -0.5 });
}

#[test]
fn centers_carry_the_mass_of_their_attractor_system() {
    // Symmetric xorshift graph, ~10% fill.
    let n = 30;
    let mut state: u64 = 61 * 7919 + 30;
    let mut triplets = Vec::new();
    for i in 0..n {
        for j in i + 1..n {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            if state % 10 == 0 {
                triplets.push((i, j, 1.0));
                triplets.push((j, i, 1.0));
            }
        }
    }
    let mut m = SparseMatrix::from_triplets(n, triplets).unwrap();
    let result = run(&mut m, &Settings::default().with_max_iterations(100)).unwrap();

    let support = |row: usize| -> Vec<usize> { m.row(row).iter().map(|&(c, _)| c).collect() };
    let mass = |row: usize| -> f64 { m.row(row).iter().map(|&(_, w)| w).sum() };
    for cluster in result.clusters() {
        assert_eq!(cluster.members, m.row(cluster.center));
        for row in 0..n {
            if row != cluster.center && support(row) == support(cluster.center) {
                assert!(mass(row) <= mass(cluster.center), "row {row} outweighs center {}", cluster.center);
            }
        }
    }
    let partition = result.hard_partition();
    for node in 0..n {
        assert_eq!(result.cluster_of(node), partition[node]);
    }
}
