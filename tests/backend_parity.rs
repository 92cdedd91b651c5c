//! Dense and sparse backends must agree stage by stage.
//!
//! The loop is generic over `MarkovMatrix`; these tests drive the same
//! input through both representations and compare every iterate.

use approx::assert_abs_diff_eq;
use mcl_core::expansion::{expand, expand_raw};
use mcl_core::extract::{attractor_rows, extract};
use mcl_core::pruning::prune;
use mcl_core::stochastic::{is_column_stochastic, normalize};
use mcl_core::{DenseMatrix, ExpansionFactor, MarkovMatrix, MclDriver, Settings, SparseMatrix, Stage};

// ─── helpers ─────────────────────────────────────────────────────────────────

/// Deterministic pseudo-random sparse affinity matrix (xorshift, ~30% fill).
fn scattered(n: usize, seed: u64) -> DenseMatrix {
    let mut state = seed;
    let mut next = || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };
    let mut m = DenseMatrix::zeros(n);
    for i in 0..n {
        for j in 0..n {
            let r = next();
            if r % 10 < 3 {
                m.set(i, j, (r % 1000) as f64 / 100.0 + 0.01);
            }
        }
    }
    m
}

fn assert_same(dense: &DenseMatrix, sparse: &SparseMatrix) {
    assert_eq!(dense.dim(), sparse.dim());
    for i in 0..dense.dim() {
        for j in 0..dense.dim() {
            assert_abs_diff_eq!(dense.get(i, j), sparse.get(i, j), epsilon = 1e-12);
        }
    }
}

// ─── tests ───────────────────────────────────────────────────────────────────

#[test]
fn every_stage_matches_between_backends() {
    let input = scattered(16, 0x9E37_79B9_7F4A_7C15);
    let mut dense = input.clone();
    let mut sparse = SparseMatrix::from_dense(&input);
    let settings = Settings::default().with_max_iterations(8).with_prune_threshold(1e-4);

    let mut d = MclDriver::new(&mut dense, settings).unwrap();
    let mut s = MclDriver::new(&mut sparse, settings).unwrap();
    loop {
        let ds = d.advance().unwrap();
        let ss = s.advance().unwrap();
        assert_eq!(ds, ss);
        assert_same(d.matrix(), s.matrix());
        if ds == Stage::Done {
            break;
        }
    }
    assert_eq!(d.report().iterations, s.report().iterations);
}

#[test]
fn sparse_pruning_bounds_storage() {
    let input = scattered(24, 42);
    let mut sparse = SparseMatrix::from_dense(&input);
    let settings = Settings::default().with_max_iterations(10).with_prune_threshold(1e-3);
    MclDriver::new(&mut sparse, settings).unwrap().run().unwrap();
    assert!(sparse.stored_entries() <= sparse.nonzeros());
    assert!(sparse.stored_entries() < 24 * 24);
}

#[test]
fn normalisation_gives_unit_column_sums() {
    for seed in [1u64, 7, 99, 12345] {
        let mut dense = scattered(12, seed);
        let mut sparse = SparseMatrix::from_dense(&dense);
        let zero_d = normalize(&mut dense);
        let zero_s = normalize(&mut sparse);
        assert_eq!(zero_d, zero_s);
        for (sum, original) in dense.column_sums().iter().zip(scattered(12, seed).column_sums()) {
            if original == 0.0 {
                assert_eq!(*sum, 0.0);
            } else {
                assert_abs_diff_eq!(*sum, 1.0, epsilon = 1e-12);
            }
        }
        assert!(is_column_stochastic(&sparse, 1e-12));
    }
}

#[test]
fn expansion_is_repeated_multiplication() {
    let mut m = SparseMatrix::from_dense(&scattered(10, 3));
    normalize(&mut m);
    let sq = m.matmul(&m);
    assert_eq!(expand(&m, ExpansionFactor::Two), sq);
    assert_eq!(expand(&m, ExpansionFactor::Three), sq.matmul(&m));
    assert_eq!(expand(&m, ExpansionFactor::Four), sq.matmul(&sq));
    assert!(expand_raw(&m, 6).is_err());
}

#[test]
fn pruning_twice_equals_pruning_once() {
    let mut m = SparseMatrix::from_dense(&scattered(14, 5));
    normalize(&mut m);
    let mut once = m.clone();
    prune(&mut once, 0.05);
    let mut twice = once.clone();
    assert_eq!(prune(&mut twice, 0.05), 0);
    assert_eq!(once, twice);
}

#[test]
fn extraction_is_repeatable() {
    let mut m = SparseMatrix::from_dense(&scattered(20, 77));
    let report = MclDriver::new(&mut m, Settings::default().with_max_iterations(50))
        .unwrap()
        .run()
        .unwrap();
    let first = extract(&m, report);
    for _ in 0..16 {
        assert_eq!(extract(&m, report), first);
    }
    let rows = attractor_rows(&m);
    assert!(rows.windows(2).all(|w| w[0] < w[1]));
    assert!(first.centers.iter().all(|c| rows.contains(c)));
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_center_scan_matches_serial_filter() {
    let n = 20_000;
    let triplets = (0..n)
        .filter(|i| i % 7 != 3 && i % 11 != 5)
        .map(|i| (i, (i * 31 + 17) % n, 0.5 + (i % 5) as f64));
    let m = SparseMatrix::from_triplets(n, triplets).unwrap();
    let serial: Vec<usize> = (0..n).filter(|&i| m.row_max(i) > 0.0).collect();
    for _ in 0..8 {
        assert_eq!(attractor_rows(&m), serial);
    }
    let dense_rows = attractor_rows(&DenseMatrix::identity(512));
    assert_eq!(dense_rows, (0..512).collect::<Vec<_>>());
}
