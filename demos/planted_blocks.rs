//! # Planted-block clustering demo
//!
//! Builds an affinity matrix with three dense communities joined by a few
//! weak bridges, clusters it with both backends, and prints the result.
//!
//! ```bash
//! RUST_LOG=debug cargo run --example planted_blocks --features parallel
//! ```

use mcl_core::stochastic::is_column_stochastic;
use mcl_core::{run, ClusterResult, DenseMatrix, MarkovMatrix, Settings, SparseMatrix};

// ── Graph ────────────────────────────────────────────────────────────────────

/// Community sizes, laid out consecutively along the node axis.
const BLOCKS: [usize; 3] = [4, 5, 3];

/// Affinity of the weak bridges between neighbouring communities.
const BRIDGE: f64 = 0.05;

fn planted_blocks() -> DenseMatrix {
    let n: usize = BLOCKS.iter().sum();
    let mut m = DenseMatrix::zeros(n);
    let mut start = 0;
    let mut firsts = Vec::new();
    for &size in &BLOCKS {
        for i in start..start + size {
            for j in start..start + size {
                if i != j {
                    m.set(i, j, 1.0);
                }
            }
        }
        firsts.push(start);
        start += size;
    }
    // Bridge the first node of each community to the last node of the previous one.
    for pair in firsts.windows(2) {
        let (prev_last, next_first) = (pair[1] - 1, pair[1]);
        m.set(prev_last, next_first, BRIDGE);
        m.set(next_first, prev_last, BRIDGE);
    }
    m
}

// ── Output ───────────────────────────────────────────────────────────────────

fn print_result(label: &str, result: &ClusterResult) {
    println!(
        "{label}: {} clusters after {} iterations (converged: {}, residual {:.2e})",
        result.len(),
        result.report.iterations,
        result.report.converged,
        result.report.residual,
    );
    for cluster in result.clusters() {
        let nodes: Vec<usize> = cluster.nodes().collect();
        println!("  center {:>2} → {:?}", cluster.center, nodes);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let settings = Settings::default().with_max_iterations(100);
    let input = planted_blocks();

    let mut dense = input.clone();
    let dense_result = run(&mut dense, &settings)?;
    print_result("dense ", &dense_result);

    let mut sparse = SparseMatrix::from_dense(&input);
    let sparse_result = run(&mut sparse, &settings)?;
    print_result("sparse", &sparse_result);
    println!(
        "  stored entries: {} of {} (final iterate column-stochastic: {})",
        sparse.stored_entries(),
        sparse.dim() * sparse.dim(),
        is_column_stochastic(&sparse, 1e-9),
    );

    let partition = sparse_result.hard_partition();
    println!("hard partition: {partition:?}");
    Ok(())
}
