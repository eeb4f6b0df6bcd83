//! Damped PageRank over the intra-index dependency graph.
//!
//! Fixed-iteration power method: 20 iterations, damping 0.85, ranks
//! initialized to `1/n` and re-based to `(1-d)/n` each round. A package
//! with no in-index dependencies contributes nothing, so its rank mass
//! leaks and the total can fall below 1 on graphs with dangling vertices.
//! That leak is part of the published scores; do not redistribute it.

use crate::graph::PackageGraph;
use std::collections::HashMap;

pub const ITERATIONS: usize = 20;
pub const DAMPING: f64 = 0.85;

pub fn pagerank(g: &PackageGraph, iterations: usize, damping: f64) -> HashMap<String, f64> {
    let n = g.graph.node_count();
    if n == 0 {
        return HashMap::new();
    }
    let n_f64 = n as f64;
    let base = (1.0 - damping) / n_f64;

    let mut ranks = vec![1.0 / n_f64; n];
    let mut next = vec![0.0_f64; n];

    for _ in 0..iterations {
        for r in &mut next {
            *r = base;
        }
        for node in g.graph.node_indices() {
            let out_degree = g.graph.neighbors(node).count();
            if out_degree == 0 {
                continue;
            }
            let share = damping * ranks[node.index()] / out_degree as f64;
            for succ in g.graph.neighbors(node) {
                next[succ.index()] += share;
            }
        }
        std::mem::swap(&mut ranks, &mut next);
    }

    g.graph
        .node_indices()
        .map(|node| (g.graph[node].clone(), ranks[node.index()]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::RawPackage;

    fn graph(edges: &[(&str, &[&str])]) -> PackageGraph {
        PackageGraph::build(
            edges
                .iter()
                .map(|(name, deps)| RawPackage {
                    name: name.to_string(),
                    depends: deps.iter().map(|s| s.to_string()).collect(),
                    ..Default::default()
                })
                .collect(),
        )
    }

    #[test]
    fn empty_graph() {
        let g = graph(&[]);
        assert!(pagerank(&g, ITERATIONS, DAMPING).is_empty());
    }

    #[test]
    fn two_cycle_splits_evenly() {
        let g = graph(&[("a", &["b"]), ("b", &["a"])]);
        let ranks = pagerank(&g, ITERATIONS, DAMPING);
        assert!((ranks["a"] - 0.5).abs() < 1e-9);
        assert!((ranks["b"] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn mass_preserved_without_dangling_vertices() {
        // Every vertex has out-degree > 0, so nothing leaks.
        let g = graph(&[("a", &["b"]), ("b", &["c"]), ("c", &["a"])]);
        let ranks = pagerank(&g, ITERATIONS, DAMPING);
        let total: f64 = ranks.values().sum();
        assert!((total - 1.0).abs() < 1e-6, "total {total}");
    }

    #[test]
    fn dangling_mass_leaks() {
        let g = graph(&[("a", &["b"]), ("b", &[])]);
        let ranks = pagerank(&g, ITERATIONS, DAMPING);
        let total: f64 = ranks.values().sum();
        assert!(total < 1.0, "dangling vertex must leak mass, total {total}");
        assert!(ranks["b"] > ranks["a"]);
    }

    #[test]
    fn dependency_outranks_dependent() {
        // c is required by both a and b.
        let g = graph(&[("a", &["c"]), ("b", &["c"]), ("c", &[])]);
        let ranks = pagerank(&g, ITERATIONS, DAMPING);
        assert!(ranks["c"] > ranks["a"]);
        assert!(ranks["c"] > ranks["b"]);
        assert!((ranks["a"] - ranks["b"]).abs() < 1e-12);
    }

    #[test]
    fn ranks_are_positive() {
        let g = graph(&[("a", &["b"]), ("b", &[]), ("c", &[])]);
        for (name, rank) in pagerank(&g, ITERATIONS, DAMPING) {
            assert!(rank > 0.0, "{name} has non-positive rank {rank}");
        }
    }
}
