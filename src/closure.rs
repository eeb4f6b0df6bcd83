//! Transitive dependency closures and depends-counts.
//!
//! `closure(p)` is the set of packages reachable from `p` over the
//! intra-index depends relation, including `p` itself. The depends-count
//! of `v` is the number of packages whose closure contains `v`, so every
//! package counts itself at least once.
//!
//! Counts are computed over the Tarjan SCC condensation with per-SCC
//! reachability bitsets rather than one DFS per source vertex; cycles
//! collapse to a single node and each reachable set is built once from
//! the sets of its successors. The resulting counts are identical to the
//! per-source DFS definition.

use crate::graph::PackageGraph;
use fixedbitset::FixedBitSet;
use petgraph::algo::tarjan_scc;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Reachable set from `name`, inclusive of `name`. `None` if the package
/// is not in the index.
pub fn closure<'a>(g: &'a PackageGraph, name: &str) -> Option<BTreeSet<&'a str>> {
    let &start = g.node_map.get(name)?;
    let mut visited = HashSet::new();
    let mut stack = vec![start];
    while let Some(node) = stack.pop() {
        if visited.insert(node) {
            stack.extend(g.graph.neighbors(node));
        }
    }
    Some(visited.into_iter().map(|n| g.graph[n].as_str()).collect())
}

/// Depends-count for every package: `|{p : v ∈ closure(p)}|`.
pub fn depends_counts(g: &PackageGraph) -> HashMap<String, i64> {
    // tarjan_scc yields SCCs in reverse topological order, so every
    // successor's reach set is complete before its predecessors need it.
    let sccs = tarjan_scc(&g.graph);

    let mut scc_of = vec![0usize; g.graph.node_count()];
    for (i, scc) in sccs.iter().enumerate() {
        for &node in scc {
            scc_of[node.index()] = i;
        }
    }

    let mut reach: Vec<FixedBitSet> = Vec::with_capacity(sccs.len());
    for (i, scc) in sccs.iter().enumerate() {
        let mut bits = FixedBitSet::with_capacity(sccs.len());
        bits.insert(i);
        for &node in scc {
            for succ in g.graph.neighbors(node) {
                let target = scc_of[succ.index()];
                if target != i {
                    bits.union_with(&reach[target]);
                }
            }
        }
        reach.push(bits);
    }

    // Each source SCC contributes its member count to every SCC it reaches.
    let mut counts = vec![0i64; sccs.len()];
    for (i, scc) in sccs.iter().enumerate() {
        let members = scc.len() as i64;
        for target in reach[i].ones() {
            counts[target] += members;
        }
    }

    let mut out = HashMap::with_capacity(g.graph.node_count());
    for (i, scc) in sccs.iter().enumerate() {
        for &node in scc {
            out.insert(g.graph[node].clone(), counts[i]);
        }
    }
    out
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
    fn two_node_chain() {
        let g = graph(&[("a", &["b"]), ("b", &[])]);
        let ca: Vec<&str> = closure(&g, "a").unwrap().into_iter().collect();
        assert_eq!(ca, vec!["a", "b"]);
        let cb: Vec<&str> = closure(&g, "b").unwrap().into_iter().collect();
        assert_eq!(cb, vec!["b"]);

        let counts = depends_counts(&g);
        assert_eq!(counts["a"], 1);
        assert_eq!(counts["b"], 2);
    }

    #[test]
    fn cycle_is_finite_and_mutual() {
        let g = graph(&[("a", &["b"]), ("b", &["a"])]);
        let ca = closure(&g, "a").unwrap();
        let cb = closure(&g, "b").unwrap();
        assert_eq!(ca, cb);
        assert_eq!(ca.len(), 2);

        let counts = depends_counts(&g);
        assert_eq!(counts["a"], 2);
        assert_eq!(counts["b"], 2);
    }

    #[test]
    fn dangling_reference_counts_self_only() {
        let g = graph(&[("a", &["x"])]);
        assert_eq!(closure(&g, "a").unwrap().len(), 1);
        assert_eq!(depends_counts(&g)["a"], 1);
    }

    #[test]
    fn every_package_counts_itself() {
        let g = graph(&[("a", &["b", "c"]), ("b", &["c"]), ("c", &[]), ("d", &[])]);
        let counts = depends_counts(&g);
        for name in ["a", "b", "c", "d"] {
            assert!(counts[name] >= 1, "{name} should count itself");
        }
    }

    #[test]
    fn diamond_counts_each_source_once() {
        // a -> b -> d, a -> c -> d: d is in 4 closures, never double-counted.
        let g = graph(&[("a", &["b", "c"]), ("b", &["d"]), ("c", &["d"]), ("d", &[])]);
        let counts = depends_counts(&g);
        assert_eq!(counts["d"], 4);
        assert_eq!(counts["b"], 2);
        assert_eq!(counts["a"], 1);
    }

    #[test]
    fn counts_match_per_source_dfs() {
        let g = graph(&[
            ("a", &["b", "c"]),
            ("b", &["d"]),
            ("c", &["d", "e"]),
            ("d", &["b"]), // cycle b <-> d
            ("e", &[]),
            ("f", &["a"]),
        ]);
        let counts = depends_counts(&g);

        let mut expected: HashMap<&str, i64> = HashMap::new();
        for name in ["a", "b", "c", "d", "e", "f"] {
            for member in closure(&g, name).unwrap() {
                *expected.entry(member).or_default() += 1;
            }
        }
        for (name, count) in expected {
            assert_eq!(counts[name], count, "mismatch for {name}");
        }
    }

    #[test]
    fn unknown_package_has_no_closure() {
        let g = graph(&[("a", &[])]);
        assert!(closure(&g, "zzz").is_none());
    }
}
