//! The intra-index dependency graph.
//!
//! Vertices are the distinct package names present in the parsed index;
//! an edge `(p, d)` exists only when `d` is itself in the index. Depends
//! tokens naming packages outside the index are dropped here, so every
//! downstream computation (closures, PageRank, persisted relationships)
//! operates on the in-index subset only.

use crate::package::RawPackage;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};

pub struct PackageGraph {
    pub graph: DiGraph<String, ()>,
    pub node_map: HashMap<String, NodeIndex>,
    packages: HashMap<String, RawPackage>,
}

impl PackageGraph {
    /// Build the graph from parsed records.
    ///
    /// Duplicate names keep the first record. Nodes are inserted in sorted
    /// name order so node indices (and with them PageRank iteration order
    /// and DOT output) are stable across runs. Duplicate depends lines
    /// collapse to a single edge.
    pub fn build(records: Vec<RawPackage>) -> Self {
        let mut packages: HashMap<String, RawPackage> = HashMap::with_capacity(records.len());
        for pkg in records {
            packages.entry(pkg.name.clone()).or_insert(pkg);
        }

        let mut names: Vec<String> = packages.keys().cloned().collect();
        names.sort();

        let mut graph = DiGraph::with_capacity(names.len(), names.len());
        let mut node_map = HashMap::with_capacity(names.len());
        for name in &names {
            let idx = graph.add_node(name.clone());
            node_map.insert(name.clone(), idx);
        }

        let mut seen = HashSet::new();
        for name in &names {
            let from = node_map[name];
            for dep in &packages[name].depends {
                if let Some(&to) = node_map.get(dep)
                    && seen.insert((from, to))
                {
                    graph.add_edge(from, to, ());
                }
            }
        }

        Self {
            graph,
            node_map,
            packages,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Package names in node-index (sorted) order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.graph.node_weights().map(String::as_str)
    }

    pub fn package(&self, name: &str) -> Option<&RawPackage> {
        self.packages.get(name)
    }

    /// The deduplicated edge list as name pairs, in insertion order.
    pub fn edge_names(&self) -> Vec<(&str, &str)> {
        self.graph
            .edge_references()
            .map(|e| {
                (
                    self.graph[e.source()].as_str(),
                    self.graph[e.target()].as_str(),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pkg(name: &str, depends: &[&str]) -> RawPackage {
        RawPackage {
            name: name.to_string(),
            depends: depends.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn edges_to_unknown_packages_dropped() {
        let g = PackageGraph::build(vec![pkg("a", &["missing"])]);
        assert_eq!(g.node_count(), 1);
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn duplicate_depends_lines_collapse() {
        let g = PackageGraph::build(vec![pkg("a", &["b", "b"]), pkg("b", &[])]);
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.edge_names(), vec![("a", "b")]);
    }

    #[test]
    fn duplicate_names_first_wins() {
        let g = PackageGraph::build(vec![
            RawPackage {
                name: "a".to_string(),
                version: "1".to_string(),
                ..Default::default()
            },
            RawPackage {
                name: "a".to_string(),
                version: "2".to_string(),
                ..Default::default()
            },
        ]);
        assert_eq!(g.node_count(), 1);
        assert_eq!(g.package("a").unwrap().version, "1");
    }

    #[test]
    fn names_are_sorted() {
        let g = PackageGraph::build(vec![pkg("zsh", &[]), pkg("bash", &[])]);
        let names: Vec<&str> = g.names().collect();
        assert_eq!(names, vec!["bash", "zsh"]);
    }
}
