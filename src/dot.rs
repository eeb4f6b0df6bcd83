//! DOT edge-list artifact.
//!
//! One node per package labelled `name@description`, one directed edge per
//! retained dependency. Informational output only; nothing downstream
//! consumes it.

use crate::graph::PackageGraph;
use petgraph::visit::EdgeRef;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub fn write_dot(g: &PackageGraph, path: &Path) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    render(g, &mut writer)?;
    writer.flush()
}

pub fn render<W: Write>(g: &PackageGraph, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "digraph {{")?;
    for node in g.graph.node_indices() {
        let name = &g.graph[node];
        let description = g
            .package(name)
            .map(|p| p.description.as_str())
            .unwrap_or_default();
        let label = format!("{name}@{description}").replace('"', "\\\"");
        writeln!(out, "  {} [label=\"{}\"];", node.index(), label)?;
    }
    for edge in g.graph.edge_references() {
        writeln!(
            out,
            "  {} -> {};",
            edge.source().index(),
            edge.target().index()
        )?;
    }
    writeln!(out, "}}")
}
