//! Per-ecosystem pipeline orchestration.
//!
//! Strictly sequential: fetch → parse → build graph → depends-counts +
//! PageRank → persist → optional DOT artifact. The graph stages own their
//! data exclusively; the only suspension points are the HTTP fetch and
//! database calls.

use crate::config::Config;
use crate::ecosystem::Ecosystem;
use crate::error::Result;
use crate::fetch::IndexFetcher;
use crate::graph::PackageGraph;
use crate::store::persist::{self, PackageRow};
use crate::{closure, dot, github, pagerank, parser, store};
use std::path::Path;
use tracing::info;

#[derive(Debug)]
pub struct RunSummary {
    pub packages: usize,
    pub edges: usize,
}

pub async fn run(
    ecosystem: Ecosystem,
    config: &Config,
    dot_path: Option<&Path>,
) -> Result<RunSummary> {
    let fetcher = IndexFetcher::new()?;
    info!(%ecosystem, "fetching package index");
    let text = fetcher.fetch_index(ecosystem).await?;

    let records = parser::parse_index(ecosystem, &text)?;
    info!(count = records.len(), "parsed package records");

    let graph = PackageGraph::build(records);
    info!(
        packages = graph.node_count(),
        edges = graph.edge_count(),
        "built dependency graph"
    );

    let rows = package_rows(&graph);

    let conn = store::open(Path::new(&config.database))?;
    let packages = persist::upsert_packages(&conn, ecosystem, &rows)?;
    let edges = graph.edge_names();
    persist::insert_relationships(&conn, ecosystem, &edges)?;
    info!(packages, edges = edges.len(), "persisted metrics");

    if let Some(path) = dot_path {
        dot::write_dot(&graph, path)?;
        info!(path = %path.display(), "wrote dependency graph artifact");
    }

    Ok(RunSummary {
        packages,
        edges: edges.len(),
    })
}

/// Compute the persistable row set: depends-counts and PageRank joined to
/// the parsed metadata, in graph order.
pub fn package_rows(graph: &PackageGraph) -> Vec<PackageRow> {
    let counts = closure::depends_counts(graph);
    let ranks = pagerank::pagerank(graph, pagerank::ITERATIONS, pagerank::DAMPING);

    graph
        .names()
        .filter_map(|name| {
            let pkg = graph.package(name)?;
            Some(PackageRow {
                package: name.to_string(),
                depends_count: counts.get(name).copied().unwrap_or_default(),
                description: pkg.description.clone(),
                homepage: pkg.homepage.clone(),
                page_rank: ranks.get(name).copied().unwrap_or_default(),
                version: pkg.version.clone(),
                git_link: github::canonical_link(&pkg.homepage),
            })
        })
        .collect()
}
