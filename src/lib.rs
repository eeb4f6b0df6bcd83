//! critscore: criticality metrics for Linux-distribution package
//! ecosystems.
//!
//! The library fetches a distribution's package index, parses it into a
//! dependency graph, computes transitive depends-counts and PageRank, and
//! persists per-package metrics and edge relations idempotently. A second
//! pass joins packages to their GitHub upstreams and enriches them with
//! deps.dev dependent counts and repository statistics.
//!
//! # Architecture
//!
//! - **fetch.rs**: HTTP index retrieval and gzip/tar decompression
//! - **parser/**: per-ecosystem index parsers emitting [`package::RawPackage`]
//! - **graph.rs**: the intra-index dependency graph
//! - **closure.rs** / **pagerank.rs**: the two derived metrics
//! - **store/**: SQLite persistence and the migration runner
//! - **enrich.rs**: git_metrics sync, deps.dev and GitHub enrichment
//! - **collector.rs**: the per-ecosystem pipeline
//! - **error.rs**: unified error type

pub mod closure;
pub mod collector;
pub mod commands;
pub mod config;
pub mod depsdev;
pub mod dot;
pub mod ecosystem;
pub mod enrich;
pub mod error;
pub mod fetch;
pub mod github;
pub mod graph;
pub mod package;
pub mod pagerank;
pub mod parser;
pub mod store;

pub use config::Config;
pub use ecosystem::Ecosystem;
pub use error::{CritError, Result};
pub use graph::PackageGraph;
pub use package::RawPackage;
