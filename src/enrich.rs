//! Upstream enrichment.
//!
//! Two passes over `git_metrics`, both keyed by the canonical GitHub
//! links collected from the per-distro package tables:
//!
//! 1. **Sync**: delete rows whose link no longer appears in any package
//!    table, insert rows for newly-seen links with an initial dependent
//!    count.
//! 2. **Enrich**: for each link (bounded concurrency), classify the
//!    repository, look up its newest version and dependent count on
//!    deps.dev, and collect GitHub statistics. Network work runs on the
//!    worker pool; all database writes happen on the caller's connection
//!    after the tasks complete.

use crate::depsdev::DepsDevClient;
use crate::ecosystem::Ecosystem;
use crate::error::{CritError, Result};
use crate::github::{self, GitHubClient, RepoStats};
use rusqlite::{Connection, params};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

pub struct EnrichOptions {
    /// Maximum number of links processed in one run.
    pub batch: usize,
    /// Concurrent network workers.
    pub workers: usize,
    /// Order links by the best PageRank of the packages referencing them,
    /// so a capped batch spends its budget on the most critical upstreams.
    pub by_pagerank: bool,
}

#[derive(Debug, Default)]
pub struct SyncReport {
    pub inserted: usize,
    pub deleted: usize,
}

#[derive(Debug, Default)]
pub struct EnrichReport {
    pub processed: usize,
    pub updated: usize,
    pub skipped: usize,
}

/// Canonical GitHub links referenced by any collected package table.
fn collect_git_links(conn: &Connection) -> Result<BTreeSet<String>> {
    let mut links = BTreeSet::new();
    for ecosystem in Ecosystem::ALL {
        let sql = format!(
            "SELECT git_link FROM {} WHERE git_link IS NOT NULL",
            ecosystem.packages_table()
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
        for link in rows.flatten() {
            if let Some(canonical) = github::canonical_link(&link) {
                links.insert(canonical);
            }
        }
    }
    Ok(links)
}

/// Bring `git_metrics` in line with the links currently referenced by the
/// package tables.
pub async fn sync_git_metrics(conn: &Connection, depsdev: &DepsDevClient) -> Result<SyncReport> {
    let desired = collect_git_links(conn)?;

    let mut existing = BTreeSet::new();
    {
        let mut stmt = conn.prepare("SELECT git_link FROM git_metrics")?;
        let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
        for link in rows.flatten() {
            existing.insert(link);
        }
    }

    let mut report = SyncReport::default();

    for link in existing.difference(&desired) {
        match conn.execute("DELETE FROM git_metrics WHERE git_link = ?1", params![link]) {
            Ok(_) => report.deleted += 1,
            Err(e) => warn!(%link, error = %e, "failed to delete stale git_metrics row"),
        }
    }

    for link in desired.difference(&existing) {
        let count = initial_dependent_count(depsdev, link).await;
        match conn.execute(
            "INSERT INTO git_metrics (git_link, depsdev_count) VALUES (?1, ?2)",
            params![link, count],
        ) {
            Ok(_) => report.inserted += 1,
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation => {}
            Err(e) => warn!(%link, error = %e, "failed to insert git_metrics row"),
        }
    }

    info!(
        inserted = report.inserted,
        deleted = report.deleted,
        "git_metrics synchronized"
    );
    Ok(report)
}

async fn initial_dependent_count(depsdev: &DepsDevClient, link: &str) -> i64 {
    let Some((owner, repo)) = github::split_owner_repo(link) else {
        return 0;
    };
    match depsdev.dependent_count("github", &owner, &repo).await {
        Ok(Some(count)) => count,
        Ok(None) => 0,
        Err(e) => {
            warn!(%link, error = %e, "initial deps.dev lookup failed");
            0
        }
    }
}

struct LinkMetrics {
    depsdev_count: Option<i64>,
    stats: RepoStats,
}

/// Enrich up to `batch` links with deps.dev dependent counts and GitHub
/// statistics.
pub async fn enrich_links(
    conn: &Connection,
    github_token: Option<String>,
    options: EnrichOptions,
) -> Result<EnrichReport> {
    let links = select_links(conn, &options)?;
    info!(count = links.len(), "enriching upstream links");

    let github = Arc::new(GitHubClient::new(github_token)?);
    let depsdev = Arc::new(DepsDevClient::new()?);
    let semaphore = Arc::new(Semaphore::new(options.workers.max(1)));

    let mut tasks = Vec::with_capacity(links.len());
    for link in links {
        let github = Arc::clone(&github);
        let depsdev = Arc::clone(&depsdev);
        let semaphore = Arc::clone(&semaphore);
        tasks.push(tokio::spawn(async move {
            let Ok(_permit) = semaphore.acquire().await else {
                return (link, None);
            };
            let metrics = enrich_one(&github, &depsdev, &link).await;
            (link, metrics)
        }));
    }

    let mut report = EnrichReport::default();
    for task in tasks {
        let (link, metrics) = task
            .await
            .map_err(|e| CritError::Other(anyhow::anyhow!("enrichment task failed: {e}")))?;
        report.processed += 1;
        let Some(metrics) = metrics else {
            report.skipped += 1;
            continue;
        };
        match write_metrics(conn, &link, &metrics) {
            Ok(()) => report.updated += 1,
            Err(e) => {
                warn!(%link, error = %e, "failed to update git_metrics");
                report.skipped += 1;
            }
        }
    }
    Ok(report)
}

fn select_links(conn: &Connection, options: &EnrichOptions) -> Result<Vec<String>> {
    let sql = if options.by_pagerank {
        let union = Ecosystem::ALL
            .map(|eco| {
                format!(
                    "SELECT git_link, page_rank FROM {} WHERE git_link IS NOT NULL",
                    eco.packages_table()
                )
            })
            .join(" UNION ALL ");
        format!(
            "SELECT m.git_link FROM git_metrics m \
             LEFT JOIN (SELECT git_link, MAX(page_rank) AS rank FROM ({union}) GROUP BY git_link) p \
             ON p.git_link = m.git_link \
             ORDER BY COALESCE(p.rank, 0) DESC LIMIT ?1"
        )
    } else {
        "SELECT git_link FROM git_metrics ORDER BY git_link LIMIT ?1".to_string()
    };
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![options.batch as i64], |r| r.get::<_, String>(0))?;
    Ok(rows.flatten().collect())
}

async fn enrich_one(
    github: &GitHubClient,
    depsdev: &DepsDevClient,
    link: &str,
) -> Option<LinkMetrics> {
    let (owner, repo) = github::split_owner_repo(link)?;

    let mut depsdev_count = None;
    match github.classify_project(&owner, &repo).await {
        Ok(Some(system)) => {
            debug!(%link, system, "classified repository");
            match lookup_dependents(depsdev, system, &repo).await {
                Ok(count) => depsdev_count = count,
                Err(e) => warn!(%link, error = %e, "deps.dev lookup failed"),
            }
        }
        Ok(None) => debug!(%link, "no ecosystem marker found"),
        Err(e) => warn!(%link, error = %e, "classification failed"),
    }

    let stats = match github.repo_stats(&owner, &repo).await {
        Ok(stats) => stats,
        Err(e) => {
            warn!(%link, error = %e, "GitHub stats lookup failed");
            RepoStats::default()
        }
    };

    Some(LinkMetrics {
        depsdev_count,
        stats,
    })
}

async fn lookup_dependents(
    depsdev: &DepsDevClient,
    system: &str,
    repo: &str,
) -> Result<Option<i64>> {
    let Some(version) = depsdev.latest_version(system, repo).await? else {
        return Ok(None);
    };
    depsdev.dependent_count(system, repo, &version).await
}

fn write_metrics(conn: &Connection, link: &str, metrics: &LinkMetrics) -> Result<()> {
    if let Some(count) = metrics.depsdev_count {
        conn.execute(
            "UPDATE git_metrics SET depsdev_count = ?1 WHERE git_link = ?2",
            params![count, link],
        )?;
    }
    conn.execute(
        "UPDATE git_metrics SET star_count = ?1, fork_count = ?2, created_since = ?3, \
         updated_since = ?4, contributor_count = ?5, commit_frequency = ?6 WHERE git_link = ?7",
        params![
            metrics.stats.star_count,
            metrics.stats.fork_count,
            metrics.stats.created_since,
            metrics.stats.updated_since,
            metrics.stats.contributor_count,
            metrics.stats.commit_frequency,
            link,
        ],
    )?;
    Ok(())
}
