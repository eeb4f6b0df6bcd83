use crate::config::Config;
use crate::depsdev::DepsDevClient;
use crate::enrich::{self, EnrichOptions};
use crate::error::Result;
use crate::store;
use colored::Colorize;
use std::path::Path;

pub async fn depsdev(
    config_path: &Path,
    batch: usize,
    workers: Option<usize>,
    by_pagerank: bool,
) -> Result<()> {
    let config = Config::load(config_path)?;
    let conn = store::open(Path::new(&config.database))?;

    let client = DepsDevClient::new()?;
    let sync = enrich::sync_git_metrics(&conn, &client).await?;
    println!(
        "{} git_metrics synchronized: {} added, {} removed",
        "✓".green(),
        sync.inserted.to_string().bold(),
        sync.deleted.to_string().bold()
    );

    let report = enrich::enrich_links(
        &conn,
        config.github_token.clone(),
        EnrichOptions {
            batch,
            workers: workers.unwrap_or(config.workers),
            by_pagerank,
        },
    )
    .await?;
    println!(
        "{} {} links processed: {} updated, {} skipped",
        "✓".green(),
        report.processed.to_string().bold(),
        report.updated,
        report.skipped
    );
    Ok(())
}
