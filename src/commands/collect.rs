use crate::collector;
use crate::config::Config;
use crate::ecosystem::Ecosystem;
use crate::error::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

pub async fn collect(
    ecosystem: Ecosystem,
    config_path: &Path,
    output: Option<&Path>,
) -> Result<()> {
    let config = Config::load(config_path)?;
    let is_tty = std::io::IsTerminal::is_terminal(&std::io::stdout());

    let spinner = if is_tty {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        pb.set_message(format!("Collecting {ecosystem} package index..."));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    } else {
        ProgressBar::hidden()
    };

    let result = collector::run(ecosystem, &config, output).await;
    spinner.finish_and_clear();
    let summary = result?;

    println!(
        "{} {}: {} packages, {} relationships persisted",
        "✓".green(),
        ecosystem.to_string().cyan(),
        summary.packages.to_string().bold(),
        summary.edges.to_string().bold()
    );
    if let Some(path) = output {
        println!("  dependency graph written to {}", path.display());
    }
    Ok(())
}
