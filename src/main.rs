use clap::{Parser, Subcommand};
use critscore::Ecosystem;
use critscore::commands;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "critscore")]
#[command(author, version, about = "Criticality metrics for distro package ecosystems", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect one ecosystem: fetch its index, compute depends-counts and
    /// PageRank, persist packages and relationships
    Collect {
        /// Ecosystem to collect
        ecosystem: Ecosystem,

        /// Config file path
        #[arg(short, long, default_value = "config.json")]
        config: PathBuf,

        /// Write the dependency graph as a DOT file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Apply pending database migrations
    Migrate {
        /// Config file path
        #[arg(short, long, default_value = "config.json")]
        config: PathBuf,

        /// Migrations directory
        #[arg(long, default_value = "migrations")]
        dir: PathBuf,

        /// Apply without asking for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Enrich GitHub-hosted upstreams with deps.dev and GitHub statistics
    Depsdev {
        /// Config file path
        #[arg(short, long, default_value = "config.json")]
        config: PathBuf,

        /// Maximum number of links to process
        #[arg(short, long, default_value_t = 100)]
        batch: usize,

        /// Number of concurrent workers (defaults to the config value)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Process links in descending package PageRank order
        #[arg(long)]
        pagerank: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Collect {
            ecosystem,
            config,
            output,
        } => {
            commands::collect(ecosystem, &config, output.as_deref()).await?;
        }
        Commands::Migrate { config, dir, yes } => {
            commands::migrate(&config, &dir, yes)?;
        }
        Commands::Depsdev {
            config,
            batch,
            workers,
            pagerank,
        } => {
            commands::depsdev(&config, batch, workers, pagerank).await?;
        }
    }

    Ok(())
}
