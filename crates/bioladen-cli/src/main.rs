use std::path::PathBuf;

use bioladen_core::{DedupMode, DEFAULT_START_URL};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod dataset;
mod offline;
mod search;

#[derive(Debug, Parser)]
#[command(name = "bioladen")]
#[command(about = "Harvest the bioladen.de dealer search into a JSON Lines dataset")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search the dealer locator for each postal code and append the results
    Run(RunArgs),
    /// Run the result extractor over a saved results page and print records
    Extract {
        /// HTML file captured from the results page
        html: PathBuf,
        /// URL the page was captured from; resolves relative detail links
        #[arg(long, default_value = DEFAULT_START_URL)]
        page_url: String,
    },
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Run input file (YAML or JSON, camelCase keys)
    #[arg(long, short)]
    input: Option<PathBuf>,
    /// Postal code to search; repeatable, replaces the input file's list
    #[arg(long = "postal-code", value_name = "CODE")]
    postal_codes: Vec<String>,
    #[arg(long)]
    radius_km: Option<f64>,
    /// Identity key for deduplication: detailUrl or composite
    #[arg(long)]
    dedup_by: Option<DedupMode>,
    #[arg(long)]
    max_concurrency: Option<usize>,
    /// Dataset file to append to (default: `BIOLADEN_OUTPUT_PATH`)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Show the browser window
    #[arg(long)]
    headed: bool,
    /// Existing dataset whose stores count as already seen
    #[arg(long, value_name = "JSONL")]
    seed_from: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = bioladen_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Run(args) => search::run_search(&config, &args).await,
        Commands::Extract { html, page_url } => offline::run_extract(&html, &page_url),
    }
}

#[cfg(test)]
mod tests;
