//! `bioladen run`: drive the dealer search for every postal code.

use std::path::Path;
use std::sync::Arc;

use bioladen_core::{load_run_input, validate_run_input, AppConfig, ConfigError, RunInput};
use bioladen_scraper::{ChromeBrowser, DedupIndex, NavSettings, Orchestrator, RunSummary};

use crate::dataset::{read_seed_keys, JsonLinesSink};
use crate::RunArgs;

/// Run input from the optional file with command-line overrides applied.
pub(crate) fn build_run_input(args: &RunArgs) -> Result<RunInput, ConfigError> {
    let mut input = match &args.input {
        Some(path) => load_run_input(path)?,
        None => RunInput::default(),
    };
    if !args.postal_codes.is_empty() {
        input.postal_codes.clone_from(&args.postal_codes);
    }
    if let Some(radius_km) = args.radius_km {
        input.radius_km = radius_km;
    }
    if let Some(mode) = args.dedup_by {
        input.deduplicate_by = mode;
    }
    if let Some(max_concurrency) = args.max_concurrency {
        input.max_concurrency = max_concurrency;
    }
    validate_run_input(input)
}

/// Runs every search task and appends kept records to the dataset.
///
/// # Errors
///
/// Returns an error if the input is invalid, the dataset or seed file cannot
/// be opened, Chrome cannot be launched, or every task failed. Individual
/// task failures are logged and reported in the summary only.
pub(crate) async fn run_search(config: &AppConfig, args: &RunArgs) -> anyhow::Result<()> {
    let input = build_run_input(args)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| config.output_path.clone());

    let index = match &args.seed_from {
        Some(path) => {
            let keys = read_seed_keys(path, input.deduplicate_by)?;
            tracing::info!(seed = %path.display(), keys = keys.len(), "seeded dedup index");
            DedupIndex::with_keys(keys)
        }
        None => DedupIndex::new(),
    };

    let sink = JsonLinesSink::open(&output)
        .await
        .map_err(|e| anyhow::anyhow!("failed to open dataset {}: {e}", output.display()))?;

    let headless = config.headless && !args.headed;
    let browser = ChromeBrowser::launch(headless, config.navigation_timeout())
        .await
        .map_err(|e| anyhow::anyhow!("failed to launch chrome: {e}"))?;

    let orchestrator =
        Orchestrator::new(&browser, &sink, NavSettings::from(config), Arc::new(index));
    let summary = orchestrator.run(&input).await;

    print_summary(&summary, &output);

    if summary.all_failed() {
        anyhow::bail!("all {} search tasks failed", summary.tasks.len());
    }
    Ok(())
}

fn print_summary(summary: &RunSummary, output: &Path) {
    println!(
        "run {}: {} kept, {} dropped as duplicates, {}/{} tasks succeeded in {:.1}s",
        summary.run_id,
        summary.kept,
        summary.dropped,
        summary.succeeded,
        summary.tasks.len(),
        summary.elapsed.as_secs_f64()
    );
    for task in &summary.tasks {
        match &task.error {
            None => println!(
                "  {:<8} {:<6} kept={} dropped={}",
                task.postal_code,
                task.final_state.as_str(),
                task.kept,
                task.dropped
            ),
            Some(e) => println!(
                "  {:<8} {:<6} {e}",
                task.postal_code,
                task.final_state.as_str()
            ),
        }
    }
    println!("dataset: {}", output.display());
}
