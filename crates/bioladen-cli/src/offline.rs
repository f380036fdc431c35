//! `bioladen extract`: run the extractor over a saved page without a browser.

use std::io::Write;
use std::path::Path;

use bioladen_scraper::Extractor;

/// Prints one JSON record per line to stdout.
///
/// # Errors
///
/// Returns an error if the file cannot be read or stdout is closed.
pub(crate) fn run_extract(html_path: &Path, page_url: &str) -> anyhow::Result<()> {
    let html = std::fs::read_to_string(html_path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", html_path.display()))?;

    let extraction = Extractor::new().extract(&html, page_url);
    tracing::info!(
        file = %html_path.display(),
        candidates = extraction.stats.candidates,
        blocks = extraction.stats.blocks,
        without_identity = extraction.stats.without_identity,
        records = extraction.records.len(),
        "extracted saved page"
    );

    let mut out = std::io::stdout().lock();
    for record in &extraction.records {
        serde_json::to_writer(&mut out, record)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}
