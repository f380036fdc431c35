//! Heuristic result extraction.
//!
//! The dealer search has no stable markup contract, so blocks are found by
//! shape (generic card selectors) plus content (signals such as a "Details"
//! label or a `(1,2 km)` distance), then every subfield is resolved on its
//! own. See [`rules::ExtractRules`] for the concrete matchers.

mod candidates;
mod fields;
pub mod rules;
mod text;

use bioladen_core::StoreRecord;
use chrono::{DateTime, Utc};
use scraper::Html;
use url::Url;

pub use rules::{ExtractRules, SignalMatcher};
pub use text::block_text;

/// Counts describing one extraction pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    /// Card-shaped elements carrying a content signal.
    pub candidates: usize,
    /// Blocks left after folding nested candidates.
    pub blocks: usize,
    /// Blocks dropped for lacking name, street and detail link.
    pub without_identity: usize,
}

#[derive(Debug, Clone)]
pub struct Extraction {
    pub records: Vec<StoreRecord>,
    pub stats: ExtractionStats,
}

#[derive(Debug, Clone, Default)]
pub struct Extractor {
    rules: ExtractRules,
}

impl Extractor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_rules(rules: ExtractRules) -> Self {
        Self { rules }
    }

    #[must_use]
    pub fn rules(&self) -> &ExtractRules {
        &self.rules
    }

    /// Extracts store records from a rendered results page, stamped now.
    ///
    /// `page_url` resolves root-relative detail links; pass the URL the DOM
    /// was captured from.
    #[must_use]
    pub fn extract(&self, html: &str, page_url: &str) -> Extraction {
        self.extract_at(html, page_url, Utc::now())
    }

    /// Like [`Extractor::extract`] with an explicit capture time.
    #[must_use]
    pub fn extract_at(&self, html: &str, page_url: &str, scraped_at: DateTime<Utc>) -> Extraction {
        let document = Html::parse_document(html);
        let base = Url::parse(page_url).ok();
        if base.is_none() {
            tracing::debug!(page_url, "page URL does not parse; relative links are skipped");
        }

        let candidates = candidates::find_candidates(&document, &self.rules);
        let blocks = candidates::fold_candidates(&candidates, &self.rules);

        let mut stats = ExtractionStats {
            candidates: candidates.len(),
            blocks: blocks.len(),
            without_identity: 0,
        };

        let mut records = Vec::with_capacity(blocks.len());
        for block in blocks {
            let text = block_text(block);
            let address = fields::resolve_address(block, &self.rules);

            let mut record = StoreRecord::empty(scraped_at);
            record.name = fields::resolve_name(block, &self.rules);
            record.detail_url = fields::resolve_detail_url(block, &self.rules, base.as_ref());
            record.street = address.street;
            record.postal_code = address.postal_code;
            record.city = address.city;
            record.country_code = address.country_code.or(record.country_code);
            record.phone = fields::resolve_phone(&text, &self.rules);
            record.distance_km = fields::resolve_distance_km(&text, &self.rules);
            record.opening_hours = fields::resolve_opening_hours(&text, &self.rules);

            if record.has_identity() {
                records.push(record);
            } else {
                stats.without_identity += 1;
            }
        }

        tracing::debug!(
            candidates = stats.candidates,
            blocks = stats.blocks,
            without_identity = stats.without_identity,
            records = records.len(),
            "extraction finished"
        );

        Extraction { records, stats }
    }
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
