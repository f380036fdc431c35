//! Declarative extraction rules.
//!
//! Everything the extractor matches on lives here as data: the structural
//! selectors that shape a result card, the ordered content signals that mark
//! a card as a real result, and the field patterns. Control flow in
//! [`super::Extractor`] never names a concrete selector or pattern.

use regex::Regex;
use scraper::Selector;

/// A named content test applied to a candidate block's text.
#[derive(Debug, Clone)]
pub struct SignalMatcher {
    pub name: &'static str,
    pub pattern: Regex,
}

impl SignalMatcher {
    fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("valid signal regex"),
        }
    }

    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

#[derive(Debug, Clone)]
pub struct ExtractRules {
    /// Generic card-like shapes a result block may take.
    pub card: Selector,
    /// Tried in order; a block needs at least one to count as a result.
    pub signals: Vec<SignalMatcher>,
    pub name: Selector,
    pub anchor: Selector,
    pub address: Selector,
    /// Address candidates shorter than this (normalized chars) are noise.
    pub min_address_chars: usize,
    /// Absolute links to these hosts (or their subdomains) are never detail links.
    pub social_domains: Vec<&'static str>,
    pub postal_token: Regex,
    pub phone: Regex,
    /// Phone matches with fewer digits are time ranges or house numbers.
    pub min_phone_digits: usize,
    pub distance: Regex,
    pub opening_hours: Regex,
}

impl Default for ExtractRules {
    fn default() -> Self {
        Self {
            card: selector("article, li, .card, .result, .store, .dealer, .entry"),
            signals: vec![
                SignalMatcher::new("details_label", r"(?i)details"),
                SignalMatcher::new("distance", r"(?i)\(\s*\d+[.,]\d+\s*km\s*\)"),
                SignalMatcher::new("city_or_km", r"(?i)Hamburg|Berlin|München|km\)"),
            ],
            name: selector(r#"h3, h2, .title, .name, [class*="title"]"#),
            anchor: selector("a[href]"),
            address: selector("p, .address, address, .addr"),
            min_address_chars: 6,
            social_domains: vec![
                "facebook.com",
                "instagram.com",
                "twitter.com",
                "x.com",
                "youtube.com",
                "linkedin.com",
                "tiktok.com",
                "pinterest.com",
            ],
            postal_token: regex(r"\b\d{5}\b"),
            phone: regex(r"\+?\d[\d \t\-()/]{6,}"),
            min_phone_digits: 6,
            distance: regex(r"(?i)\(\s*(\d+[.,]\d+)\s*km\s*\)"),
            opening_hours: regex(r"(?i)\b(?:Mo|Di|Mi|Do|Fr|Sa|So)[^\n]{0,40}\d{1,2}[:.]\d{2}"),
        }
    }
}

impl ExtractRules {
    /// Name of the first signal matching `text`, if any.
    #[must_use]
    pub fn matching_signal(&self, text: &str) -> Option<&'static str> {
        self.signals
            .iter()
            .find(|signal| signal.is_match(text))
            .map(|signal| signal.name)
    }

    #[must_use]
    pub fn is_social_host(&self, host: &str) -> bool {
        let host = host.trim_start_matches("www.").to_ascii_lowercase();
        self.social_domains
            .iter()
            .any(|domain| host == *domain || host.ends_with(&format!(".{domain}")))
    }
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex")
}
