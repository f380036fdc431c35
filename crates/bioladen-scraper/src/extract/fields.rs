//! Per-block subfield resolvers.
//!
//! Each resolver is independent: a missing subfield yields `None` and never
//! stops the others.

use scraper::ElementRef;
use url::Url;

use super::rules::ExtractRules;
use super::text::block_text;
use crate::address::{parse_address, ParsedAddress};
use crate::normalize::{non_empty, normalize_space};

pub(super) fn resolve_name(block: ElementRef<'_>, rules: &ExtractRules) -> Option<String> {
    let heading = block.select(&rules.name).next()?;
    non_empty(Some(heading.text().collect::<String>().as_str()))
}

/// First absolute link to a non-social host, else the first root-relative
/// link resolved against `base`.
pub(super) fn resolve_detail_url(
    block: ElementRef<'_>,
    rules: &ExtractRules,
    base: Option<&Url>,
) -> Option<String> {
    let hrefs: Vec<&str> = block
        .select(&rules.anchor)
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .collect();

    let external = hrefs.iter().find_map(|href| {
        let url = Url::parse(href).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        if url.host_str().is_some_and(|host| rules.is_social_host(host)) {
            return None;
        }
        Some(url.to_string())
    });
    if external.is_some() {
        return external;
    }

    let base = base?;
    hrefs
        .iter()
        .filter(|href| href.starts_with('/'))
        .find_map(|href| base.join(href).ok())
        .map(|url| url.to_string())
}

/// Picks the authoritative address element and parses it.
///
/// Candidates are address-like descendants with at least
/// `rules.min_address_chars` characters; the first one containing a 5-digit
/// token wins, otherwise the first candidate.
pub(super) fn resolve_address(block: ElementRef<'_>, rules: &ExtractRules) -> ParsedAddress {
    let candidates: Vec<(String, String)> = block
        .select(&rules.address)
        .map(|el| {
            let raw = block_text(el);
            let normalized = normalize_space(Some(raw.as_str()));
            (raw, normalized)
        })
        .filter(|(_, normalized)| normalized.chars().count() >= rules.min_address_chars)
        .collect();

    let chosen = candidates
        .iter()
        .find(|(_, normalized)| rules.postal_token.is_match(normalized))
        .or_else(|| candidates.first());

    let Some((raw, _)) = chosen else {
        return ParsedAddress::default();
    };

    let lines: Vec<&str> = raw.split(['\n', '·', '|']).collect();
    parse_address(&lines)
}

pub(super) fn resolve_phone(text: &str, rules: &ExtractRules) -> Option<String> {
    text.lines()
        .flat_map(|line| rules.phone.find_iter(line))
        .map(|m| normalize_space(Some(m.as_str())))
        .find(|candidate| {
            candidate.chars().filter(char::is_ascii_digit).count() >= rules.min_phone_digits
        })
}

pub(super) fn resolve_distance_km(text: &str, rules: &ExtractRules) -> Option<f64> {
    let caps = rules.distance.captures(text)?;
    let raw = caps.get(1)?.as_str().trim().replace(',', ".");
    raw.parse::<f64>().ok()
}

pub(super) fn resolve_opening_hours(text: &str, rules: &ExtractRules) -> Option<String> {
    rules
        .opening_hours
        .find(text)
        .and_then(|m| non_empty(Some(m.as_str())))
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use super::*;

    fn with_block<T>(html: &str, f: impl FnOnce(ElementRef<'_>) -> T) -> T {
        let doc = Html::parse_fragment(html);
        let sel = Selector::parse(".card").unwrap();
        let block = doc.select(&sel).next().expect("fixture has a .card");
        f(block)
    }

    #[test]
    fn name_comes_from_first_heading() {
        let rules = ExtractRules::default();
        let name = with_block(
            r#"<div class="card"><h2> Bioladen&nbsp;Nord </h2><h3>Ignored</h3></div>"#,
            |b| resolve_name(b, &rules),
        );
        assert_eq!(name.as_deref(), Some("Bioladen Nord"));
    }

    #[test]
    fn empty_heading_is_no_name() {
        let rules = ExtractRules::default();
        let name = with_block(r#"<div class="card"><h3>  </h3></div>"#, |b| {
            resolve_name(b, &rules)
        });
        assert_eq!(name, None);
    }

    #[test]
    fn detail_url_skips_social_links() {
        let rules = ExtractRules::default();
        let url = with_block(
            r#"<div class="card">
                 <a href="https://www.facebook.com/bioladen">fb</a>
                 <a href="https://www.instagram.com/bioladen">ig</a>
                 <a href="https://bioladen-nord.de/">web</a>
               </div>"#,
            |b| resolve_detail_url(b, &rules, None),
        );
        assert_eq!(url.as_deref(), Some("https://bioladen-nord.de/"));
    }

    #[test]
    fn detail_url_falls_back_to_root_relative_link() {
        let rules = ExtractRules::default();
        let base = Url::parse("https://www.bioladen.de/bio-haendler-suche").unwrap();
        let url = with_block(
            r#"<div class="card">
                 <a href="https://facebook.com/x">fb</a>
                 <a href="mailto:info@x.de">mail</a>
                 <a href="/haendler/bioladen-nord">DETAILS</a>
               </div>"#,
            |b| resolve_detail_url(b, &rules, Some(&base)),
        );
        assert_eq!(
            url.as_deref(),
            Some("https://www.bioladen.de/haendler/bioladen-nord")
        );
    }

    #[test]
    fn relative_link_without_base_is_dropped() {
        let rules = ExtractRules::default();
        let url = with_block(r#"<div class="card"><a href="/x">DETAILS</a></div>"#, |b| {
            resolve_detail_url(b, &rules, None)
        });
        assert_eq!(url, None);
    }

    #[test]
    fn address_prefers_block_with_postal_code() {
        let rules = ExtractRules::default();
        let parsed = with_block(
            r#"<div class="card">
                 <p>Frische Ware aus der Region</p>
                 <p>Hauptstraße 5<br>20095 Hamburg</p>
               </div>"#,
            |b| resolve_address(b, &rules),
        );
        assert_eq!(parsed.street.as_deref(), Some("Hauptstraße 5"));
        assert_eq!(parsed.postal_code.as_deref(), Some("20095"));
        assert_eq!(parsed.city.as_deref(), Some("Hamburg"));
    }

    #[test]
    fn address_splits_on_middot_and_pipe() {
        let rules = ExtractRules::default();
        let dot = with_block(
            r#"<div class="card"><address>Am Markt 1 · 10115 Berlin</address></div>"#,
            |b| resolve_address(b, &rules),
        );
        assert_eq!(dot.street.as_deref(), Some("Am Markt 1"));
        assert_eq!(dot.city.as_deref(), Some("Berlin"));

        let pipe = with_block(
            r#"<div class="card"><span class="addr">Am Markt 1 | 10115 Berlin</span></div>"#,
            |b| resolve_address(b, &rules),
        );
        assert_eq!(pipe.postal_code.as_deref(), Some("10115"));
    }

    #[test]
    fn short_fragments_are_not_addresses() {
        let rules = ExtractRules::default();
        let parsed = with_block(r#"<div class="card"><p>Neu</p></div>"#, |b| {
            resolve_address(b, &rules)
        });
        assert_eq!(parsed, ParsedAddress::default());
    }

    #[test]
    fn phone_ignores_time_ranges_and_crossing_lines() {
        let rules = ExtractRules::default();
        let text = "Hauptstraße 5\n20095 Hamburg\nMo-Fr 09:00 - 18:00\nTel. +49 40 123456-7";
        assert_eq!(
            resolve_phone(text, &rules).as_deref(),
            Some("+49 40 123456-7")
        );
    }

    #[test]
    fn phone_absent_when_no_long_digit_run() {
        let rules = ExtractRules::default();
        assert_eq!(resolve_phone("Hauptstraße 5\n20095 Hamburg", &rules), None);
    }

    #[test]
    fn distance_converts_decimal_comma() {
        let rules = ExtractRules::default();
        assert_eq!(resolve_distance_km("Bioladen (2,4 km)", &rules), Some(2.4));
        assert_eq!(resolve_distance_km("( 12.75 km )", &rules), Some(12.75));
        assert_eq!(resolve_distance_km("2 km entfernt", &rules), None);
    }

    #[test]
    fn opening_hours_stay_on_one_line() {
        let rules = ExtractRules::default();
        assert_eq!(
            resolve_opening_hours("Sa\n10:00", &rules),
            None,
            "weekday and time on different lines"
        );
        assert_eq!(
            resolve_opening_hours("Öffnungszeiten\nSa 8.00 - 13.00 Uhr", &rules).as_deref(),
            Some("Sa 8.00 - 13.00")
        );
    }
}
