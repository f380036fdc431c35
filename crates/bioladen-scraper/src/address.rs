//! Street / postal code / city split for result address blocks.

use std::sync::LazyLock;

use bioladen_core::HOME_COUNTRY_CODE;
use regex::Regex;

use crate::normalize::normalize_space;

/// Exactly five digits (not part of a longer digit run), whitespace, then a
/// city token that starts with something other than a digit.
static POSTAL_CITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^0-9])([0-9]{5})\s+([^0-9\s].*)$").expect("valid regex")
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedAddress {
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub country_code: Option<String>,
}

/// Parses an address block given as ordered lines.
///
/// Line 0 is the street. Line 1 is `"<5 digits> <city>"` when it matches,
/// otherwise it is taken whole as the city. Later lines are ignored; the
/// result list never prints more than two meaningful address lines.
#[must_use]
pub fn parse_address<S: AsRef<str>>(lines: &[S]) -> ParsedAddress {
    let mut lines = lines
        .iter()
        .map(|line| normalize_space(Some(line.as_ref())))
        .filter(|line| !line.is_empty());

    let mut parsed = ParsedAddress {
        country_code: Some(HOME_COUNTRY_CODE.to_string()),
        ..ParsedAddress::default()
    };

    let Some(street) = lines.next() else {
        return parsed;
    };
    parsed.street = Some(street);

    if let Some(second) = lines.next() {
        match split_postal_city(&second) {
            Some((postal_code, city)) => {
                parsed.postal_code = Some(postal_code);
                parsed.city = Some(city);
            }
            None => parsed.city = Some(second),
        }
    }

    parsed
}

/// Splits `"20095 Hamburg"` into its postal code and city.
#[must_use]
pub fn split_postal_city(line: &str) -> Option<(String, String)> {
    let caps = POSTAL_CITY_RE.captures(line)?;
    let postal_code = caps.get(1)?.as_str().to_string();
    let city = normalize_space(caps.get(2).map(|m| m.as_str()));
    if city.is_empty() {
        return None;
    }
    Some((postal_code, city))
}
