//! Whitespace canonicalization for scraped text fragments.

/// Collapses every run of Unicode whitespace (tabs, newlines, U+00A0, ...)
/// into a single ASCII space and trims both ends. `None` yields `""`.
#[must_use]
pub fn normalize_space(input: Option<&str>) -> String {
    let Some(input) = input else {
        return String::new();
    };

    let mut out = String::with_capacity(input.len());
    for word in input.split(char::is_whitespace).filter(|w| !w.is_empty()) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// [`normalize_space`] for optional fields: blank results become `None`.
#[must_use]
pub fn non_empty(input: Option<&str>) -> Option<String> {
    let normalized = normalize_space(input);
    (!normalized.is_empty()).then_some(normalized)
}
