//! Element locators and the fallback chains for the search form controls.

use std::fmt;

use super::page::BrowserPage;
use crate::error::PageError;

/// One way of finding an element. Operations act on the first match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    Css(String),
    XPath(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    pub fn xpath(expression: impl Into<String>) -> Self {
        Self::XPath(expression.into())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css `{s}`"),
            Self::XPath(s) => write!(f, "xpath `{s}`"),
        }
    }
}

/// Ordered locator fallbacks; the first one matching anything wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorChain {
    what: &'static str,
    locators: Vec<Locator>,
}

impl LocatorChain {
    #[must_use]
    pub fn new(what: &'static str, locators: Vec<Locator>) -> Self {
        Self { what, locators }
    }

    /// Human-readable name of the control, used in logs and errors.
    #[must_use]
    pub fn what(&self) -> &'static str {
        self.what
    }

    #[must_use]
    pub fn locators(&self) -> &[Locator] {
        &self.locators
    }

    /// Returns the first locator that matches at least one element.
    ///
    /// # Errors
    ///
    /// Propagates the page error of the first failing lookup.
    pub async fn resolve(&self, page: &dyn BrowserPage) -> Result<Option<&Locator>, PageError> {
        for locator in &self.locators {
            if page.count(locator).await? > 0 {
                tracing::trace!(what = self.what, %locator, "locator matched");
                return Ok(Some(locator));
            }
        }
        Ok(None)
    }
}

/// Quotes `value` as an XPath 1.0 string literal.
#[must_use]
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    if !value.contains('"') {
        return format!("\"{value}\"");
    }
    let parts: Vec<String> = value.split('\'').map(|part| format!("'{part}'")).collect();
    format!("concat({})", parts.join(", \"'\", "))
}

fn button_with_text(text: &str) -> Locator {
    Locator::xpath(format!(
        "//button[contains(normalize-space(.), {})]",
        xpath_literal(text)
    ))
}

fn element_with_text(text: &str) -> String {
    format!(
        "//*[not(self::script or self::style)][contains(normalize-space(text()), {})]",
        xpath_literal(text)
    )
}

#[must_use]
pub fn consent_button() -> LocatorChain {
    LocatorChain::new(
        "consent button",
        vec![
            button_with_text("Akzeptieren"),
            button_with_text("Einverstanden"),
            Locator::css(r#"[id*="accept"]"#),
        ],
    )
}

#[must_use]
pub fn postal_code_input() -> LocatorChain {
    LocatorChain::new(
        "postal code input",
        vec![
            Locator::css(r#"input[placeholder*="Postleitzahl" i]"#),
            Locator::css(r#"input[aria-label*="Postleitzahl" i]"#),
            Locator::css(r#"input[name*="plz" i]"#),
        ],
    )
}

#[must_use]
pub fn radius_select() -> LocatorChain {
    LocatorChain::new("radius select", vec![Locator::css("select")])
}

#[must_use]
pub fn radius_combobox() -> LocatorChain {
    LocatorChain::new("radius combobox", vec![Locator::css(r#"[role="combobox"]"#)])
}

#[must_use]
pub fn radius_option(radius_km: f64) -> LocatorChain {
    LocatorChain::new(
        "radius option",
        vec![Locator::xpath(format!(
            "//*[normalize-space(text()) = {}]",
            xpath_literal(&format!("{radius_km} km"))
        ))],
    )
}

#[must_use]
pub fn search_button() -> LocatorChain {
    LocatorChain::new(
        "search button",
        vec![
            button_with_text("BIO-H"),
            button_with_text("HÄNDLER FINDEN"),
            button_with_text("Händler finden"),
        ],
    )
}

#[must_use]
pub fn category_label(label: &str) -> LocatorChain {
    LocatorChain::new("category label", vec![Locator::xpath(element_with_text(label))])
}

/// Toggle next to a category label, falling back to the label itself.
#[must_use]
pub fn category_toggle(label: &str) -> LocatorChain {
    let text = element_with_text(label);
    LocatorChain::new(
        "category toggle",
        vec![
            Locator::xpath(format!(
                "({text})[1]/parent::*//input[@type='checkbox' or @type='radio']/.."
            )),
            Locator::xpath(format!(
                "({text})[1]/parent::*//*[contains(@class, 'toggle') or contains(@class, 'switch') or @role='switch']"
            )),
            Locator::xpath(text),
        ],
    )
}
