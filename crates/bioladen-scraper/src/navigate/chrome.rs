//! [`BrowserPage`] on a local Chrome via the DevTools protocol.
//!
//! `headless_chrome` is synchronous, so every call runs on the blocking pool
//! with its own handle to the tab.

use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::Value;

use super::locator::Locator;
use super::page::{BrowserPage, PageFactory};
use crate::error::PageError;

pub struct ChromeBrowser {
    browser: Browser,
    navigation_timeout: Duration,
}

impl ChromeBrowser {
    /// Starts a Chrome process.
    ///
    /// `navigation_timeout` becomes every tab's default wait for loads and
    /// element lookups.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Driver`] if Chrome cannot be found or started.
    pub async fn launch(headless: bool, navigation_timeout: Duration) -> Result<Self, PageError> {
        let options = LaunchOptions::default_builder()
            .headless(headless)
            .args(vec![OsStr::new("--disable-dev-shm-usage")])
            .idle_browser_timeout(navigation_timeout.saturating_mul(5))
            .build()
            .map_err(|e| PageError::driver("launch", e))?;

        let browser = blocking("launch", move || Browser::new(options)).await?;
        tracing::info!(headless, "chrome launched");
        Ok(Self {
            browser,
            navigation_timeout,
        })
    }
}

#[async_trait]
impl PageFactory for ChromeBrowser {
    async fn open_page(&self) -> Result<Box<dyn BrowserPage>, PageError> {
        let browser = self.browser.clone();
        let timeout = self.navigation_timeout;
        let tab = blocking("new_tab", move || {
            let tab = browser.new_tab()?;
            tab.set_default_timeout(timeout);
            Ok(tab)
        })
        .await?;
        Ok(Box::new(ChromePage { tab }))
    }
}

pub struct ChromePage {
    tab: Arc<Tab>,
}

impl ChromePage {
    async fn evaluate(&self, op: &'static str, script: String) -> Result<Value, PageError> {
        let tab = Arc::clone(&self.tab);
        let object = blocking(op, move || tab.evaluate(&script, false)).await?;
        Ok(object.value.unwrap_or(Value::Null))
    }

    async fn evaluate_u64(&self, op: &'static str, script: String) -> Result<u64, PageError> {
        let value = self.evaluate(op, script).await?;
        value.as_u64().ok_or_else(|| PageError::InvalidResponse {
            op,
            detail: format!("expected a non-negative integer, got {value}"),
        })
    }

    async fn evaluate_on_element(
        &self,
        op: &'static str,
        locator: &Locator,
        body: &str,
    ) -> Result<Value, PageError> {
        let script = format!(
            "(() => {{ const el = {}; if (!el) return null; {body} }})()",
            first_match_expr(locator)
        );
        match self.evaluate(op, script).await? {
            Value::Null => Err(PageError::NotFound {
                what: locator.to_string(),
            }),
            value => Ok(value),
        }
    }
}

#[async_trait]
impl BrowserPage for ChromePage {
    async fn goto(&self, url: &str) -> Result<(), PageError> {
        let tab = Arc::clone(&self.tab);
        let url = url.to_string();
        blocking("goto", move || {
            tab.navigate_to(&url)?.wait_until_navigated()?;
            Ok(())
        })
        .await
    }

    async fn count(&self, locator: &Locator) -> Result<usize, PageError> {
        let count = self.evaluate_u64("count", count_script(locator)).await?;
        usize::try_from(count).map_err(|e| PageError::InvalidResponse {
            op: "count",
            detail: e.to_string(),
        })
    }

    async fn click(&self, locator: &Locator) -> Result<(), PageError> {
        let tab = Arc::clone(&self.tab);
        let locator = locator.clone();
        blocking("click", move || {
            find(&tab, &locator)?.click()?;
            Ok(())
        })
        .await
    }

    async fn clear_and_type(
        &self,
        locator: &Locator,
        text: &str,
        key_delay: Duration,
    ) -> Result<(), PageError> {
        self.evaluate_on_element(
            "clear",
            locator,
            "el.value = ''; el.dispatchEvent(new Event('input', { bubbles: true })); return true;",
        )
        .await?;

        let tab = Arc::clone(&self.tab);
        let locator = locator.clone();
        let text = text.to_string();
        blocking("type", move || {
            find(&tab, &locator)?.click()?;
            let mut buf = [0u8; 4];
            for ch in text.chars() {
                tab.type_str(ch.encode_utf8(&mut buf))?;
                std::thread::sleep(key_delay);
            }
            Ok(())
        })
        .await
    }

    async fn option_texts(&self, locator: &Locator) -> Result<Vec<String>, PageError> {
        let value = self
            .evaluate_on_element(
                "option_texts",
                locator,
                "return JSON.stringify(Array.from(el.options || [], (o) => o.textContent || ''));",
            )
            .await?;
        let raw = value.as_str().ok_or_else(|| PageError::InvalidResponse {
            op: "option_texts",
            detail: format!("expected a JSON string, got {value}"),
        })?;
        serde_json::from_str(raw).map_err(|e| PageError::InvalidResponse {
            op: "option_texts",
            detail: e.to_string(),
        })
    }

    async fn select_option(&self, locator: &Locator, index: usize) -> Result<(), PageError> {
        let body = format!(
            "el.selectedIndex = {index}; \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
             return el.selectedIndex;"
        );
        self.evaluate_on_element("select_option", locator, &body)
            .await
            .map(|_| ())
    }

    async fn scroll_by(&self, pixels: u32) -> Result<(), PageError> {
        self.evaluate("scroll_by", format!("window.scrollBy(0, {pixels}); true"))
            .await
            .map(|_| ())
    }

    async fn scroll_height(&self) -> Result<u64, PageError> {
        self.evaluate_u64(
            "scroll_height",
            "document.body ? document.body.scrollHeight : 0".to_string(),
        )
        .await
    }

    async fn resource_count(&self) -> Result<u64, PageError> {
        self.evaluate_u64(
            "resource_count",
            "performance.getEntriesByType('resource').length".to_string(),
        )
        .await
    }

    async fn content(&self) -> Result<String, PageError> {
        let tab = Arc::clone(&self.tab);
        blocking("content", move || tab.get_content()).await
    }

    async fn url(&self) -> Result<String, PageError> {
        let tab = Arc::clone(&self.tab);
        blocking("url", move || Ok(tab.get_url())).await
    }

    async fn close(&self) -> Result<(), PageError> {
        let tab = Arc::clone(&self.tab);
        blocking("close", move || tab.close(true).map(|_| ())).await
    }
}

fn find<'t>(
    tab: &'t Tab,
    locator: &Locator,
) -> anyhow::Result<headless_chrome::Element<'t>> {
    match locator {
        Locator::Css(selector) => tab.find_element(selector),
        Locator::XPath(expression) => tab.find_element_by_xpath(expression),
    }
}

fn js_string(value: &str) -> String {
    Value::from(value).to_string()
}

fn first_match_expr(locator: &Locator) -> String {
    match locator {
        Locator::Css(selector) => format!("document.querySelector({})", js_string(selector)),
        Locator::XPath(expression) => format!(
            "document.evaluate({}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
            js_string(expression)
        ),
    }
}

fn count_script(locator: &Locator) -> String {
    match locator {
        Locator::Css(selector) => {
            format!("document.querySelectorAll({}).length", js_string(selector))
        }
        Locator::XPath(expression) => format!(
            "document.evaluate({}, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null).snapshotLength",
            js_string(expression)
        ),
    }
}

async fn blocking<T, F>(op: &'static str, call: F) -> Result<T, PageError>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(call)
        .await
        .map_err(|e| PageError::Join(e.to_string()))?
        .map_err(|e| PageError::Driver {
            op,
            message: format!("{e:#}"),
        })
}
