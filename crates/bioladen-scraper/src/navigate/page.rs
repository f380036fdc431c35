use std::time::Duration;

use async_trait::async_trait;

use super::locator::Locator;
use crate::error::PageError;

/// The slice of a browser tab the navigation controller drives.
///
/// Element operations act on the first element `locator` matches and fail
/// with [`PageError::NotFound`] when nothing matches.
#[async_trait]
pub trait BrowserPage: Send + Sync {
    /// Loads `url` and waits for the document to be ready.
    async fn goto(&self, url: &str) -> Result<(), PageError>;

    async fn count(&self, locator: &Locator) -> Result<usize, PageError>;

    async fn click(&self, locator: &Locator) -> Result<(), PageError>;

    /// Clears the input, then types `text` one character at a time.
    async fn clear_and_type(
        &self,
        locator: &Locator,
        text: &str,
        key_delay: Duration,
    ) -> Result<(), PageError>;

    /// Text of every `<option>` of the matched `<select>`.
    async fn option_texts(&self, locator: &Locator) -> Result<Vec<String>, PageError>;

    async fn select_option(&self, locator: &Locator, index: usize) -> Result<(), PageError>;

    async fn scroll_by(&self, pixels: u32) -> Result<(), PageError>;

    async fn scroll_height(&self) -> Result<u64, PageError>;

    /// Number of network resources the page has requested so far.
    async fn resource_count(&self) -> Result<u64, PageError>;

    /// Serialized DOM of the current document.
    async fn content(&self) -> Result<String, PageError>;

    async fn url(&self) -> Result<String, PageError>;

    async fn close(&self) -> Result<(), PageError>;
}

/// Opens a fresh page per search task.
#[async_trait]
pub trait PageFactory: Send + Sync {
    async fn open_page(&self) -> Result<Box<dyn BrowserPage>, PageError>;
}
