use std::path::PathBuf;
use std::time::Duration;

/// Process-level settings read from the environment.
///
/// Everything that tunes how the browser is driven lives here; what to
/// search for lives in [`crate::RunInput`].
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Search page every task starts from.
    pub start_url: String,
    pub headless: bool,
    pub log_level: String,
    /// JSON Lines file the dataset sink appends to.
    pub output_path: PathBuf,
    /// Default wait for browser-level element lookups and page loads.
    pub navigation_timeout_secs: u64,
    /// Budget for each navigation phase; exceeding it fails the task.
    pub phase_timeout_secs: u64,
    pub consent_timeout_ms: u64,
    /// Fixed wait after submitting the search, before the idle check.
    pub settle_delay_ms: u64,
    /// Window without new network activity that counts as idle.
    pub network_idle_ms: u64,
    pub scroll_step_px: u32,
    pub scroll_pause_ms: u64,
    pub scroll_max_steps: u32,
    pub toggle_pause_ms: u64,
    pub type_delay_ms: u64,
}

impl AppConfig {
    #[must_use]
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    #[must_use]
    pub fn phase_timeout(&self) -> Duration {
        Duration::from_secs(self.phase_timeout_secs)
    }
}
