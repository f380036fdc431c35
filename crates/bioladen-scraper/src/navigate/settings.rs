use std::time::Duration;

use bioladen_core::{AppConfig, DEFAULT_START_URL};

/// Timing and target knobs for one navigation run.
#[derive(Debug, Clone)]
pub struct NavSettings {
    pub start_url: String,
    /// Budget for loading the start page and dismissing the consent overlay.
    pub navigation_timeout: Duration,
    /// Budget for every later phase.
    pub phase_timeout: Duration,
    pub consent_timeout: Duration,
    pub type_delay: Duration,
    pub toggle_pause: Duration,
    pub settle_delay: Duration,
    pub network_idle: Duration,
    pub scroll_step_px: u32,
    pub scroll_pause: Duration,
    pub scroll_max_steps: u32,
}

impl Default for NavSettings {
    fn default() -> Self {
        Self {
            start_url: DEFAULT_START_URL.to_string(),
            navigation_timeout: Duration::from_secs(60),
            phase_timeout: Duration::from_secs(60),
            consent_timeout: Duration::from_millis(2000),
            type_delay: Duration::from_millis(50),
            toggle_pause: Duration::from_millis(300),
            settle_delay: Duration::from_millis(1000),
            network_idle: Duration::from_millis(500),
            scroll_step_px: 1500,
            scroll_pause: Duration::from_millis(500),
            scroll_max_steps: 20,
        }
    }
}

impl From<&AppConfig> for NavSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            start_url: config.start_url.clone(),
            navigation_timeout: config.navigation_timeout(),
            phase_timeout: config.phase_timeout(),
            consent_timeout: Duration::from_millis(config.consent_timeout_ms),
            type_delay: Duration::from_millis(config.type_delay_ms),
            toggle_pause: Duration::from_millis(config.toggle_pause_ms),
            settle_delay: Duration::from_millis(config.settle_delay_ms),
            network_idle: Duration::from_millis(config.network_idle_ms),
            scroll_step_px: config.scroll_step_px,
            scroll_pause: Duration::from_millis(config.scroll_pause_ms),
            scroll_max_steps: config.scroll_max_steps,
        }
    }
}
