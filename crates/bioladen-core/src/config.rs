use crate::app_config::AppConfig;
use crate::ConfigError;

pub const DEFAULT_START_URL: &str = "https://www.bioladen.de/bio-haendler-suche";

/// Load process configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load process configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can feed a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let start_url = or_default("BIOLADEN_START_URL", DEFAULT_START_URL);
    if !(start_url.starts_with("https://") || start_url.starts_with("http://")) {
        return Err(ConfigError::InvalidEnvVar {
            var: "BIOLADEN_START_URL".to_string(),
            reason: format!("expected an http(s) URL, got \"{start_url}\""),
        });
    }

    let headless = parse_bool("BIOLADEN_HEADLESS", &or_default("BIOLADEN_HEADLESS", "true"))?;
    let log_level = or_default("BIOLADEN_LOG_LEVEL", "info");
    let output_path = PathBuf::from(or_default(
        "BIOLADEN_OUTPUT_PATH",
        "./storage/dataset.jsonl",
    ));

    let navigation_timeout_secs = parse_u64("BIOLADEN_NAVIGATION_TIMEOUT_SECS", "60")?;
    let phase_timeout_secs = parse_u64("BIOLADEN_PHASE_TIMEOUT_SECS", "60")?;
    if phase_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "BIOLADEN_PHASE_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    let consent_timeout_ms = parse_u64("BIOLADEN_CONSENT_TIMEOUT_MS", "2000")?;
    let settle_delay_ms = parse_u64("BIOLADEN_SETTLE_DELAY_MS", "1000")?;
    let network_idle_ms = parse_u64("BIOLADEN_NETWORK_IDLE_MS", "500")?;
    let scroll_step_px = parse_u32("BIOLADEN_SCROLL_STEP_PX", "1500")?;
    let scroll_pause_ms = parse_u64("BIOLADEN_SCROLL_PAUSE_MS", "500")?;
    let scroll_max_steps = parse_u32("BIOLADEN_SCROLL_MAX_STEPS", "20")?;
    let toggle_pause_ms = parse_u64("BIOLADEN_TOGGLE_PAUSE_MS", "300")?;
    let type_delay_ms = parse_u64("BIOLADEN_TYPE_DELAY_MS", "50")?;

    Ok(AppConfig {
        start_url,
        headless,
        log_level,
        output_path,
        navigation_timeout_secs,
        phase_timeout_secs,
        consent_timeout_ms,
        settle_delay_ms,
        network_idle_ms,
        scroll_step_px,
        scroll_pause_ms,
        scroll_max_steps,
        toggle_pause_ms,
        type_delay_ms,
    })
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean, got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
