use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::task::{CategoryFilters, SearchTask};
use crate::ConfigError;

/// Postal code searched when the run input names none.
pub const DEFAULT_POSTAL_CODE: &str = "20095";
pub const DEFAULT_RADIUS_KM: f64 = 25.0;

/// Which identity key the deduplicator derives from a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DedupMode {
    /// Lower-cased, trimmed detail link.
    #[default]
    DetailUrl,
    /// `name|street|postalCode`.
    Composite,
}

impl std::fmt::Display for DedupMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DedupMode::DetailUrl => write!(f, "detailUrl"),
            DedupMode::Composite => write!(f, "composite"),
        }
    }
}

impl std::str::FromStr for DedupMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "detailUrl" | "detail-url" | "detail_url" => Ok(DedupMode::DetailUrl),
            "composite" => Ok(DedupMode::Composite),
            other => Err(ConfigError::Validation(format!(
                "unknown deduplicateBy mode '{other}'; expected \"detailUrl\" or \"composite\""
            ))),
        }
    }
}

/// What to search for in one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunInput {
    #[serde(deserialize_with = "deserialize_postal_codes")]
    pub postal_codes: Vec<String>,
    pub radius_km: f64,
    pub filters: CategoryFilters,
    pub deduplicate_by: DedupMode,
    pub max_concurrency: usize,
}

impl Default for RunInput {
    fn default() -> Self {
        Self {
            postal_codes: vec![DEFAULT_POSTAL_CODE.to_string()],
            radius_km: DEFAULT_RADIUS_KM,
            filters: CategoryFilters::default(),
            deduplicate_by: DedupMode::default(),
            max_concurrency: 1,
        }
    }
}

impl RunInput {
    /// One [`SearchTask`] per postal code, in input order.
    #[must_use]
    pub fn search_tasks(&self) -> Vec<SearchTask> {
        self.postal_codes
            .iter()
            .map(|code| SearchTask::new(code.clone(), self.radius_km, self.filters))
            .collect()
    }
}

/// Postal codes show up as bare numbers in hand-written YAML/JSON input.
fn deserialize_postal_codes<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Text(String),
        Number(u64),
    }

    let codes = Vec::<Code>::deserialize(deserializer)?;
    Ok(codes
        .into_iter()
        .map(|code| match code {
            Code::Text(s) => s.trim().to_string(),
            // Leading zeros are lost in numeric form; German codes are 5 digits.
            Code::Number(n) => format!("{n:05}"),
        })
        .collect())
}

/// Load and validate a run input file (YAML or JSON).
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_run_input(path: &Path) -> Result<RunInput, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::RunInputIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_run_input(&content)
}

/// Parse and validate run input from a YAML or JSON string.
///
/// # Errors
///
/// Returns `ConfigError` if the content cannot be parsed or fails validation.
pub fn parse_run_input(content: &str) -> Result<RunInput, ConfigError> {
    let input: RunInput = if content.trim().is_empty() {
        RunInput::default()
    } else {
        serde_yaml::from_str(content).map_err(ConfigError::RunInputParse)?
    };
    validate_run_input(input)
}

/// Check invariants the navigation layer relies on.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] describing the first violated rule.
pub fn validate_run_input(mut input: RunInput) -> Result<RunInput, ConfigError> {
    if input.postal_codes.is_empty() {
        return Err(ConfigError::Validation(
            "postalCodes must name at least one postal code".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    let mut codes = Vec::with_capacity(input.postal_codes.len());
    for code in input.postal_codes {
        let code = code.trim().to_string();
        if code.is_empty() {
            return Err(ConfigError::Validation(
                "postalCodes must not contain empty entries".to_string(),
            ));
        }
        if !is_german_postal_code(&code) {
            tracing::warn!(postal_code = %code, "postal code is not 5 digits; searching anyway");
        }
        if seen.insert(code.clone()) {
            codes.push(code);
        } else {
            tracing::warn!(postal_code = %code, "duplicate postal code in run input; skipping");
        }
    }
    input.postal_codes = codes;

    if !(input.radius_km.is_finite() && input.radius_km > 0.0) {
        return Err(ConfigError::Validation(format!(
            "radiusKm must be a positive number, got {}",
            input.radius_km
        )));
    }
    if input.max_concurrency == 0 {
        return Err(ConfigError::Validation(
            "maxConcurrency must be at least 1".to_string(),
        ));
    }

    Ok(input)
}

fn is_german_postal_code(code: &str) -> bool {
    code.len() == 5 && code.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
#[path = "run_input_test.rs"]
mod tests;
