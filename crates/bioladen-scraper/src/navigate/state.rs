use std::fmt;

/// Position of one postal-code run in the search flow.
///
/// States only move forward in declaration order; `Failed` is terminal and
/// reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NavState {
    Init,
    ConsentDismissed,
    InputsFilled,
    FiltersApplied,
    SearchSubmitted,
    ResultsSettled,
    Extracted,
    Done,
    Failed,
}

impl NavState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Init => "Init",
            Self::ConsentDismissed => "ConsentDismissed",
            Self::InputsFilled => "InputsFilled",
            Self::FiltersApplied => "FiltersApplied",
            Self::SearchSubmitted => "SearchSubmitted",
            Self::ResultsSettled => "ResultsSettled",
            Self::Extracted => "Extracted",
            Self::Done => "Done",
            Self::Failed => "Failed",
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// The state a successful step from `self` leads to.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Init => Some(Self::ConsentDismissed),
            Self::ConsentDismissed => Some(Self::InputsFilled),
            Self::InputsFilled => Some(Self::FiltersApplied),
            Self::FiltersApplied => Some(Self::SearchSubmitted),
            Self::SearchSubmitted => Some(Self::ResultsSettled),
            Self::ResultsSettled => Some(Self::Extracted),
            Self::Extracted => Some(Self::Done),
            Self::Done | Self::Failed => None,
        }
    }
}

impl fmt::Display for NavState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a best-effort UI interaction. Never aborts the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    Ok,
    /// The control was not on the page.
    Skipped,
    Failed(String),
}

impl Interaction {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Logs the outcome for `step` of the run for `postal_code`.
    pub fn log(&self, postal_code: &str, step: &str) {
        match self {
            Self::Ok => tracing::debug!(postal_code, step, "interaction ok"),
            Self::Skipped => tracing::info!(postal_code, step, "interaction skipped: control not found"),
            Self::Failed(reason) => {
                tracing::warn!(postal_code, step, reason = reason.as_str(), "interaction failed");
            }
        }
    }
}

impl fmt::Display for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => f.write_str("ok"),
            Self::Skipped => f.write_str("skipped"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}
