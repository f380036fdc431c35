use std::time::Duration;

use thiserror::Error;

use crate::navigate::NavState;

/// Failures reported by a [`crate::navigate::BrowserPage`] implementation.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("browser driver failed during {op}: {message}")]
    Driver { op: &'static str, message: String },

    #[error("no element matches {what}")]
    NotFound { what: String },

    #[error("unexpected script result for {op}: {detail}")]
    InvalidResponse { op: &'static str, detail: String },

    #[error("browser worker thread failed: {0}")]
    Join(String),
}

impl PageError {
    pub(crate) fn driver(op: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Driver {
            op,
            message: err.to_string(),
        }
    }
}

/// Hard failures that move a navigation run to `Failed`.
///
/// `phase` is the state the run was trying to reach.
#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("{phase} not reached within {budget:?}")]
    PhaseTimeout { phase: NavState, budget: Duration },

    #[error("{phase}: required element not found ({what})")]
    ElementNotFound { phase: NavState, what: &'static str },

    #[error("{phase}: {source}")]
    Page {
        phase: NavState,
        #[source]
        source: PageError,
    },
}

impl NavigationError {
    #[must_use]
    pub fn phase(&self) -> NavState {
        match self {
            Self::PhaseTimeout { phase, .. }
            | Self::ElementNotFound { phase, .. }
            | Self::Page { phase, .. } => *phase,
        }
    }
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("dataset I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("record serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Why a single search task produced no output.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("could not open a browser page: {0}")]
    OpenPage(#[source] PageError),

    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error("dataset sink rejected a record: {0}")]
    Sink(#[from] SinkError),
}
