use std::time::Duration;

use thiserror::Error;

/// Failure kinds surfaced by the harness.
///
/// All of them are fail-fast: no helper retries after one of these, the
/// error propagates to the scenario and the test runner reports it.
#[derive(Error, Debug)]
pub enum HarnessError {
    /// An expected UI state did not appear within the bound.
    #[error("timed out after {timeout:?} waiting for {what}")]
    Timeout { what: String, timeout: Duration },

    /// The application showed an inline rejection message instead of the
    /// expected success confirmation.
    #[error("validation rejected: {0}")]
    ValidationRejected(String),

    /// Observed page state did not match the expectation.
    #[error("assertion failed: {0}")]
    AssertionFailed(String),

    /// CDP-level failure (navigation, element lookup, input dispatch).
    #[error("browser error: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    /// A JavaScript probe returned a value of an unexpected shape.
    #[error("evaluation returned unexpected value: {0}")]
    Eval(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarnessError {
    pub fn timeout(what: impl Into<String>, timeout: Duration) -> Self {
        HarnessError::Timeout {
            what: what.into(),
            timeout,
        }
    }
}

pub type Result<T> = std::result::Result<T, HarnessError>;
