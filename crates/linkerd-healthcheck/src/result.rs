//! The atomic unit of check output and the observer it is streamed through

use thiserror::Error;

/// Base URL every hint anchor is appended to unless configured otherwise
pub const DEFAULT_HINT_BASE_URL: &str = "https://linkerd.io/2/checks/#";

/// Error carried by a failed or warning [`CheckResult`]
///
/// Every failure mode of a check run ends up here as data, so both output
/// formats can render it the same way.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    #[error("{0}")]
    Message(String),

    #[error("exec: \"{name}\": executable file not found in $PATH")]
    ExecutableNotFound { name: String },

    #[error(
        "invalid extension check output from \"{command}\" (JSON object expected):\n{stdout}\n[{reason}]"
    )]
    InvalidOutput {
        command: String,
        stdout: String,
        reason: String,
    },

    /// Standard error of a failed extension, verbatim
    #[error("{0}")]
    Stderr(String),

    #[error("\"{command}\" did not finish within {seconds}s and was killed")]
    TimedOut { command: String, seconds: u64 },

    #[error("built-in extension \"{name}\" panicked: {message}")]
    Panicked { name: String, message: String },
}

impl CheckError {
    pub fn msg(message: impl Into<String>) -> Self {
        CheckError::Message(message.into())
    }
}

impl From<anyhow::Error> for CheckError {
    fn from(err: anyhow::Error) -> Self {
        CheckError::Message(format!("{err:#}"))
    }
}

/// Result of a single check
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    pub category: String,
    pub description: String,
    pub hint_anchor: Option<String>,
    pub hint_url: Option<String>,
    pub warning: bool,
    pub retry: bool,
    pub err: Option<CheckError>,
}

impl CheckResult {
    /// Create a passing check result
    pub fn success(category: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            description: description.into(),
            hint_anchor: None,
            hint_url: None,
            warning: false,
            retry: false,
            err: None,
        }
    }

    /// Create a failing check result
    pub fn failure(
        category: impl Into<String>,
        description: impl Into<String>,
        err: CheckError,
    ) -> Self {
        Self {
            err: Some(err),
            ..Self::success(category, description)
        }
    }

    /// Create an advisory check result that does not fail the run
    pub fn warning(
        category: impl Into<String>,
        description: impl Into<String>,
        err: CheckError,
    ) -> Self {
        Self {
            warning: true,
            ..Self::failure(category, description, err)
        }
    }

    pub fn with_hint_url(mut self, url: impl Into<String>) -> Self {
        self.hint_url = Some(url.into());
        self
    }

    /// Set the anchor and resolve it against `base_url`
    pub fn with_hint_anchor(mut self, base_url: &str, anchor: impl Into<String>) -> Self {
        let anchor = anchor.into();
        self.hint_url = Some(format!("{base_url}{anchor}"));
        self.hint_anchor = Some(anchor);
        self
    }

    pub fn retrying(mut self) -> Self {
        self.retry = true;
        self
    }

    /// A final result that counts against the run
    pub fn is_failure(&self) -> bool {
        !self.retry && self.err.is_some() && !self.warning
    }

    /// A final result that degrades, but does not fail, the run
    pub fn is_warning(&self) -> bool {
        !self.retry && self.err.is_some() && self.warning
    }
}

/// Receives every check result in producer order
pub trait CheckObserver {
    fn observe(&mut self, result: &CheckResult);

    /// Announce long-running work whose results have not arrived yet
    fn progress(&mut self, _message: &str) {}
}

impl<F> CheckObserver for F
where
    F: FnMut(&CheckResult),
{
    fn observe(&mut self, result: &CheckResult) {
        self(result)
    }
}

/// Aggregate outcome of a run
///
/// `success` only flips on hard failures; warnings are tracked separately so
/// callers can tell a clean run from a degraded one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub success: bool,
    pub warning: bool,
}

impl Default for Verdict {
    fn default() -> Self {
        Self {
            success: true,
            warning: false,
        }
    }
}

impl Verdict {
    pub fn record(&mut self, result: &CheckResult) {
        if result.is_failure() {
            self.success = false;
        }
        if result.is_warning() {
            self.warning = true;
        }
    }
}
