//! Wire formats exchanged with extensions
//!
//! `check --output=json` prints a [`CheckOutput`]; the metadata subcommand
//! prints an [`ExtensionMetadata`]. The host's own JSON report reuses
//! [`CheckOutput`] so an extension's report and `linkerd check -o json` share
//! one shape.

use crate::result::{CheckError, CheckResult};
use serde::{Deserialize, Serialize};

/// Subcommand an extension must implement to describe itself
pub const EXTENSION_METADATA_SUBCOMMAND: &str = "_extension-metadata";

/// `checks` value that makes an extension run regardless of cluster state
pub const CHECKS_ALWAYS: &str = "always";

/// Output of the metadata subcommand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionMetadata {
    pub name: String,
    #[serde(default)]
    pub checks: String,
}

impl ExtensionMetadata {
    pub fn runs_always(&self) -> bool {
        self.checks == CHECKS_ALWAYS
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckResultStr {
    Success,
    Warning,
    Error,
}

/// Output of `check --output=json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutput {
    /// Informational; consumers recompute the verdict from the checks
    #[serde(default)]
    pub success: bool,
    pub categories: Vec<CheckCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckCategory {
    #[serde(rename = "categoryName")]
    pub name: String,
    #[serde(default)]
    pub checks: Vec<Check>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Check {
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub hint: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
    pub result: CheckResultStr,
}

impl From<&CheckResult> for Check {
    fn from(result: &CheckResult) -> Self {
        let status = match (&result.err, result.warning) {
            (None, _) => CheckResultStr::Success,
            (Some(_), true) => CheckResultStr::Warning,
            (Some(_), false) => CheckResultStr::Error,
        };

        Check {
            description: result.description.clone(),
            hint: result.hint_url.clone().unwrap_or_default(),
            error: result
                .err
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            result: status,
        }
    }
}

impl CheckOutput {
    /// Flatten into results, one per nested check, in document order
    pub fn into_results(self) -> Vec<CheckResult> {
        let mut results = Vec::new();

        for category in self.categories {
            for check in category.checks {
                let mut result = CheckResult::success(category.name.clone(), check.description);

                if !check.error.is_empty() {
                    result.err = Some(CheckError::Message(check.error));
                }
                result.warning = check.result == CheckResultStr::Warning;
                if !check.hint.is_empty() {
                    result.hint_url = Some(check.hint);
                }

                results.push(result);
            }
        }

        results
    }
}
