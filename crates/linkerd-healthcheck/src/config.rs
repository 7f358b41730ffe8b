//! `check.toml` schema

use crate::error::{HealthcheckError, Result};
use crate::result::DEFAULT_HINT_BASE_URL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckConfig {
    #[serde(default)]
    pub extensions: ExtensionsConfig,
    #[serde(default)]
    pub hints: HintsConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtensionsConfig {
    /// Kill an extension that runs longer than this; unbounded when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Suffixes (`foo` for `linkerd-foo`) that are never run nor reported missing
    #[serde(default)]
    pub disabled: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HintsConfig {
    #[serde(default = "default_hint_base_url")]
    pub base_url: String,
}

impl Default for HintsConfig {
    fn default() -> Self {
        Self {
            base_url: default_hint_base_url(),
        }
    }
}

fn default_hint_base_url() -> String {
    DEFAULT_HINT_BASE_URL.to_string()
}

impl ExtensionsConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl CheckConfig {
    /// Default location: `<config dir>/linkerd/check.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("linkerd").join("check.toml"))
    }

    /// Read a `check.toml` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| HealthcheckError::ConfigRead {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let config: CheckConfig =
            toml::from_str(&content).map_err(|e| HealthcheckError::ConfigParse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        config.validate()?;

        Ok(config)
    }

    /// Load an explicit file (which must exist), else the default file if present
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(HealthcheckError::ConfigNotFound(path.to_path_buf()));
            }
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "loading check config");
                Self::from_file(path)
            }
            _ => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.extensions.timeout_secs == Some(0) {
            return Err(HealthcheckError::ConfigInvalidValue {
                field: "extensions.timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.hints.base_url.trim().is_empty() {
            return Err(HealthcheckError::ConfigInvalidValue {
                field: "hints.base_url".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
