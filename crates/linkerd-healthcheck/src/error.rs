use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HealthcheckError {
    // Config errors
    #[error("CONFIG_READ_ERROR: failed to read {path}: {reason}")]
    ConfigRead { path: PathBuf, reason: String },

    #[error("CONFIG_PARSE_ERROR: failed to parse {path}: {reason}")]
    ConfigParse { path: PathBuf, reason: String },

    #[error("CONFIG_NOT_FOUND: config file {0} does not exist")]
    ConfigNotFound(PathBuf),

    #[error("CONFIG_INVALID_VALUE: {field}: {reason}")]
    ConfigInvalidValue { field: String, reason: String },

    // Render errors
    #[error("RENDER_JSON_FAILED: {0}")]
    RenderJson(String),

    #[error("RENDER_UNKNOWN_FORMAT: unsupported output format '{0}' (expected table, json or short)")]
    UnknownFormat(String),

    // IO errors
    #[error("IO_ERROR: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<serde_json::Error> for HealthcheckError {
    fn from(err: serde_json::Error) -> Self {
        HealthcheckError::RenderJson(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HealthcheckError>;
