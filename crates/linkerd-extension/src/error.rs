use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtensionError {
    // Process errors
    #[error("EXTENSION_SPAWN_FAILED: failed to start {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("EXTENSION_WAIT_FAILED: failed to wait for {command}: {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("EXTENSION_TIMED_OUT: {command} did not finish within {seconds}s")]
    TimedOut { command: String, seconds: u64 },

    #[error("EXTENSION_EXIT_STATUS: {command} exited with {status}")]
    ExitStatus { command: String, status: String },

    // Discovery errors
    #[error("GLOB_FAILED: {pattern}: {reason}")]
    Glob { pattern: String, reason: String },

    #[error("METADATA_INVALID: {path}: {reason}")]
    MetadataInvalid { path: PathBuf, reason: String },

    // Cluster errors
    #[error("LABELS_UNAVAILABLE: {0}")]
    LabelsUnavailable(String),

    // IO errors
    #[error("IO_ERROR: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ExtensionError>;
