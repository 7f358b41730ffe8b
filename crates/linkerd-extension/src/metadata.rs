//! The `_extension-metadata` probe

use crate::capability::{ProcessRunner, command_line};
use crate::discovery::file_name;
use crate::error::{ExtensionError, Result};
use linkerd_healthcheck::ExtensionMetadata;
use linkerd_healthcheck::schema::EXTENSION_METADATA_SUBCOMMAND;
use std::path::Path;

/// Ask `candidate` to describe itself
pub fn probe(runner: &dyn ProcessRunner, candidate: &Path) -> Result<ExtensionMetadata> {
    let args = [EXTENSION_METADATA_SUBCOMMAND.to_string()];
    let output = runner.run(candidate, &args)?;

    if !output.success {
        return Err(ExtensionError::ExitStatus {
            command: command_line(candidate, &args),
            status: output.status_description(),
        });
    }

    serde_json::from_slice(&output.stdout).map_err(|e| ExtensionError::MetadataInvalid {
        path: candidate.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Whether `metadata` makes `candidate` run unconditionally
///
/// The metadata name has to match the executable's file name, ignoring case.
/// An unrelated program that happens to be called `linkerd-*` is never run.
pub fn runs_always(candidate: &Path, metadata: &ExtensionMetadata) -> bool {
    metadata.runs_always() && file_name(candidate).to_lowercase() == metadata.name.to_lowercase()
}

/// Probe `candidate` and report whether it runs unconditionally
///
/// Probe failures are logged and count as "no".
pub fn probe_runs_always(runner: &dyn ProcessRunner, candidate: &Path) -> bool {
    match probe(runner, candidate) {
        Ok(metadata) => {
            let always = runs_always(candidate, &metadata);
            tracing::debug!(
                path = %candidate.display(),
                name = %metadata.name,
                checks = %metadata.checks,
                always,
                "extension metadata"
            );
            always
        }
        Err(err) => {
            tracing::debug!(path = %candidate.display(), error = %err, "metadata probe failed");
            false
        }
    }
}
