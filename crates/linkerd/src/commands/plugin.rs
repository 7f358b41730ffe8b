//! `linkerd <name> ...` runs the `linkerd-<name>` executable on PATH

use anyhow::{Context as _, Result, bail};
use linkerd_extension::EXTENSION_PREFIX;
use linkerd_healthcheck::CheckError;
use std::process::Command;

/// Run `linkerd-<args[0]>` with the remaining arguments, inheriting stdio
///
/// # Returns
///
/// The plugin's exit code, or 1 when it was killed by a signal.
pub fn run(args: Vec<String>) -> Result<i32> {
    let Some((name, rest)) = args.split_first() else {
        bail!("no command given");
    };

    let program = format!("{EXTENSION_PREFIX}{name}");
    let path = which::which(&program).map_err(|_| CheckError::ExecutableNotFound {
        name: program.clone(),
    })?;

    tracing::debug!(path = %path.display(), ?rest, "running plugin");
    let status = Command::new(&path)
        .args(rest)
        .status()
        .with_context(|| format!("failed to run {}", path.display()))?;

    Ok(status.code().unwrap_or(1))
}
