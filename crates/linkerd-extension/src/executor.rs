//! Running extensions and folding their output into check results
//!
//! Nothing an extension does can abort the run: a crash, garbage on stdout, a
//! timeout or a panic in a built-in all become a single failed result
//! attributed to that extension.

use crate::builtin::{BuiltinCheck, BuiltinRegistry};
use crate::capability::{ProcessOutput, ProcessRunner, command_line};
use crate::discovery::{EXTENSION_PREFIX, Extension};
use crate::error::ExtensionError;
use linkerd_healthcheck::{CheckError, CheckObserver, CheckOutput, CheckResult, Verdict};
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Subcommand every extension runs its checks under
pub const CHECK_SUBCOMMAND: &str = "check";

/// Flag appended last so extensions always answer in JSON
pub const JSON_OUTPUT_FLAG: &str = "--output=json";

/// Warning reported for a labelled extension nobody provides
///
/// `name` is the full `linkerd-<label>` name.
pub fn missing_extension_result(name: &str) -> CheckResult {
    CheckResult::warning(
        name,
        format!("Linkerd extension command {name} exists"),
        CheckError::ExecutableNotFound {
            name: name.to_string(),
        },
    )
}

/// Dispatches extensions one at a time, in the order given
pub struct ExtensionExecutor<'a> {
    runner: &'a dyn ProcessRunner,
    builtins: &'a BuiltinRegistry,
    flags: Vec<String>,
}

impl<'a> ExtensionExecutor<'a> {
    /// `flags` are forwarded verbatim, ahead of `--output=json`
    pub fn new(runner: &'a dyn ProcessRunner, builtins: &'a BuiltinRegistry, flags: Vec<String>) -> Self {
        Self {
            runner,
            builtins,
            flags,
        }
    }

    /// Arguments `extension` is invoked with
    pub fn args(&self, extension: &Extension) -> Vec<String> {
        let mut args = Vec::with_capacity(self.flags.len() + 3);
        if let Some(name) = &extension.builtin {
            args.push(name.clone());
        }
        args.push(CHECK_SUBCOMMAND.to_string());
        args.extend(self.flags.iter().cloned());
        args.push(JSON_OUTPUT_FLAG.to_string());
        args
    }

    /// Run one extension and return its results in report order
    pub fn run(&self, extension: &Extension) -> Vec<CheckResult> {
        if let Some(name) = &extension.builtin {
            if let Some(handler) = self.builtins.get(name) {
                return self.run_in_process(name, handler);
            }
        }
        self.run_process(extension)
    }

    /// Run every extension, then report every missing one, streaming each
    /// result to `observer`
    pub fn run_all(
        &self,
        extensions: &[Extension],
        missing: &[String],
        observer: &mut dyn CheckObserver,
    ) -> Verdict {
        let mut verdict = Verdict::default();

        for extension in extensions {
            observer.progress(&format!("Running {extension} check"));
            for result in self.run(extension) {
                verdict.record(&result);
                observer.observe(&result);
            }
        }

        for name in missing {
            let result = missing_extension_result(name);
            verdict.record(&result);
            observer.observe(&result);
        }

        verdict
    }

    fn run_process(&self, extension: &Extension) -> Vec<CheckResult> {
        let args = self.args(extension);
        let command = command_line(&extension.path, &args);
        let category = extension.name();
        let description = format!("Running: {command}");

        let output = match self.runner.run(&extension.path, &args) {
            Ok(output) => output,
            Err(ExtensionError::TimedOut { seconds, .. }) => {
                return vec![CheckResult::failure(
                    category,
                    description,
                    CheckError::TimedOut { command, seconds },
                )];
            }
            Err(err) => {
                tracing::debug!(%command, error = %err, "extension did not run");
                return vec![CheckResult::failure(
                    category,
                    description,
                    CheckError::msg(err.to_string()),
                )];
            }
        };

        match serde_json::from_slice::<CheckOutput>(&output.stdout) {
            Ok(document) => document.into_results(),
            Err(err) => {
                tracing::debug!(%command, error = %err, "unusable extension output");
                vec![CheckResult::failure(
                    category,
                    description,
                    output_error(command, &output, err.to_string()),
                )]
            }
        }
    }

    fn run_in_process(&self, name: &str, handler: &dyn BuiltinCheck) -> Vec<CheckResult> {
        match catch_unwind(AssertUnwindSafe(|| handler.run(&self.flags))) {
            Ok(results) => results,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::warn!(extension = name, %message, "built-in extension panicked");
                vec![CheckResult::failure(
                    format!("{EXTENSION_PREFIX}{name}"),
                    format!("Running: linkerd {name} {CHECK_SUBCOMMAND}"),
                    CheckError::Panicked {
                        name: name.to_string(),
                        message,
                    },
                )]
            }
        }
    }
}

/// Stderr, when the extension wrote any, says more than its stdout
fn output_error(command: String, output: &ProcessOutput, reason: String) -> CheckError {
    let stderr = output.stderr_lossy();
    if !stderr.trim().is_empty() {
        return CheckError::Stderr(stderr.into_owned());
    }

    CheckError::InvalidOutput {
        command,
        stdout: output.stdout_lossy().into_owned(),
        reason,
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
