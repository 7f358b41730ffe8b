//! Discovery and dispatch of `linkerd-*` health-check extensions.
//!
//! An extension is an executable on `PATH` named `linkerd-<name>` that
//! understands two subcommands: `_extension-metadata`, which describes the
//! extension, and `check --output=json`, which runs its checks and prints a
//! [`CheckOutput`](linkerd_healthcheck::CheckOutput) document.
//!
//! # Architecture
//!
//! - [`capability`]: the two OS seams (directory globbing and process
//!   execution) behind traits, so discovery runs against fakes in tests
//! - [`discovery`]: PATH scan, metadata policy and namespace-label matching
//! - [`metadata`]: the `_extension-metadata` probe
//! - [`executor`]: runs one extension and turns whatever it printed into
//!   check results
//! - [`builtin`]: extensions compiled into the host binary
//! - [`labels`]: where the on-cluster extension labels come from
//!
//! # Check Flow
//!
//! ```text
//! Discovery::find_extensions()
//!     ↓
//! 1. Glob every PATH directory for linkerd-*
//!     → resolve each match, first suffix wins
//!     ↓
//! 2. Probe each candidate with _extension-metadata
//!     → keep {"checks": "always"} with a matching name
//!     ↓
//! 3. Match namespace labels
//!     → PATH candidate, else built-in, else missing
//!     ↓
//! ExtensionExecutor::run_all()
//!     → <ext> check <flags> --output=json, one at a time
//!     → missing extensions become warnings
//! ```
//!
//! # Examples
//!
//! ```no_run
//! use linkerd_extension::{
//!     BuiltinRegistry, Discovery, ExtensionExecutor, GlobLister, OsProcessRunner,
//! };
//! use linkerd_healthcheck::CheckResult;
//!
//! let lister = GlobLister;
//! let runner = OsProcessRunner::new();
//! let path_env = std::env::var("PATH").unwrap_or_default();
//!
//! let found = Discovery::new(&lister, &runner, "/usr/local/bin/linkerd")
//!     .find_extensions(&path_env, &["viz".to_string()]);
//!
//! let builtins = BuiltinRegistry::new();
//! let executor = ExtensionExecutor::new(&runner, &builtins, Vec::new());
//! let mut printed = |result: &CheckResult| println!("{}", result.description);
//! let verdict = executor.run_all(&found.extensions, &found.missing, &mut printed);
//! println!("success: {}", verdict.success);
//! ```

pub mod builtin;
pub mod capability;
pub mod discovery;
pub mod error;
pub mod executor;
pub mod labels;
pub mod metadata;

#[cfg(test)]
mod fake;

pub use builtin::{BUILTIN_EXTENSIONS, BuiltinCheck, BuiltinRegistry};
pub use capability::{DirectoryLister, GlobLister, OsProcessRunner, ProcessOutput, ProcessRunner};
pub use discovery::{Discovery, DiscoveryResult, EXTENSION_PREFIX, Extension, suffix};
pub use error::{ExtensionError, Result};
pub use executor::{ExtensionExecutor, missing_extension_result};
pub use labels::{EXTENSION_LABEL, ExtensionLabelSource, KubectlLabels};
