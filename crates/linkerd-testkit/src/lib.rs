//! Test utilities for the linkerd check workspace
//!
//! This crate provides shared testing utilities used across the workspace:
//! workspace-local temp dirs, environment isolation, and fake extension /
//! `kubectl` executables for driving the real discovery and dispatch code.

pub mod env;
pub mod fixtures;

pub use env::{ENV_LOCK, with_env_vars};
pub use fixtures::{FakeExtension, check_output_json, write_executable, write_fake_kubectl};

use tempfile::TempDir;

/// Scratch directory under `.tmp/` in the current directory
///
/// Fake extensions are installed here and put on `PATH`, so a failed run can
/// be inspected before cargo's target dir is cleaned. Removed on drop.
///
/// # Panics
///
/// Panics if `.tmp/` or the directory inside it cannot be created.
///
/// # Examples
///
/// ```rust
/// use linkerd_testkit::{FakeExtension, temp_dir_in_workspace};
///
/// let bin = temp_dir_in_workspace();
/// let path = FakeExtension::new("linkerd-foo").install(bin.path());
/// assert!(path.starts_with(bin.path()));
/// ```
pub fn temp_dir_in_workspace() -> TempDir {
    match try_temp_dir_in_workspace() {
        Ok(dir) => dir,
        Err(err) => panic!("cannot create scratch dir under .tmp/: {err}"),
    }
}

/// Fallible form of [`temp_dir_in_workspace`]
pub fn try_temp_dir_in_workspace() -> std::io::Result<TempDir> {
    let base = std::env::current_dir()?.join(".tmp");
    std::fs::create_dir_all(&base)?;
    tempfile::Builder::new().prefix("l5d-").tempdir_in(base)
}
