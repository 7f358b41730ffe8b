//! Discovery and dispatch against real executables
#![cfg(unix)]

use linkerd_extension::{
    BuiltinRegistry, Discovery, Extension, ExtensionExecutor, GlobLister, OsProcessRunner,
};
use linkerd_healthcheck::{CheckError, CheckResult};
use linkerd_testkit::{FakeExtension, check_output_json, temp_dir_in_workspace, write_executable};
use std::time::{Duration, Instant};

#[test]
fn test_discovers_and_runs_installed_extensions() {
    let bin = temp_dir_in_workspace();
    FakeExtension::new("linkerd-always").install(bin.path());
    FakeExtension::new("linkerd-labelled").on_cluster().install(bin.path());
    FakeExtension::new("linkerd-unlabelled").on_cluster().install(bin.path());
    write_executable(&bin.path().join("linkerd-"), "#!/bin/sh\nexit 0\n");

    let lister = GlobLister;
    let runner = OsProcessRunner::new();
    let path_env = bin.path().to_string_lossy().to_string();

    let found = Discovery::new(&lister, &runner, "/bin/linkerd")
        .find_extensions(&path_env, &["labelled".to_string(), "nobody".to_string()]);

    assert_eq!(
        found.extensions,
        vec![
            Extension::external(bin.path().join("linkerd-always")),
            Extension::external(bin.path().join("linkerd-labelled")),
        ]
    );
    assert_eq!(found.missing, vec!["linkerd-nobody"]);

    let builtins = BuiltinRegistry::new();
    let executor = ExtensionExecutor::new(&runner, &builtins, vec!["--wait=0s".to_string()]);
    let results = executor.run(&found.extensions[0]);
    assert_eq!(
        results,
        vec![CheckResult::success("linkerd-always", "linkerd-always works")]
    );

    let recorded = std::fs::read_to_string(bin.path().join("linkerd-always.args")).unwrap();
    assert_eq!(recorded.trim(), "check --wait=0s --output=json");
}

#[test]
fn test_non_executable_files_are_ignored() {
    let bin = temp_dir_in_workspace();
    std::fs::write(bin.path().join("linkerd-readme"), "not a program").unwrap();

    let runner = OsProcessRunner::new();
    let candidates =
        Discovery::new(&GlobLister, &runner, "/bin/linkerd").candidates(&bin.path().to_string_lossy());
    assert!(candidates.is_empty());
}

#[test]
fn test_stderr_of_crashing_extension_is_reported() {
    let bin = temp_dir_in_workspace();
    let path = FakeExtension::new("linkerd-crash")
        .check_output("")
        .stderr("panic: runtime error\n")
        .exit_code(2)
        .install(bin.path());

    let runner = OsProcessRunner::new();
    let builtins = BuiltinRegistry::new();
    let results = ExtensionExecutor::new(&runner, &builtins, Vec::new()).run(&Extension::external(&path));

    assert_eq!(results.len(), 1);
    assert_eq!(
        results[0].err,
        Some(CheckError::Stderr("panic: runtime error\n".to_string()))
    );
}

#[test]
fn test_extension_failure_results_pass_through() {
    let bin = temp_dir_in_workspace();
    let doc = check_output_json("linkerd-sad", "sad is happy", "error", Some("it is not"), None);
    let path = FakeExtension::new("linkerd-sad")
        .check_output(&doc)
        .exit_code(1)
        .install(bin.path());

    let runner = OsProcessRunner::new();
    let builtins = BuiltinRegistry::new();
    let results = ExtensionExecutor::new(&runner, &builtins, Vec::new()).run(&Extension::external(&path));

    assert_eq!(results[0].err, Some(CheckError::msg("it is not")));
    assert!(results[0].is_failure());
}

#[test]
fn test_hanging_extension_is_killed() {
    let bin = temp_dir_in_workspace();
    let path = FakeExtension::new("linkerd-hang").hang().install(bin.path());

    let runner = OsProcessRunner::new().with_timeout(Some(Duration::from_secs(1)));
    let builtins = BuiltinRegistry::new();
    let started = Instant::now();
    let results = ExtensionExecutor::new(&runner, &builtins, Vec::new()).run(&Extension::external(&path));

    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(matches!(
        results[0].err,
        Some(CheckError::TimedOut { seconds: 1, .. })
    ));
}
