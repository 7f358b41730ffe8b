//! The fake executables behave like the real tools they stand in for
#![cfg(unix)]

use assert_cmd::assert::OutputAssertExt;
use linkerd_testkit::{FakeExtension, temp_dir_in_workspace, write_fake_kubectl};
use std::process::Command;

#[test]
fn test_fake_extension_answers_metadata() {
    let bin = temp_dir_in_workspace();
    let path = FakeExtension::new("linkerd-foo").install(bin.path());

    let output = Command::new(&path).arg("_extension-metadata").output().unwrap();
    assert!(output.status.success());

    let metadata: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(metadata["name"], "linkerd-foo");
    assert_eq!(metadata["checks"], "always");

    // metadata probes are not recorded
    assert!(!bin.path().join("linkerd-foo.args").exists());
}

#[test]
fn test_fake_extension_without_metadata_fails() {
    let bin = temp_dir_in_workspace();
    let path = FakeExtension::new("linkerd-old")
        .without_metadata()
        .install(bin.path());

    Command::new(&path)
        .arg("_extension-metadata")
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_fake_extension_check_output_and_args() {
    let bin = temp_dir_in_workspace();
    let path = FakeExtension::new("linkerd-foo")
        .check_output("not json")
        .stderr("boom")
        .exit_code(4)
        .install(bin.path());

    let output = Command::new(&path)
        .args(["check", "--wait=0s", "--output=json"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(4));
    assert_eq!(output.stdout, b"not json");
    assert_eq!(output.stderr, b"boom");

    let recorded = std::fs::read_to_string(bin.path().join("linkerd-foo.args")).unwrap();
    assert_eq!(recorded, "check --wait=0s --output=json\n");
}

#[test]
fn test_fake_extension_quotes_single_quotes() {
    let bin = temp_dir_in_workspace();
    let path = FakeExtension::new("linkerd-foo")
        .check_output("it's fine")
        .install(bin.path());

    let output = Command::new(&path).arg("check").output().unwrap();
    assert_eq!(output.stdout, b"it's fine");
}

#[test]
fn test_fake_kubectl_lists_labelled_namespaces() {
    let bin = temp_dir_in_workspace();
    let path = write_fake_kubectl(bin.path(), &["viz", "foo"]);

    let output = Command::new(&path)
        .args(["get", "namespaces", "-l", "linkerd.io/extension", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let list: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let labels: Vec<&str> = list["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|ns| ns["metadata"]["labels"]["linkerd.io/extension"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["viz", "foo"]);

    let recorded = std::fs::read_to_string(bin.path().join("kubectl.args")).unwrap();
    assert_eq!(recorded.trim(), "get namespaces -l linkerd.io/extension -o json");
}
