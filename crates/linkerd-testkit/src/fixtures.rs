//! Fake executables for driving the real discovery and dispatch code
//!
//! Every fake is a POSIX shell script that only uses shell builtins, so it
//! keeps working when a test points `PATH` at nothing but its own temp dir.

use std::path::{Path, PathBuf};

/// Quote `s` for a single-quoted shell word
fn sh_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Write `content` to `path` and mark it executable
///
/// # Panics
///
/// Panics if the file cannot be written or its permissions cannot be set.
pub fn write_executable(path: &Path, content: &str) -> PathBuf {
    std::fs::write(path, content)
        .unwrap_or_else(|e| panic!("Failed to write {}: {}", path.display(), e));

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(path)
            .expect("Failed to get metadata")
            .permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(path, perms).expect("Failed to set permissions");
    }

    path.to_path_buf()
}

/// One-category, one-check `CheckOutput` document
pub fn check_output_json(
    category: &str,
    description: &str,
    result: &str,
    error: Option<&str>,
    hint: Option<&str>,
) -> String {
    let mut check = serde_json::json!({
        "description": description,
        "result": result,
    });
    if let Some(error) = error {
        check["error"] = error.into();
    }
    if let Some(hint) = hint {
        check["hint"] = hint.into();
    }

    serde_json::json!({
        "success": result != "error",
        "categories": [{"categoryName": category, "checks": [check]}],
    })
    .to_string()
}

/// Builder for a fake `linkerd-*` extension executable
///
/// The installed script answers `_extension-metadata` with its metadata, and
/// answers anything else with the configured check output. The arguments of
/// the last non-metadata invocation are written to `<name>.args` next to the
/// script.
///
/// # Examples
///
/// ```no_run
/// use linkerd_testkit::{FakeExtension, check_output_json, temp_dir_in_workspace};
///
/// let bin = temp_dir_in_workspace();
/// FakeExtension::new("linkerd-foo")
///     .check_output(&check_output_json("linkerd-foo", "foo works", "success", None, None))
///     .install(bin.path());
/// ```
#[derive(Debug, Clone)]
pub struct FakeExtension {
    name: String,
    metadata: Option<String>,
    stdout: String,
    stderr: String,
    exit_code: i32,
    hang: bool,
}

impl FakeExtension {
    /// An "always" extension whose metadata name matches `name`
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            metadata: Some(format!(r#"{{"name":"{name}","checks":"always"}}"#)),
            stdout: check_output_json(name, format!("{name} works").as_str(), "success", None, None),
            stderr: String::new(),
            exit_code: 0,
            hang: false,
        }
    }

    /// Replace the metadata document
    pub fn metadata_json(mut self, json: &str) -> Self {
        self.metadata = Some(json.to_string());
        self
    }

    /// Metadata name matches but checks only run when installed on the cluster
    pub fn on_cluster(self) -> Self {
        let json = format!(r#"{{"name":"{}","checks":"cluster"}}"#, self.name);
        self.metadata_json(&json)
    }

    /// The metadata subcommand fails with exit code 1
    pub fn without_metadata(mut self) -> Self {
        self.metadata = None;
        self
    }

    pub fn check_output(mut self, stdout: &str) -> Self {
        self.stdout = stdout.to_string();
        self
    }

    pub fn stderr(mut self, stderr: &str) -> Self {
        self.stderr = stderr.to_string();
        self
    }

    pub fn exit_code(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }

    /// `check` never returns
    pub fn hang(mut self) -> Self {
        self.hang = true;
        self
    }

    /// Write the script into `dir` and return its path
    pub fn install(&self, dir: &Path) -> PathBuf {
        let path = dir.join(&self.name);
        let args_file = dir.join(format!("{}.args", self.name));

        let metadata = match &self.metadata {
            Some(json) => format!("printf '%s\\n' {}\n    exit 0", sh_quote(json)),
            None => "echo 'unknown command: _extension-metadata' >&2\n    exit 1".to_string(),
        };
        let body = if self.hang {
            "while :; do :; done".to_string()
        } else {
            format!(
                "printf '%s' {}\nprintf '%s' {} >&2\nexit {}",
                sh_quote(&self.stdout),
                sh_quote(&self.stderr),
                self.exit_code
            )
        };

        let script = format!(
            "#!/bin/sh\ncase \"$1\" in\n  _extension-metadata)\n    {metadata}\n    ;;\nesac\nprintf '%s\\n' \"$*\" > {args}\n{body}\n",
            args = sh_quote(&args_file.to_string_lossy()),
        );

        write_executable(&path, &script)
    }
}

/// Write a fake `kubectl` that lists namespaces carrying the given
/// `linkerd.io/extension` labels
pub fn write_fake_kubectl(dir: &Path, labels: &[&str]) -> PathBuf {
    let items: Vec<serde_json::Value> = labels
        .iter()
        .map(|label| {
            serde_json::json!({
                "metadata": {
                    "name": format!("linkerd-{label}"),
                    "labels": {"linkerd.io/extension": label},
                }
            })
        })
        .collect();
    let document = serde_json::json!({"apiVersion": "v1", "kind": "List", "items": items});

    let args_file = dir.join("kubectl.args");
    let script = format!(
        "#!/bin/sh\nprintf '%s\\n' \"$*\" > {}\nprintf '%s\\n' {}\n",
        sh_quote(&args_file.to_string_lossy()),
        sh_quote(&document.to_string()),
    );

    write_executable(&dir.join("kubectl"), &script)
}
