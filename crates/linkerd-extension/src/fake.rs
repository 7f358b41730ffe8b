//! Scripted in-memory capabilities for unit tests

use crate::capability::{DirectoryLister, ProcessOutput, ProcessRunner};
use crate::error::{ExtensionError, Result};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// Serves a fixed listing per directory
#[derive(Default)]
pub struct FakeLister {
    dirs: BTreeMap<PathBuf, Vec<String>>,
    failing: HashSet<PathBuf>,
    pub patterns: RefCell<Vec<String>>,
}

impl FakeLister {
    pub fn dir(mut self, dir: &str, names: &[&str]) -> Self {
        self.dirs.insert(
            PathBuf::from(dir),
            names.iter().map(|n| n.to_string()).collect(),
        );
        self
    }

    pub fn failing_dir(mut self, dir: &str) -> Self {
        self.failing.insert(PathBuf::from(dir));
        self
    }
}

impl DirectoryLister for FakeLister {
    fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        self.patterns.borrow_mut().push(pattern.to_string());

        let pattern = Path::new(pattern);
        let dir = pattern.parent().unwrap_or(Path::new("")).to_path_buf();
        let prefix = pattern
            .file_name()
            .map(|n| n.to_string_lossy().trim_end_matches('*').to_string())
            .unwrap_or_default();

        if self.failing.contains(&dir) {
            return Err(ExtensionError::Glob {
                pattern: pattern.display().to_string(),
                reason: "permission denied".to_string(),
            });
        }

        Ok(self
            .dirs
            .get(&dir)
            .into_iter()
            .flatten()
            .filter(|name| name.starts_with(&prefix))
            .map(|name| dir.join(name))
            .collect())
    }
}

/// Answers from a table of `(program, first arg)` responses
#[derive(Default)]
pub struct FakeRunner {
    unresolvable: HashSet<PathBuf>,
    responses: BTreeMap<(PathBuf, String), std::result::Result<ProcessOutput, String>>,
    pub calls: RefCell<Vec<(PathBuf, Vec<String>)>>,
}

impl FakeRunner {
    pub fn unresolvable(mut self, path: &str) -> Self {
        self.unresolvable.insert(PathBuf::from(path));
        self
    }

    pub fn respond(mut self, path: &str, first_arg: &str, stdout: &str) -> Self {
        self.responses.insert(
            (PathBuf::from(path), first_arg.to_string()),
            Ok(ProcessOutput {
                success: true,
                code: Some(0),
                stdout: stdout.as_bytes().to_vec(),
                stderr: Vec::new(),
            }),
        );
        self
    }

    pub fn respond_output(mut self, path: &str, first_arg: &str, output: ProcessOutput) -> Self {
        self.responses
            .insert((PathBuf::from(path), first_arg.to_string()), Ok(output));
        self
    }

    /// Every run of `path` with `first_arg` times out
    pub fn time_out(mut self, path: &str, first_arg: &str) -> Self {
        self.responses.insert(
            (PathBuf::from(path), first_arg.to_string()),
            Err(path.to_string()),
        );
        self
    }

    /// Run `path` with `first_arg` as an "always" extension named after its basename
    pub fn always(self, path: &str) -> Self {
        let name = Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let metadata = format!(r#"{{"name":"{name}","checks":"always"}}"#);
        self.respond(path, "_extension-metadata", &metadata)
    }

    pub fn calls_to(&self, path: &str) -> Vec<Vec<String>> {
        self.calls
            .borrow()
            .iter()
            .filter(|(p, _)| p == Path::new(path))
            .map(|(_, args)| args.clone())
            .collect()
    }
}

impl ProcessRunner for FakeRunner {
    fn look_path(&self, file: &Path) -> Option<PathBuf> {
        if self.unresolvable.contains(file) {
            None
        } else {
            Some(file.to_path_buf())
        }
    }

    fn run(&self, program: &Path, args: &[String]) -> Result<ProcessOutput> {
        self.calls
            .borrow_mut()
            .push((program.to_path_buf(), args.to_vec()));

        let first = args.first().cloned().unwrap_or_default();
        match self.responses.get(&(program.to_path_buf(), first)) {
            Some(Ok(output)) => Ok(output.clone()),
            Some(Err(command)) => Err(ExtensionError::TimedOut {
                command: command.clone(),
                seconds: 5,
            }),
            None => Ok(ProcessOutput {
                success: false,
                code: Some(1),
                stdout: Vec::new(),
                stderr: b"unknown command".to_vec(),
            }),
        }
    }
}
