//! OS seams used by discovery and dispatch
//!
//! Discovery only ever touches the filesystem through [`DirectoryLister`] and
//! only ever starts processes through [`ProcessRunner`]. The `Os*`/`Glob*`
//! types are the production implementations.

use crate::error::{ExtensionError, Result};
use std::borrow::Cow;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Lists the paths matching a glob pattern
pub trait DirectoryLister {
    fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>>;
}

/// Resolves and runs executables
pub trait ProcessRunner {
    /// Resolve `file` to an executable path, `None` when it is not runnable
    fn look_path(&self, file: &Path) -> Option<PathBuf>;

    /// Run `program` with `args` to completion and capture its output
    fn run(&self, program: &Path, args: &[String]) -> Result<ProcessOutput>;
}

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub success: bool,
    /// `None` when the process was terminated by a signal
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    pub fn stdout_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    pub fn stderr_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }

    pub fn status_description(&self) -> String {
        match self.code {
            Some(code) => format!("exit status {code}"),
            None => "signal".to_string(),
        }
    }
}

/// Render `program args...` the way it is shown in check output
pub fn command_line(program: &Path, args: &[String]) -> String {
    let mut line = program.display().to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

/// [`DirectoryLister`] backed by the `glob` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobLister;

impl DirectoryLister for GlobLister {
    fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let paths = glob::glob(pattern).map_err(|e| ExtensionError::Glob {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        // Unreadable entries are skipped, matching a plain directory listing
        Ok(paths.filter_map(|entry| entry.ok()).collect())
    }
}

/// [`ProcessRunner`] that starts real processes
///
/// Standard input is closed. With a timeout set, a process still running when
/// it expires is killed and [`ExtensionError::TimedOut`] is returned.
#[derive(Debug, Clone, Default)]
pub struct OsProcessRunner {
    timeout: Option<Duration>,
}

impl OsProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn run_with_deadline(
        &self,
        program: &Path,
        args: &[String],
        timeout: Duration,
    ) -> Result<ProcessOutput> {
        let command = command_line(program, args);

        // Files instead of pipes: a chatty child cannot block on a full pipe
        // while we poll it
        let mut stdout_file = tempfile::tempfile()?;
        let mut stderr_file = tempfile::tempfile()?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout_file.try_clone()?))
            .stderr(Stdio::from(stderr_file.try_clone()?))
            .spawn()
            .map_err(|source| ExtensionError::Spawn {
                program: program.to_path_buf(),
                source,
            })?;

        let started = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if started.elapsed() > timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        tracing::warn!(%command, ?timeout, "extension killed after timeout");
                        return Err(ExtensionError::TimedOut {
                            command,
                            seconds: timeout.as_secs(),
                        });
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(source) => return Err(ExtensionError::Wait { command, source }),
            }
        };

        Ok(ProcessOutput {
            success: status.success(),
            code: status.code(),
            stdout: read_capture(&mut stdout_file)?,
            stderr: read_capture(&mut stderr_file)?,
        })
    }
}

fn read_capture(file: &mut File) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    file.seek(SeekFrom::Start(0))?;
    file.read_to_end(&mut buf)?;
    Ok(buf)
}

impl ProcessRunner for OsProcessRunner {
    fn look_path(&self, file: &Path) -> Option<PathBuf> {
        which::which(file).ok()
    }

    fn run(&self, program: &Path, args: &[String]) -> Result<ProcessOutput> {
        tracing::debug!(command = %command_line(program, args), "running");

        if let Some(timeout) = self.timeout {
            return self.run_with_deadline(program, args, timeout);
        }

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ExtensionError::Spawn {
                program: program.to_path_buf(),
                source,
            })?;

        Ok(ProcessOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
