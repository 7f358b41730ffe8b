//! Finding the extensions a check run should dispatch to

use crate::builtin::BUILTIN_EXTENSIONS;
use crate::capability::{DirectoryLister, ProcessRunner};
use crate::metadata;
use std::collections::HashSet;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

/// File name prefix every extension executable carries
pub const EXTENSION_PREFIX: &str = "linkerd-";

/// An extension selected to run
///
/// External extensions are executables found on `PATH`. Built-in extensions
/// point at the host binary and carry the name it dispatches on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    pub path: PathBuf,
    pub builtin: Option<String>,
}

impl Extension {
    pub fn external(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            builtin: None,
        }
    }

    pub fn builtin(host: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            path: host.into(),
            builtin: Some(name.into()),
        }
    }

    pub fn is_builtin(&self) -> bool {
        self.builtin.is_some()
    }

    /// `linkerd-<name>`, whichever way the extension is provided
    pub fn name(&self) -> String {
        match &self.builtin {
            Some(name) => format!("{EXTENSION_PREFIX}{name}"),
            None => file_name(&self.path),
        }
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Outcome of discovery
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryResult {
    /// Sorted by executable file name, then built-in name
    pub extensions: Vec<Extension>,
    /// Sorted `linkerd-<label>` names of labelled extensions nobody provides
    pub missing: Vec<String>,
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Extension name of an executable: `foo` for `.../linkerd-foo`
///
/// Empty when the file name does not start with [`EXTENSION_PREFIX`].
pub fn suffix(path: &Path) -> String {
    let name = file_name(path);
    #[cfg(windows)]
    let name = match name.strip_suffix(".exe") {
        Some(stem) => stem.to_string(),
        None => name,
    };

    name.strip_prefix(EXTENSION_PREFIX)
        .map(str::to_string)
        .unwrap_or_default()
}

/// Discovery over a pair of capabilities
///
/// # Examples
///
/// ```no_run
/// use linkerd_extension::{Discovery, GlobLister, OsProcessRunner};
///
/// let runner = OsProcessRunner::new();
/// let found = Discovery::new(&GlobLister, &runner, "/usr/local/bin/linkerd")
///     .with_disabled(["jaeger"])
///     .find_extensions("/usr/local/bin:/usr/bin", &["viz".to_string()]);
/// for extension in &found.extensions {
///     println!("{extension}");
/// }
/// ```
pub struct Discovery<'a> {
    lister: &'a dyn DirectoryLister,
    runner: &'a dyn ProcessRunner,
    host: PathBuf,
    disabled: Vec<String>,
}

impl<'a> Discovery<'a> {
    pub fn new(
        lister: &'a dyn DirectoryLister,
        runner: &'a dyn ProcessRunner,
        host: impl Into<PathBuf>,
    ) -> Self {
        Self {
            lister,
            runner,
            host: host.into(),
            disabled: Vec::new(),
        }
    }

    /// Suffixes that are neither run nor reported missing
    pub fn with_disabled<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disabled = names.into_iter().map(Into::into).collect();
        self
    }

    fn is_disabled(&self, suffix: &str) -> bool {
        self.disabled.iter().any(|d| d == suffix)
    }

    /// Every resolvable `linkerd-*` executable on `path_env`, shadowing
    /// applied
    ///
    /// Directories are searched in `PATH` order and matches within one
    /// directory in lexical order; the first executable seen for a suffix
    /// wins. An empty element inside a non-empty `PATH` means the current
    /// directory; an empty `PATH` searches nothing.
    pub fn candidates(&self, path_env: &str) -> Vec<PathBuf> {
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        if path_env.is_empty() {
            return candidates;
        }

        for dir in std::env::split_paths(OsStr::new(path_env)) {
            let dir = if dir.as_os_str().is_empty() {
                PathBuf::from(".")
            } else {
                dir
            };
            let escaped = glob::Pattern::escape(&dir.to_string_lossy());
            let pattern = Path::new(&escaped).join(format!("{EXTENSION_PREFIX}*"));

            let mut matches = match self.lister.glob(&pattern.to_string_lossy()) {
                Ok(matches) => matches,
                Err(err) => {
                    tracing::debug!(dir = %dir.display(), error = %err, "skipping PATH entry");
                    continue;
                }
            };
            matches.sort();

            for path in matches {
                let Some(resolved) = self.runner.look_path(&path) else {
                    tracing::debug!(path = %path.display(), "not executable");
                    continue;
                };

                let suffix = suffix(&resolved);
                if suffix.is_empty() || self.is_disabled(&suffix) {
                    continue;
                }
                if !seen.insert(suffix) {
                    tracing::debug!(path = %resolved.display(), "shadowed by earlier PATH entry");
                    continue;
                }

                candidates.push(resolved);
            }
        }

        candidates
    }

    /// Select the extensions to run for a cluster carrying `labels`
    ///
    /// Candidates whose metadata says `"always"` are selected outright. Every
    /// other label is served by a `PATH` candidate of the same suffix, else by
    /// a built-in, else reported missing.
    pub fn find_extensions(&self, path_env: &str, labels: &[String]) -> DiscoveryResult {
        let candidates = self.candidates(path_env);

        let mut selected: HashSet<String> = HashSet::new();
        let mut extensions = Vec::new();
        for candidate in &candidates {
            if metadata::probe_runs_always(self.runner, candidate) {
                selected.insert(suffix(candidate));
                extensions.push(Extension::external(candidate.clone()));
            }
        }

        let mut missing = Vec::new();
        for label in labels {
            if label.is_empty() || self.is_disabled(label) || !selected.insert(label.clone()) {
                continue;
            }

            if let Some(candidate) = candidates.iter().find(|c| suffix(c) == *label) {
                extensions.push(Extension::external(candidate.clone()));
            } else if BUILTIN_EXTENSIONS.contains(&label.as_str()) {
                extensions.push(Extension::builtin(self.host.clone(), label.clone()));
            } else {
                missing.push(format!("{EXTENSION_PREFIX}{label}"));
            }
        }

        extensions.sort_by(|a, b| {
            file_name(&a.path)
                .cmp(&file_name(&b.path))
                .then_with(|| a.builtin.cmp(&b.builtin))
        });
        missing.sort();

        tracing::debug!(
            extensions = extensions.len(),
            missing = missing.len(),
            "extension discovery finished"
        );

        DiscoveryResult {
            extensions,
            missing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakeLister, FakeRunner};

    const PATH1: &str = "/path1";
    const PATH2: &str = "/this/is/a/fake/path2";
    const ALL: &[&str] = &["linkerd-bar", "linkerd-baz", "linkerd-foo"];

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn two_dirs() -> FakeLister {
        FakeLister::default().dir(PATH1, ALL).dir(PATH2, ALL)
    }

    #[test]
    fn test_suffix() {
        assert_eq!(suffix(Path::new("/bin/linkerd-foo")), "foo");
        assert_eq!(suffix(Path::new("linkerd-multi-part")), "multi-part");
        assert_eq!(suffix(Path::new("/bin/kubectl")), "");
        assert_eq!(suffix(Path::new("/bin/linkerd")), "");
    }

    #[test]
    fn test_extension_names() {
        assert_eq!(Extension::external("/bin/linkerd-foo").to_string(), "linkerd-foo");
        assert_eq!(Extension::builtin("/bin/linkerd", "viz").to_string(), "linkerd-viz");
        assert!(Extension::builtin("/bin/linkerd", "viz").is_builtin());
    }

    #[test]
    fn test_round_trip_selection_and_order() {
        let lister = two_dirs();
        let runner = FakeRunner::default()
            .unresolvable("/path1/linkerd-bar")
            .always("/path1/linkerd-baz")
            .always("/this/is/a/fake/path2/linkerd-bar")
            .respond(
                "/path1/linkerd-foo",
                "_extension-metadata",
                r#"{"name":"linkerd-foo","checks":"cluster"}"#,
            );

        let found = Discovery::new(&lister, &runner, "/bin/linkerd").find_extensions(
            &format!("{PATH1}:{PATH2}"),
            &labels(&["foo", "missing-cli"]),
        );

        assert_eq!(
            found.extensions,
            vec![
                Extension::external("/this/is/a/fake/path2/linkerd-bar"),
                Extension::external("/path1/linkerd-baz"),
                Extension::external("/path1/linkerd-foo"),
            ]
        );
        assert_eq!(found.missing, vec!["linkerd-missing-cli".to_string()]);
    }

    #[test]
    fn test_first_path_entry_shadows_later_ones() {
        let lister = two_dirs();
        let runner = FakeRunner::default();
        let discovery = Discovery::new(&lister, &runner, "/bin/linkerd");

        assert_eq!(
            discovery.candidates(&format!("{PATH1}:{PATH2}")),
            vec![
                PathBuf::from("/path1/linkerd-bar"),
                PathBuf::from("/path1/linkerd-baz"),
                PathBuf::from("/path1/linkerd-foo"),
            ]
        );
        // shadowed executables are never probed
        assert!(runner.calls_to("/this/is/a/fake/path2/linkerd-bar").is_empty());
    }

    #[test]
    fn test_glob_errors_skip_the_directory() {
        let lister = FakeLister::default()
            .failing_dir(PATH1)
            .dir(PATH2, &["linkerd-foo"]);
        let runner = FakeRunner::default();

        let candidates =
            Discovery::new(&lister, &runner, "/bin/linkerd").candidates(&format!("{PATH1}:{PATH2}"));
        assert_eq!(candidates, vec![PathBuf::from(PATH2).join("linkerd-foo")]);
    }

    #[test]
    fn test_empty_path_element_means_current_dir() {
        let lister = FakeLister::default().dir(".", &["linkerd-dot"]);
        let runner = FakeRunner::default();

        let candidates = Discovery::new(&lister, &runner, "/bin/linkerd").candidates(":/nowhere");
        assert_eq!(candidates, vec![PathBuf::from("./linkerd-dot")]);
        assert_eq!(lister.patterns.borrow()[0], "./linkerd-*");
    }

    #[test]
    fn test_metadata_name_must_match() {
        let lister = FakeLister::default().dir(PATH1, &["linkerd-imposter"]);
        let runner = FakeRunner::default().respond(
            "/path1/linkerd-imposter",
            "_extension-metadata",
            r#"{"name":"linkerd-viz","checks":"always"}"#,
        );

        let found = Discovery::new(&lister, &runner, "/bin/linkerd").find_extensions(PATH1, &[]);
        assert!(found.extensions.is_empty());
        assert!(found.missing.is_empty());
    }

    #[test]
    fn test_labels_fall_back_to_builtins_then_missing() {
        let lister = FakeLister::default();
        let runner = FakeRunner::default();

        let found = Discovery::new(&lister, &runner, "/bin/linkerd")
            .find_extensions(PATH1, &labels(&["viz", "zeta", "jaeger", "alpha"]));

        assert_eq!(
            found.extensions,
            vec![
                Extension::builtin("/bin/linkerd", "jaeger"),
                Extension::builtin("/bin/linkerd", "viz"),
            ]
        );
        assert_eq!(found.missing, vec!["linkerd-alpha", "linkerd-zeta"]);
    }

    #[test]
    fn test_path_candidate_beats_builtin() {
        let lister = FakeLister::default().dir(PATH1, &["linkerd-viz"]);
        let runner = FakeRunner::default();

        let found =
            Discovery::new(&lister, &runner, "/bin/linkerd").find_extensions(PATH1, &labels(&["viz"]));
        assert_eq!(found.extensions, vec![Extension::external("/path1/linkerd-viz")]);
    }

    #[test]
    fn test_always_extension_is_not_run_twice_for_its_label() {
        let lister = FakeLister::default().dir(PATH1, &["linkerd-foo"]);
        let runner = FakeRunner::default().always("/path1/linkerd-foo");

        let found = Discovery::new(&lister, &runner, "/bin/linkerd")
            .find_extensions(PATH1, &labels(&["foo", "foo"]));
        assert_eq!(found.extensions, vec![Extension::external("/path1/linkerd-foo")]);
        assert!(found.missing.is_empty());
    }

    #[test]
    fn test_disabled_extensions_are_dropped() {
        let lister = FakeLister::default().dir(PATH1, &["linkerd-foo"]);
        let runner = FakeRunner::default().always("/path1/linkerd-foo");

        let found = Discovery::new(&lister, &runner, "/bin/linkerd")
            .with_disabled(["foo", "viz", "gone"])
            .find_extensions(PATH1, &labels(&["viz", "gone"]));
        assert!(found.extensions.is_empty());
        assert!(found.missing.is_empty());
    }

    #[test]
    fn test_empty_path_searches_nothing() {
        let lister = FakeLister::default().dir(".", &["linkerd-cwd"]);
        let runner = FakeRunner::default().always("./linkerd-cwd");

        let found = Discovery::new(&lister, &runner, "/bin/linkerd").find_extensions("", &[]);
        assert_eq!(found, DiscoveryResult::default());
        assert!(lister.patterns.borrow().is_empty());
        assert!(runner.calls_to("./linkerd-cwd").is_empty());
    }
}
