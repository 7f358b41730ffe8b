//! Extensions compiled into the host binary
//!
//! A namespace label naming a built-in extension is served by the host even
//! when no `linkerd-<name>` executable is on `PATH`. Built-ins with a handler
//! in the [`BuiltinRegistry`] run in-process; the rest are dispatched by
//! re-executing the host binary as `<host> <name> check ...`.

use linkerd_healthcheck::CheckResult;
use std::collections::BTreeMap;

/// Extensions the host binary knows how to check itself
pub const BUILTIN_EXTENSIONS: &[&str] = &["jaeger", "multicluster", "viz"];

/// In-process check suite of a built-in extension
pub trait BuiltinCheck: Send + Sync {
    /// Run every check; `flags` are the forwarded `--name=value` flags
    fn run(&self, flags: &[String]) -> Vec<CheckResult>;
}

impl<F> BuiltinCheck for F
where
    F: Fn(&[String]) -> Vec<CheckResult> + Send + Sync,
{
    fn run(&self, flags: &[String]) -> Vec<CheckResult> {
        self(flags)
    }
}

/// Handlers for built-in extensions, by extension name
#[derive(Default)]
pub struct BuiltinRegistry {
    handlers: BTreeMap<String, Box<dyn BuiltinCheck>>,
}

impl BuiltinRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, name: impl Into<String>, handler: impl BuiltinCheck + 'static) -> Self {
        self.handlers.insert(name.into(), Box::new(handler));
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn BuiltinCheck> {
        self.handlers.get(name).map(|handler| handler.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for BuiltinRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}
