//! Settings for one `linkerd check` run

use crate::cli::CheckArgs;
use anyhow::Result;
use clap::ArgMatches;
use clap::parser::ValueSource;
use linkerd_healthcheck::CheckConfig;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Flags, config file and host binary, resolved once per run
pub struct Context {
    pub args: CheckArgs,
    pub config: CheckConfig,
    /// `--name=value` flags handed on to every extension
    pub forwarded_flags: Vec<String>,
    /// Binary that built-in extensions without an in-process handler re-run
    pub host: PathBuf,
}

impl Context {
    /// Load the config file and resolve the run settings
    ///
    /// `matches` are the `check` subcommand's matches; only flags set on the
    /// command line are forwarded to extensions.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit config file is missing, or if any config
    /// file cannot be read, parsed or validated.
    pub fn new(args: CheckArgs, matches: Option<&ArgMatches>) -> Result<Self> {
        let config = CheckConfig::load(args.config.as_deref())?;
        let forwarded_flags = matches
            .map(|matches| forwarded_flags(&args, matches))
            .unwrap_or_default();

        tracing::debug!(?forwarded_flags, ?config, "check context");

        Ok(Self {
            args,
            config,
            forwarded_flags,
            host: host_binary(),
        })
    }

    /// Flag, then `LINKERD_EXTENSION_TIMEOUT`, then the config file
    pub fn extension_timeout(&self) -> Option<Duration> {
        self.args
            .extension_timeout
            .map(Duration::from_secs)
            .or_else(|| self.config.extensions.timeout())
    }

    pub fn wait(&self) -> Duration {
        Duration::from_secs(self.args.wait)
    }

    pub fn hint_base_url(&self) -> &str {
        &self.config.hints.base_url
    }
}

fn forwarded_flags(args: &CheckArgs, matches: &ArgMatches) -> Vec<String> {
    let explicit = |id: &str| matches.value_source(id) == Some(ValueSource::CommandLine);
    let mut flags = Vec::new();

    if explicit("wait") {
        flags.push(format!("--wait={}s", args.wait));
    }
    if let Some(context) = args.context.as_ref().filter(|_| explicit("context")) {
        flags.push(format!("--context={context}"));
    }
    if let Some(kubeconfig) = args.kubeconfig.as_ref().filter(|_| explicit("kubeconfig")) {
        flags.push(format!("--kubeconfig={}", kubeconfig.display()));
    }
    if explicit("linkerd_namespace") {
        flags.push(format!("--linkerd-namespace={}", args.linkerd_namespace));
    }

    flags
}

fn host_binary() -> PathBuf {
    env::current_exe()
        .ok()
        .or_else(|| env::args_os().next().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("linkerd"))
}
