//! CLI command structure using clap

use clap::{Args, Parser, Subcommand};
use linkerd_healthcheck::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "linkerd")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check the Linkerd CLI environment and every installed extension
    Check(CheckArgs),

    /// Run the `linkerd-<name>` executable found on PATH
    #[command(external_subcommand)]
    External(Vec<String>),
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Output format: table, json or short
    #[arg(short, long, default_value = "table")]
    pub output: OutputFormat,

    /// Seconds to keep retrying checks that have not passed yet
    #[arg(long, value_name = "SECONDS", default_value_t = 300)]
    pub wait: u64,

    /// Kubernetes context to check
    #[arg(long)]
    pub context: Option<String>,

    /// Path to the kubeconfig file
    #[arg(long, value_name = "PATH")]
    pub kubeconfig: Option<PathBuf>,

    /// Namespace Linkerd is installed in
    #[arg(short = 'L', long, default_value = "linkerd")]
    pub linkerd_namespace: String,

    /// Kill an extension that runs longer than this many seconds
    #[arg(
        long,
        value_name = "SECONDS",
        env = "LINKERD_EXTENSION_TIMEOUT",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub extension_timeout: Option<u64>,

    /// Path to check.toml
    #[arg(long, value_name = "PATH", env = "LINKERD_CHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip extension discovery and only check the CLI environment
    #[arg(long)]
    pub no_extensions: bool,
}
