mod cli;
mod commands;
mod context;

use clap::{CommandFactory, FromArgMatches};
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

/// Crate filters raised by `--verbose`
const VERBOSE_FILTER: &str = "warn,linkerd=debug,linkerd_extension=debug,linkerd_healthcheck=debug";

fn init_tracing(verbose: bool) {
    // RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { VERBOSE_FILTER } else { "warn" }));

    // Logs go to stderr; stdout carries the report
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Check(args) => {
            commands::check::run(args, matches.subcommand_matches("check"))
        }
        Commands::External(args) => commands::plugin::run(args),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
