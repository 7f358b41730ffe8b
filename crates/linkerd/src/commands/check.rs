//! Check command - CLI environment and extension health checks

use crate::cli::CheckArgs;
use crate::context::Context;
use anyhow::{Result, bail};
use clap::ArgMatches;
use linkerd_extension::{
    BuiltinRegistry, Discovery, ExtensionExecutor, ExtensionLabelSource, GlobLister,
    KubectlLabels, OsProcessRunner, ProcessRunner,
};
use linkerd_healthcheck::{Category, Checker, HealthChecker, RenderOptions, Renderer};
use std::cell::RefCell;
use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Category of the checks the host runs itself
pub const CLI_CATEGORY: &str = "linkerd-cli";

/// Title printed above all extension results
pub const EXTENSIONS_SECTION: &str = "Linkerd extensions checks";

/// Run `linkerd check`
///
/// # Returns
///
/// The process exit code: 0 when no check failed (warnings allowed), 1
/// otherwise.
pub fn run(args: CheckArgs, matches: Option<&ArgMatches>) -> Result<i32> {
    let ctx = Context::new(args, matches)?;
    let runner = OsProcessRunner::new().with_timeout(ctx.extension_timeout());
    let mut renderer = Renderer::new(ctx.args.output, io::stdout(), RenderOptions::detect());

    let labels = RefCell::new(Vec::new());
    {
        let kubectl = RefCell::new(None);
        let mut checker = HealthChecker::new().with_hint_base_url(ctx.hint_base_url());
        checker.add_category(cli_category(&ctx, &runner, &kubectl, &labels));
        checker.run_checks(&mut renderer);
    }

    if !ctx.args.no_extensions {
        let path_env = env::var("PATH").unwrap_or_default();
        let found = Discovery::new(&GlobLister, &runner, ctx.host.clone())
            .with_disabled(ctx.config.extensions.disabled.iter().cloned())
            .find_extensions(&path_env, &labels.borrow());

        if !found.extensions.is_empty() || !found.missing.is_empty() {
            renderer.section(EXTENSIONS_SECTION);

            let builtins = BuiltinRegistry::new();
            let executor = ExtensionExecutor::new(&runner, &builtins, ctx.forwarded_flags.clone());
            executor.run_all(&found.extensions, &found.missing, &mut renderer);
        }
    }

    let verdict = renderer.finish()?;
    Ok(if verdict.success { 0 } else { 1 })
}

/// Checks of the environment extensions are discovered and run in
///
/// Reading the namespace labels stores them in `labels` for discovery.
fn cli_category<'a>(
    ctx: &'a Context,
    runner: &'a dyn ProcessRunner,
    kubectl: &'a RefCell<Option<PathBuf>>,
    labels: &'a RefCell<Vec<String>>,
) -> Category<'a> {
    let mut checkers = vec![
        Checker::new("kubectl is available on the PATH", move || {
            match runner.look_path(Path::new("kubectl")) {
                Some(path) => {
                    *kubectl.borrow_mut() = Some(path);
                    Ok(())
                }
                None => bail!("could not find kubectl on the PATH"),
            }
        })
        .with_hint_anchor("l5d-kubectl")
        .fatal(),
    ];

    if !ctx.args.no_extensions {
        checkers.push(
            Checker::new("can read extension namespace labels", move || {
                let Some(path) = kubectl.borrow().clone() else {
                    bail!("kubectl is not available");
                };
                let found = KubectlLabels::new(runner, path)
                    .with_context(ctx.args.context.clone())
                    .with_kubeconfig(ctx.args.kubeconfig.clone())
                    .extension_labels()?;

                tracing::debug!(labels = ?found, "extension namespace labels");
                *labels.borrow_mut() = found;
                Ok(())
            })
            .with_hint_anchor("l5d-extension-labels")
            .with_retry_deadline(Instant::now() + ctx.wait()),
        );

        checkers.push(
            Checker::new("extension search path is set", || {
                if env::var_os("PATH").is_none_or(|path| path.is_empty()) {
                    bail!("PATH is empty; no linkerd-* extensions can be found");
                }
                Ok(())
            })
            .with_hint_anchor("l5d-path")
            .warning(),
        );
    }

    Category::new(CLI_CATEGORY, checkers)
}
