//! Command implementations

pub mod build;
pub mod completions;
pub mod plan;
pub mod products;

use std::path::PathBuf;

use anyhow::{anyhow, Result};

use drydock::core::error::ConfigurationError;
use drydock::core::target::BuildTarget;
use drydock::util::config::Config;
use drydock::util::diagnostic::{self, suggestions, Diagnostic};
use drydock::{BuildContext, GlobalContext};

/// Flags shared by every subcommand.
pub struct GlobalArgs {
    pub verbose: bool,
    pub color: bool,
    pub config: Option<PathBuf>,
}

/// Load configuration, let `configure` apply command-line overrides, and
/// build the context.
pub fn load_context(
    global: &GlobalArgs,
    configure: impl FnOnce(&mut Config),
) -> Result<BuildContext> {
    let mut gctx = GlobalContext::new()?;
    gctx.set_verbose(global.verbose);
    gctx.set_color(global.color);

    let (mut config, root, project) = gctx.load_config(global.config.as_deref())?;
    match &project {
        Some(path) => tracing::debug!("using {}", path.display()),
        None => diagnostic::emit(
            &Diagnostic::warning(format!(
                "no drydock.toml found in {} or any parent directory",
                gctx.cwd().display()
            ))
            .with_suggestion(suggestions::NO_CONFIG),
            gctx.color(),
        ),
    }

    configure(&mut config);

    BuildContext::from_config(config, &root).map_err(|err| report(err, global.color))
}

/// Parse `--target` values; empty means the context's default targets.
pub fn parse_targets(
    ctx: &BuildContext,
    targets: &[String],
    color: bool,
) -> Result<Vec<BuildTarget>> {
    if targets.is_empty() {
        return Ok(ctx.default_targets());
    }
    targets
        .iter()
        .map(|t| BuildTarget::parse(t).map_err(|err| report(err, color)))
        .collect()
}

/// Print a configuration error as a diagnostic and return a short error.
pub fn report(err: ConfigurationError, color: bool) -> anyhow::Error {
    diagnostic::emit(&err.to_diagnostic(), color);
    anyhow!("invalid build configuration")
}
