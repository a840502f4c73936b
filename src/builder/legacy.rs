//! The legacy build phase.
//!
//! Some products do not build themselves: a monolithic external script
//! builds, tests and installs all of them in one invocation per target.
//! The orchestrator only decides what to ask it for.

use std::path::PathBuf;

use serde::Serialize;

use crate::builder::context::BuildContext;
use crate::core::error::BuildError;
use crate::core::target::BuildTarget;
use crate::util::fs::resolve_against;
use crate::util::process::ProcessBuilder;

/// What the legacy phase should do for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegacyRequest {
    pub product: String,
    pub build: bool,
    pub test: bool,
    pub install: bool,
}

impl LegacyRequest {
    /// Whether any phase was requested.
    pub fn is_active(&self) -> bool {
        self.build || self.test || self.install
    }
}

/// Performs the legacy phase for a block of products.
pub trait LegacyPhase {
    fn run(
        &self,
        ctx: &BuildContext,
        target: &BuildTarget,
        requests: &[LegacyRequest],
    ) -> Result<(), BuildError>;
}

/// Runs the configured `[legacy] script`.
///
/// The script receives the target, variant and directories, plus
/// `--skip-<phase>-<product>` for every phase a product does not want.
#[derive(Debug, Clone, Default)]
pub struct ScriptLegacyPhase {
    script: Option<PathBuf>,
    args: Vec<String>,
}

impl ScriptLegacyPhase {
    pub fn new(script: Option<PathBuf>, args: Vec<String>) -> Self {
        ScriptLegacyPhase { script, args }
    }

    /// Take the script from `[legacy]`, resolving it against the source root.
    pub fn from_context(ctx: &BuildContext) -> Self {
        let script = ctx
            .config
            .legacy
            .script
            .as_deref()
            .map(|p| resolve_against(&ctx.source_root, p));
        ScriptLegacyPhase::new(script, ctx.config.legacy.args.clone())
    }

    /// The command the phase would run.
    pub fn command(
        &self,
        ctx: &BuildContext,
        target: &BuildTarget,
        requests: &[LegacyRequest],
    ) -> Result<ProcessBuilder, BuildError> {
        let script = self.script.as_ref().ok_or_else(|| {
            BuildError::tool_not_found(
                "legacy build script",
                "Set `script` under `[legacy]` in drydock.toml",
            )
        })?;

        let mut cmd = ProcessBuilder::new(script)
            .arg("--host-target")
            .arg(target.to_string())
            .arg("--build-variant")
            .arg(ctx.variant.as_str())
            .arg("--build-dir")
            .arg(ctx.build_root.join(format!("legacy-{}", target)))
            .arg("--install-destdir")
            .arg(ctx.host_install_destdir(target))
            .arg("--install-prefix")
            .arg(&ctx.install_prefix);

        if let Some(jobs) = ctx.jobs {
            cmd = cmd.arg("--jobs").arg(jobs.to_string());
        }

        for request in requests {
            let skipped = [
                ("build", request.build),
                ("test", request.test),
                ("install", request.install),
            ];
            for (phase, wanted) in skipped {
                if !wanted {
                    cmd = cmd.arg(format!("--skip-{}-{}", phase, request.product));
                }
            }
        }

        Ok(cmd.args(&self.args).cwd(&ctx.source_root))
    }
}

impl LegacyPhase for ScriptLegacyPhase {
    fn run(
        &self,
        ctx: &BuildContext,
        target: &BuildTarget,
        requests: &[LegacyRequest],
    ) -> Result<(), BuildError> {
        let cmd = self.command(ctx, target, requests)?;
        tracing::info!("Running legacy phase for {}", target);
        cmd.exec_and_check()?;
        Ok(())
    }
}
