//! `drydock build` command

use anyhow::{anyhow, bail, Result};

use crate::cli::BuildArgs;
use crate::commands::{load_context, parse_targets, report, GlobalArgs};
use drydock::builder::{ConsoleSink, MessageFormat, ScriptLegacyPhase};
use drydock::ops::{build, preview, BuildOptions, PlannedStep};
use drydock::util::diagnostic;
use drydock::{ExecutionPlan, ProductRegistry};

pub fn execute(global: &GlobalArgs, args: BuildArgs) -> Result<()> {
    let format: MessageFormat = args.message_format.parse().map_err(|e: String| anyhow!(e))?;
    let registry = ProductRegistry::builtin();

    // Reject typos before touching any configuration
    for name in &args.product {
        registry.require(name).map_err(|err| report(err, global.color))?;
    }

    let ctx = load_context(global, |config| {
        if let Some(variant) = &args.variant {
            config.build.variant = Some(variant.clone());
        }
        for name in &args.product {
            config.enable_product(name);
        }
        if args.test {
            config.build.test = true;
        }
        if args.install {
            config.build.install_all = true;
        }
        if args.jobs.is_some() {
            config.build.jobs = args.jobs;
        }
    })?;
    let targets = parse_targets(&ctx, &args.target, global.color)?;

    if args.dry_run {
        let plan = ExecutionPlan::build(&registry).map_err(|err| report(err, global.color))?;
        let steps = preview(&registry, &plan, &ctx, &targets)
            .map_err(|err| report(err, global.color))?;
        return print_preview(&steps, format);
    }

    let legacy = ScriptLegacyPhase::from_context(&ctx);
    let sink = ConsoleSink::new(format, global.verbose);
    let options = BuildOptions { targets };

    match build(&registry, &ctx, &options, &legacy, &sink) {
        Ok(report) => {
            tracing::debug!("{} phase(s) run", report.phases_run);
            Ok(())
        }
        Err(err) => {
            diagnostic::emit(&err.to_diagnostic(), global.color);
            bail!("build failed")
        }
    }
}

fn print_preview(steps: &[PlannedStep], format: MessageFormat) -> Result<()> {
    match format {
        MessageFormat::Json => println!("{}", serde_json::to_string_pretty(steps)?),
        MessageFormat::Human => {
            let mut any = false;
            for step in steps.iter().filter(|s| s.run) {
                any = true;
                let via = if step.legacy { " via the legacy phase" } else { "" };
                println!(
                    "{:>12} {} ({}){}",
                    step.phase.verb(),
                    step.product,
                    step.target,
                    via
                );
            }
            if !any {
                println!("nothing to do: no product asked for any phase");
            }
        }
    }
    Ok(())
}
