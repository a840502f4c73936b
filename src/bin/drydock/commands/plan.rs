//! `drydock plan` command

use anyhow::Result;
use serde::Serialize;

use crate::cli::{PlanArgs, PlanFormat};
use crate::commands::{load_context, parse_targets, report, GlobalArgs};
use drydock::planner::PlannedProduct;
use drydock::{ExecutionPlan, ProductRegistry};

#[derive(Serialize)]
struct PlanOutput<'a> {
    targets: Vec<String>,
    products: &'a [PlannedProduct],
}

pub fn execute(global: &GlobalArgs, args: PlanArgs) -> Result<()> {
    let ctx = load_context(global, |_| {})?;
    let targets = parse_targets(&ctx, &args.target, global.color)?;

    let registry = ProductRegistry::builtin();
    let plan = ExecutionPlan::build(&registry).map_err(|err| report(err, global.color))?;

    match args.format {
        PlanFormat::Json => {
            let output = PlanOutput {
                targets: targets.iter().map(ToString::to_string).collect(),
                products: plan.products(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        PlanFormat::Text => {
            let targets: Vec<String> = targets.iter().map(ToString::to_string).collect();
            println!("targets: {}", targets.join(", "));
            for (idx, planned) in plan.products().iter().enumerate() {
                let enabled = if ctx.product_enabled(&planned.name) {
                    ""
                } else {
                    " (disabled)"
                };
                if planned.dependencies.is_empty() {
                    println!("{:>3}. {} ({}){}", idx + 1, planned.name, planned.block, enabled);
                } else {
                    println!(
                        "{:>3}. {} ({}), needs {}{}",
                        idx + 1,
                        planned.name,
                        planned.block,
                        planned.dependencies.join(", "),
                        enabled
                    );
                }
            }
        }
    }

    Ok(())
}
