//! Implementation of `drydock build`.
//!
//! The orchestrator walks the execution plan once per target. For every
//! product it runs build, then test, then install, each only when the
//! product's predicate agrees. The legacy block is handed to the legacy
//! phase as one batch per target. The first failure stops the whole run.

use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;

use crate::builder::context::BuildContext;
use crate::builder::events::{BuildEvent, EventSink};
use crate::builder::legacy::{LegacyPhase, LegacyRequest};
use crate::core::error::{BuildError, ConfigurationError};
use crate::core::product::{Phase, PhaseBlock, Product};
use crate::core::registry::ProductRegistry;
use crate::core::target::BuildTarget;
use crate::planner::ExecutionPlan;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Options for the build command.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Targets to build, in order (empty = host then cross-compile targets)
    pub targets: Vec<BuildTarget>,
}

impl BuildOptions {
    /// The targets this run covers.
    pub fn resolve_targets(&self, ctx: &BuildContext) -> Vec<BuildTarget> {
        if self.targets.is_empty() {
            ctx.default_targets()
        } else {
            self.targets.clone()
        }
    }
}

/// Where one product stands for one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "phase", rename_all = "kebab-case")]
pub enum ProductState {
    NotStarted,
    Building,
    Built,
    Testing,
    Tested,
    Installing,
    Installed,
    Skipped(Phase),
    Failed(Phase),
}

impl ProductState {
    fn running(phase: Phase) -> Self {
        match phase {
            Phase::Build => ProductState::Building,
            Phase::Test => ProductState::Testing,
            Phase::Install => ProductState::Installing,
        }
    }

    fn finished(phase: Phase) -> Self {
        match phase {
            Phase::Build => ProductState::Built,
            Phase::Test => ProductState::Tested,
            Phase::Install => ProductState::Installed,
        }
    }
}

/// The lifecycle of one product for one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductRun {
    pub product: String,
    pub target: String,
    /// Every state the product passed through, starting at `NotStarted`
    pub history: Vec<ProductState>,
}

impl ProductRun {
    fn new(product: &str, target: &BuildTarget) -> Self {
        ProductRun {
            product: product.to_string(),
            target: target.to_string(),
            history: vec![ProductState::NotStarted],
        }
    }

    fn advance(&mut self, state: ProductState) {
        self.history.push(state);
    }

    /// The current state.
    pub fn state(&self) -> ProductState {
        self.history
            .last()
            .copied()
            .unwrap_or(ProductState::NotStarted)
    }

    /// Phases that completed, in order.
    pub fn completed(&self) -> Vec<Phase> {
        self.history
            .iter()
            .filter_map(|state| match state {
                ProductState::Built => Some(Phase::Build),
                ProductState::Tested => Some(Phase::Test),
                ProductState::Installed => Some(Phase::Install),
                _ => None,
            })
            .collect()
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// One entry per product and target, in execution order
    pub runs: Vec<ProductRun>,
    /// Phases that actually ran
    pub phases_run: u64,
    #[serde(skip)]
    pub duration: Duration,
}

impl RunReport {
    /// The run of `product` for `target`.
    pub fn run_of(&self, product: &str, target: &BuildTarget) -> Option<&ProductRun> {
        let target = target.to_string();
        self.runs
            .iter()
            .find(|r| r.product == product && r.target == target)
    }
}

/// Why a run stopped.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("failed to {phase} `{product}` for {target}")]
    Phase {
        target: String,
        product: String,
        phase: Phase,
        #[source]
        source: BuildError,
    },

    #[error("legacy phase failed for {target} ({})", products.join(", "))]
    Legacy {
        target: String,
        products: Vec<String>,
        #[source]
        source: BuildError,
    },
}

impl RunError {
    /// The underlying product or tool error, if any.
    pub fn build_error(&self) -> Option<&BuildError> {
        match self {
            RunError::Configuration(_) => None,
            RunError::Phase { source, .. } | RunError::Legacy { source, .. } => Some(source),
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            RunError::Configuration(err) => err.to_diagnostic(),
            RunError::Phase { source, .. } | RunError::Legacy { source, .. } => {
                let cause = source.to_diagnostic();
                let mut diag = Diagnostic::error(self.to_string())
                    .with_context(format!("caused by: {}", cause.message));
                diag.context.extend(cause.context);
                if let Some(location) = cause.location {
                    diag = diag.with_location(location);
                }
                diag.suggestions.extend(cause.suggestions);
                diag.with_suggestion(suggestions::PHASE_FAILED)
            }
        }
    }
}

/// Drives the plan for a set of targets.
pub struct Orchestrator<'a> {
    registry: &'a ProductRegistry,
    plan: &'a ExecutionPlan,
    ctx: &'a BuildContext,
    legacy: &'a dyn LegacyPhase,
    sink: &'a dyn EventSink,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        registry: &'a ProductRegistry,
        plan: &'a ExecutionPlan,
        ctx: &'a BuildContext,
        legacy: &'a dyn LegacyPhase,
        sink: &'a dyn EventSink,
    ) -> Self {
        Orchestrator {
            registry,
            plan,
            ctx,
            legacy,
            sink,
        }
    }

    /// Run every product of the plan for each target, in order.
    pub fn run(&self, targets: &[BuildTarget]) -> Result<RunReport, RunError> {
        let start = Instant::now();
        let steps = (self.plan.len() * targets.len() * Phase::ALL.len()) as u64;

        self.sink.emit(&BuildEvent::BuildStarted {
            targets: targets.iter().map(ToString::to_string).collect(),
            products: self.plan.len(),
            steps,
        });

        let mut report = RunReport::default();
        let result = targets
            .iter()
            .try_for_each(|target| self.run_target(target, &mut report));

        report.duration = start.elapsed();
        self.sink.emit(&BuildEvent::BuildFinished {
            success: result.is_ok(),
            duration_ms: report.duration.as_millis() as u64,
            phases_run: report.phases_run,
        });

        result.map(|()| report)
    }

    fn run_target(&self, target: &BuildTarget, report: &mut RunReport) -> Result<(), RunError> {
        tracing::debug!("running plan for {}", target);
        let mut legacy_done = false;

        for planned in self.plan.products() {
            if planned.block == PhaseBlock::Legacy {
                // The block is contiguous, so its first member triggers the batch
                if !legacy_done {
                    self.run_legacy(target, report)?;
                    legacy_done = true;
                }
                continue;
            }

            let product = self.registry.require(&planned.name)?;
            self.run_product(product, target, report)?;
        }

        Ok(())
    }

    fn run_product(
        &self,
        product: &dyn Product,
        target: &BuildTarget,
        report: &mut RunReport,
    ) -> Result<(), RunError> {
        let mut run = ProductRun::new(product.name(), target);

        for phase in Phase::ALL {
            if !product.should_run(phase, self.ctx, target) {
                tracing::debug!("skipping {} of {} for {}", phase, product.name(), target);
                run.advance(ProductState::Skipped(phase));
                self.sink.emit(&BuildEvent::PhaseSkipped {
                    product: product.name().to_string(),
                    target: target.to_string(),
                    phase,
                });
                continue;
            }

            run.advance(ProductState::running(phase));
            self.sink.emit(&BuildEvent::PhaseStarted {
                product: product.name().to_string(),
                target: target.to_string(),
                phase,
            });

            let started = Instant::now();
            if let Err(source) = product.run(phase, self.ctx, target) {
                run.advance(ProductState::Failed(phase));
                report.runs.push(run);
                self.sink.emit(&BuildEvent::PhaseFailed {
                    product: product.name().to_string(),
                    target: target.to_string(),
                    phase,
                    message: source.to_string(),
                });
                return Err(RunError::Phase {
                    target: target.to_string(),
                    product: product.name().to_string(),
                    phase,
                    source,
                });
            }

            run.advance(ProductState::finished(phase));
            report.phases_run += 1;
            self.sink.emit(&BuildEvent::PhaseFinished {
                product: product.name().to_string(),
                target: target.to_string(),
                phase,
                duration_ms: started.elapsed().as_millis() as u64,
            });
        }

        report.runs.push(run);
        Ok(())
    }

    fn run_legacy(&self, target: &BuildTarget, report: &mut RunReport) -> Result<(), RunError> {
        let requests = legacy_requests(self.registry, self.plan, self.ctx, target)?;

        if !requests.iter().any(LegacyRequest::is_active) {
            tracing::debug!("nothing for the legacy phase to do for {}", target);
            for request in &requests {
                let mut run = ProductRun::new(&request.product, target);
                for phase in Phase::ALL {
                    run.advance(ProductState::Skipped(phase));
                    self.sink.emit(&BuildEvent::PhaseSkipped {
                        product: request.product.clone(),
                        target: target.to_string(),
                        phase,
                    });
                }
                report.runs.push(run);
            }
            return Ok(());
        }

        self.sink.emit(&BuildEvent::LegacyPhase {
            target: target.to_string(),
            requests: requests.clone(),
        });

        if let Err(source) = self.legacy.run(self.ctx, target, &requests) {
            let products: Vec<String> = requests.iter().map(|r| r.product.clone()).collect();
            self.sink.emit(&BuildEvent::PhaseFailed {
                product: products.join(","),
                target: target.to_string(),
                phase: Phase::Build,
                message: source.to_string(),
            });
            return Err(RunError::Legacy {
                target: target.to_string(),
                products,
                source,
            });
        }

        for request in &requests {
            let mut run = ProductRun::new(&request.product, target);
            let wanted = [request.build, request.test, request.install];
            for (phase, wanted) in Phase::ALL.into_iter().zip(wanted) {
                if wanted {
                    run.advance(ProductState::finished(phase));
                    report.phases_run += 1;
                } else {
                    run.advance(ProductState::Skipped(phase));
                }
            }
            report.runs.push(run);
        }

        Ok(())
    }
}

/// Ask every legacy-block product which phases it wants for `target`.
fn legacy_requests(
    registry: &ProductRegistry,
    plan: &ExecutionPlan,
    ctx: &BuildContext,
    target: &BuildTarget,
) -> Result<Vec<LegacyRequest>, ConfigurationError> {
    plan.block(PhaseBlock::Legacy)
        .map(|planned| {
            let product = registry.require(&planned.name)?;
            Ok(LegacyRequest {
                product: product.name().to_string(),
                build: product.should_build(ctx, target),
                test: product.should_test(ctx, target),
                install: product.should_install(ctx, target),
            })
        })
        .collect()
}

/// One phase a run would perform, as reported by `--dry-run`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedStep {
    pub target: String,
    pub product: String,
    pub phase: Phase,
    /// Whether the product's predicate asks for this phase
    pub run: bool,
    /// Whether the legacy phase performs it
    pub legacy: bool,
}

/// Evaluate every predicate without running anything.
pub fn preview(
    registry: &ProductRegistry,
    plan: &ExecutionPlan,
    ctx: &BuildContext,
    targets: &[BuildTarget],
) -> Result<Vec<PlannedStep>, ConfigurationError> {
    let mut steps = Vec::new();

    for target in targets {
        for planned in plan.products() {
            let product = registry.require(&planned.name)?;
            for phase in Phase::ALL {
                steps.push(PlannedStep {
                    target: target.to_string(),
                    product: planned.name.clone(),
                    phase,
                    run: product.should_run(phase, ctx, target),
                    legacy: planned.block == PhaseBlock::Legacy,
                });
            }
        }
    }

    Ok(steps)
}

/// Plan and run every registered product.
pub fn build(
    registry: &ProductRegistry,
    ctx: &BuildContext,
    options: &BuildOptions,
    legacy: &dyn LegacyPhase,
    sink: &dyn EventSink,
) -> Result<RunReport, RunError> {
    let plan = ExecutionPlan::build(registry)?;
    let targets = options.resolve_targets(ctx);

    tracing::debug!("plan: {}", plan.names().join(", "));

    Orchestrator::new(registry, &plan, ctx, legacy, sink).run(&targets)
}
