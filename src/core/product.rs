//! The lifecycle contract every build product implements.

use std::fmt;

use serde::Serialize;

use crate::builder::context::BuildContext;
use crate::core::error::BuildError;
use crate::core::target::BuildTarget;

/// A unit of work in the build graph.
///
/// Descriptors are immutable once registered. Dependencies and the two
/// phase classifications are static: they are read while planning, before
/// anything runs. The `should_*` predicates must be free of side effects
/// since they may be evaluated speculatively (e.g. by `drydock build
/// --dry-run`).
pub trait Product {
    /// Unique product name.
    fn name(&self) -> &str;

    /// One-line description for listings.
    fn description(&self) -> &str {
        ""
    }

    /// Whether this product runs before every legacy-phase product.
    fn is_before_legacy_phase(&self) -> bool;

    /// Whether the build work of this product is delegated to the legacy phase.
    fn is_legacy_phase_product(&self) -> bool;

    /// Names of the products that must run first, in declaration order.
    fn dependencies(&self) -> Vec<&str>;

    fn should_build(&self, ctx: &BuildContext, target: &BuildTarget) -> bool;

    fn build(&self, ctx: &BuildContext, target: &BuildTarget) -> Result<(), BuildError>;

    fn should_test(&self, ctx: &BuildContext, target: &BuildTarget) -> bool;

    fn test(&self, ctx: &BuildContext, target: &BuildTarget) -> Result<(), BuildError>;

    fn should_install(&self, ctx: &BuildContext, target: &BuildTarget) -> bool;

    fn install(&self, ctx: &BuildContext, target: &BuildTarget) -> Result<(), BuildError>;

    /// Evaluate the predicate guarding `phase`.
    fn should_run(&self, phase: Phase, ctx: &BuildContext, target: &BuildTarget) -> bool {
        match phase {
            Phase::Build => self.should_build(ctx, target),
            Phase::Test => self.should_test(ctx, target),
            Phase::Install => self.should_install(ctx, target),
        }
    }

    /// Perform `phase`.
    fn run(&self, phase: Phase, ctx: &BuildContext, target: &BuildTarget) -> Result<(), BuildError> {
        match phase {
            Phase::Build => self.build(ctx, target),
            Phase::Test => self.test(ctx, target),
            Phase::Install => self.install(ctx, target),
        }
    }
}

/// A lifecycle phase, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Build,
    Test,
    Install,
}

impl Phase {
    /// All phases in the order they run for a product.
    pub const ALL: [Phase; 3] = [Phase::Build, Phase::Test, Phase::Install];

    /// Present participle for status lines ("Building", ...).
    pub fn verb(&self) -> &'static str {
        match self {
            Phase::Build => "Building",
            Phase::Test => "Testing",
            Phase::Install => "Installing",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Build => write!(f, "build"),
            Phase::Test => write!(f, "test"),
            Phase::Install => write!(f, "install"),
        }
    }
}

/// The block of the execution plan a product belongs to.
///
/// Blocks run in declaration order: before-legacy products, then the legacy
/// block, then everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseBlock {
    BeforeLegacy,
    Legacy,
    AfterLegacy,
}

impl PhaseBlock {
    /// Classify a product.
    ///
    /// A product claiming both flags is a legacy-phase product: its build
    /// work is not its own to order.
    pub fn of(product: &dyn Product) -> Self {
        if product.is_legacy_phase_product() {
            PhaseBlock::Legacy
        } else if product.is_before_legacy_phase() {
            PhaseBlock::BeforeLegacy
        } else {
            PhaseBlock::AfterLegacy
        }
    }
}

impl fmt::Display for PhaseBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseBlock::BeforeLegacy => write!(f, "before the legacy phase"),
            PhaseBlock::Legacy => write!(f, "in the legacy phase"),
            PhaseBlock::AfterLegacy => write!(f, "after the legacy phase"),
        }
    }
}
