//! The Swift compiler, built by the legacy phase.

use crate::builder::context::BuildContext;
use crate::core::error::BuildError;
use crate::core::product::Product;
use crate::core::target::BuildTarget;
use crate::products::cmake_product::{should_install_built, should_test_natively};

const NAME: &str = "swift";

#[derive(Debug, Clone, Copy, Default)]
pub struct Swift;

impl Swift {
    fn delegated(&self, phase: &str, target: &BuildTarget) -> Result<(), BuildError> {
        tracing::debug!("{} of {} for {} is performed by the legacy phase", phase, NAME, target);
        Ok(())
    }
}

impl Product for Swift {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Swift compiler with the Alive-based SIL translation validator"
    }

    fn is_before_legacy_phase(&self) -> bool {
        false
    }

    fn is_legacy_phase_product(&self) -> bool {
        true
    }

    fn dependencies(&self) -> Vec<&str> {
        vec!["llvm", "alive"]
    }

    fn should_build(&self, ctx: &BuildContext, _target: &BuildTarget) -> bool {
        ctx.product_enabled(NAME)
    }

    fn build(&self, _ctx: &BuildContext, target: &BuildTarget) -> Result<(), BuildError> {
        self.delegated("build", target)
    }

    fn should_test(&self, ctx: &BuildContext, target: &BuildTarget) -> bool {
        should_test_natively(ctx, NAME, target)
    }

    fn test(&self, _ctx: &BuildContext, target: &BuildTarget) -> Result<(), BuildError> {
        self.delegated("test", target)
    }

    fn should_install(&self, ctx: &BuildContext, _target: &BuildTarget) -> bool {
        should_install_built(ctx, NAME)
    }

    fn install(&self, _ctx: &BuildContext, target: &BuildTarget) -> Result<(), BuildError> {
        self.delegated("install", target)
    }
}
