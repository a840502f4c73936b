//! The Z3 SMT solver.

use crate::builder::context::BuildContext;
use crate::core::error::BuildError;
use crate::core::product::Product;
use crate::core::target::BuildTarget;
use crate::products::cmake_product::{
    base_options, build_with_cmake, define_darwin_options, install_with_cmake,
    should_install_built, should_test_natively,
};
use crate::util::process::ProcessBuilder;

const NAME: &str = "z3";
const CHECKOUT: &str = "z3";

#[derive(Debug, Clone, Copy, Default)]
pub struct Z3;

impl Product for Z3 {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Z3 theorem prover"
    }

    fn is_before_legacy_phase(&self) -> bool {
        true
    }

    fn is_legacy_phase_product(&self) -> bool {
        false
    }

    fn dependencies(&self) -> Vec<&str> {
        Vec::new()
    }

    fn should_build(&self, ctx: &BuildContext, _target: &BuildTarget) -> bool {
        ctx.product_enabled(NAME)
    }

    fn build(&self, ctx: &BuildContext, target: &BuildTarget) -> Result<(), BuildError> {
        let mut options = base_options(ctx);
        define_darwin_options(ctx, target, &mut options)?;
        options.define("Z3_BUILD_LIBZ3_SHARED:BOOL", "TRUE");

        build_with_cmake(ctx, NAME, CHECKOUT, target, options, &["all"])?;
        Ok(())
    }

    fn should_test(&self, ctx: &BuildContext, target: &BuildTarget) -> bool {
        should_test_natively(ctx, NAME, target)
    }

    fn test(&self, ctx: &BuildContext, target: &BuildTarget) -> Result<(), BuildError> {
        let mut options = base_options(ctx);
        define_darwin_options(ctx, target, &mut options)?;
        let build_dir = build_with_cmake(ctx, NAME, CHECKOUT, target, options, &["test-z3"])?;

        // `/a` runs every unit test
        ProcessBuilder::new(build_dir.join("test-z3"))
            .arg("/a")
            .cwd(&build_dir)
            .exec_and_check()?;
        Ok(())
    }

    fn should_install(&self, ctx: &BuildContext, _target: &BuildTarget) -> bool {
        should_install_built(ctx, NAME)
    }

    fn install(&self, ctx: &BuildContext, target: &BuildTarget) -> Result<(), BuildError> {
        install_with_cmake(ctx, NAME, CHECKOUT, target, &["install"])
    }
}
