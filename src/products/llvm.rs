//! LLVM, built as a standalone CMake product.

use crate::builder::cmake::CMakeOptions;
use crate::builder::context::BuildContext;
use crate::core::error::BuildError;
use crate::core::product::Product;
use crate::core::target::BuildTarget;
use crate::products::cmake_product::{
    base_options, build_with_cmake, define_darwin_options, install_with_cmake,
    should_install_built, should_test_natively,
};

const NAME: &str = "llvm";
const CHECKOUT: &str = "llvm-project/llvm";

#[derive(Debug, Clone, Copy, Default)]
pub struct Llvm;

impl Llvm {
    /// Cache definitions for configuring LLVM for `target`.
    ///
    /// Build and test share them so `check-llvm` reuses the build's cache.
    pub fn cmake_options(
        &self,
        ctx: &BuildContext,
        target: &BuildTarget,
    ) -> Result<CMakeOptions, BuildError> {
        let mut options = base_options(ctx);
        define_darwin_options(ctx, target, &mut options)?;

        // Alive links against LLVM and needs both
        options
            .define("LLVM_ENABLE_RTTI:BOOL", "ON")
            .define("LLVM_ENABLE_EH:BOOL", "ON")
            .define(
                "LLVM_INCLUDE_TESTS:BOOL",
                if ctx.test_enabled() { "ON" } else { "OFF" },
            );

        Ok(options)
    }
}

impl Product for Llvm {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "LLVM core libraries and utilities"
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
        let options = self.cmake_options(ctx, target)?;
        build_with_cmake(ctx, NAME, CHECKOUT, target, options, &["all"])?;
        Ok(())
    }

    fn should_test(&self, ctx: &BuildContext, target: &BuildTarget) -> bool {
        should_test_natively(ctx, NAME, target)
    }

    fn test(&self, ctx: &BuildContext, target: &BuildTarget) -> Result<(), BuildError> {
        let options = self.cmake_options(ctx, target)?;
        build_with_cmake(ctx, NAME, CHECKOUT, target, options, &["check-llvm"])?;
        Ok(())
    }

    fn should_install(&self, ctx: &BuildContext, _target: &BuildTarget) -> bool {
        should_install_built(ctx, NAME)
    }

    fn install(&self, ctx: &BuildContext, target: &BuildTarget) -> Result<(), BuildError> {
        install_with_cmake(ctx, NAME, CHECKOUT, target, &["install"])
    }
}
