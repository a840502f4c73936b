//! Alive2, the LLVM translation validator.
//!
//! Alive builds against the LLVM and Z3 build directories of the same
//! target. After building, its public headers are exported to
//! `<build-dir>/include/alive2/<dir>` so downstream products can find them
//! at a fixed location.

use std::fs;
use std::path::{Path, PathBuf};

use crate::builder::cmake::CMakeOptions;
use crate::builder::context::BuildContext;
use crate::core::error::BuildError;
use crate::core::product::Product;
use crate::core::target::BuildTarget;
use crate::products::cmake_product::{
    base_options, build_with_cmake, define_darwin_options, install_with_cmake,
    shared_library_name, should_install_built, should_test_natively,
};
use crate::util::fs::{copy_into, ensure_dir, glob_files};

const NAME: &str = "alive";
const CHECKOUT: &str = "alive2";

/// Source directories whose headers make up the exported API.
pub const API_DIRS: &[&str] = &["ir", "llvm_util", "smt", "util", "tools"];

#[derive(Debug, Clone, Copy, Default)]
pub struct Alive;

impl Alive {
    /// Cache definitions for configuring Alive for `target`.
    pub fn cmake_options(
        &self,
        ctx: &BuildContext,
        target: &BuildTarget,
    ) -> Result<CMakeOptions, BuildError> {
        let mut options = base_options(ctx);
        define_darwin_options(ctx, target, &mut options)?;

        let llvm_dir = ctx.build_dir("llvm", target);
        let z3_build_dir = ctx.build_dir("z3", target);

        options
            .define("BUILD_TV", "0")
            .define("BUILD_LLVM_UTILS", "1")
            .define(
                "LLVM_DIR",
                llvm_dir.join("lib").join("cmake").join("llvm").to_string_lossy(),
            )
            .define(
                "Z3_INCLUDE_DIR",
                z3_build_dir.join("include").to_string_lossy(),
            )
            .define(
                "Z3_LIBRARIES",
                z3_build_dir
                    .join(shared_library_name("z3", target))
                    .to_string_lossy(),
            );

        Ok(options)
    }

    /// Copy the API headers into `<build_dir>/include/alive2`.
    ///
    /// An existing include directory is left untouched. Headers are copied
    /// into `include/alive2.partial` first and moved into place once every
    /// directory is done, so a failed export is repeated on the next run.
    /// Returns the number of headers copied.
    pub fn export_headers(source_dir: &Path, build_dir: &Path) -> Result<usize, BuildError> {
        let include_dir = build_dir.join("include").join("alive2");
        if include_dir.exists() {
            tracing::debug!("headers already exported to {}", include_dir.display());
            return Ok(0);
        }

        tracing::info!("Copying Alive headers into {}", include_dir.display());

        let staging = build_dir.join("include").join("alive2.partial");
        if staging.exists() {
            fs::remove_dir_all(&staging).map_err(|e| BuildError::filesystem(&staging, e))?;
        }

        let mut copied = 0;
        for api_dir in API_DIRS {
            let dest = staging.join(api_dir);
            ensure_dir(&dest)?;

            for header in glob_files(&source_dir.join(api_dir), "*.h")? {
                tracing::debug!("found header {}", header.display());
                copy_into(&header, &dest)?;
                copied += 1;
            }
        }

        fs::rename(&staging, &include_dir).map_err(|e| BuildError::filesystem(&include_dir, e))?;
        Ok(copied)
    }

    /// Where exported headers land for `target`.
    pub fn include_dir(ctx: &BuildContext, target: &BuildTarget) -> PathBuf {
        ctx.build_dir(NAME, target).join("include").join("alive2")
    }
}

impl Product for Alive {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Alive2 translation validation for LLVM"
    }

    fn is_before_legacy_phase(&self) -> bool {
        true
    }

    fn is_legacy_phase_product(&self) -> bool {
        false
    }

    fn dependencies(&self) -> Vec<&str> {
        vec!["llvm", "z3"]
    }

    fn should_build(&self, ctx: &BuildContext, _target: &BuildTarget) -> bool {
        ctx.product_enabled(NAME)
    }

    fn build(&self, ctx: &BuildContext, target: &BuildTarget) -> Result<(), BuildError> {
        let options = self.cmake_options(ctx, target)?;
        let build_dir = build_with_cmake(ctx, NAME, CHECKOUT, target, options, &["all"])?;
        Alive::export_headers(&ctx.source_dir(CHECKOUT), &build_dir)?;
        Ok(())
    }

    fn should_test(&self, ctx: &BuildContext, target: &BuildTarget) -> bool {
        should_test_natively(ctx, NAME, target)
    }

    fn test(&self, _ctx: &BuildContext, _target: &BuildTarget) -> Result<(), BuildError> {
        Ok(())
    }

    fn should_install(&self, ctx: &BuildContext, _target: &BuildTarget) -> bool {
        should_install_built(ctx, NAME)
    }

    fn install(&self, ctx: &BuildContext, target: &BuildTarget) -> Result<(), BuildError> {
        install_with_cmake(ctx, NAME, CHECKOUT, target, &["install"])
    }
}
