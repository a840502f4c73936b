//! Plumbing shared by products built with CMake.

use std::path::PathBuf;

use crate::builder::cmake::{is_cmake_project, CMakeBuilder, CMakeOptions};
use crate::builder::context::BuildContext;
use crate::core::error::BuildError;
use crate::core::target::BuildTarget;

/// Cache definitions every CMake product starts from.
pub fn base_options(ctx: &BuildContext) -> CMakeOptions {
    let mut options = CMakeOptions::new();
    options
        .define("CMAKE_BUILD_TYPE:STRING", ctx.variant.as_str())
        .define("CMAKE_INSTALL_PREFIX:PATH", ctx.install_prefix.as_str());
    options
}

/// C flags for building `target`, which may differ from the host.
pub fn common_cross_c_flags(ctx: &BuildContext, target: &BuildTarget) -> Vec<String> {
    let mut flags = Vec::new();

    if target.is_darwin() {
        flags.push("-arch".to_string());
        flags.push(target.arch().to_string());

        if let (Some(os), Some(version)) = (target.darwin_os_name(), ctx.deployment_version(target)) {
            flags.push(format!("-m{}-version-min={}", os, version));
        }
    }

    if ctx.variant.is_release() {
        flags.push("-fno-stack-protector".to_string());
    }

    flags
}

/// Point CMake at the Apple SDK for a Darwin target. No-op elsewhere.
pub fn define_darwin_options(
    ctx: &BuildContext,
    target: &BuildTarget,
    options: &mut CMakeOptions,
) -> Result<(), BuildError> {
    if !target.is_darwin() {
        return Ok(());
    }

    let sysroot = ctx.sdk().sdk_path(target.platform())?;

    // Only macOS takes its deployment target from CMake
    let deployment_target = if target.platform() == "macosx" {
        ctx.deployment_version(target).unwrap_or_default()
    } else {
        ""
    };

    let c_flags = common_cross_c_flags(ctx, target).join(" ");

    options
        .define("CMAKE_C_FLAGS", c_flags.as_str())
        .define("CMAKE_CXX_FLAGS", c_flags)
        .define("CMAKE_OSX_SYSROOT:PATH", sysroot.to_string_lossy())
        .define("CMAKE_OSX_DEPLOYMENT_TARGET", deployment_target)
        .define("CMAKE_OSX_ARCHITECTURES", target.arch());

    Ok(())
}

/// File name of a shared library for `target`.
pub fn shared_library_name(name: &str, target: &BuildTarget) -> String {
    if target.is_darwin() {
        format!("lib{}.dylib", name)
    } else if target.platform() == "windows" {
        format!("{}.lib", name)
    } else {
        format!("lib{}.so", name)
    }
}

/// A CMake builder for `product`, checked out at `<source-root>/<checkout>`.
pub fn cmake_builder(
    ctx: &BuildContext,
    product: &str,
    checkout: &str,
    target: &BuildTarget,
    options: CMakeOptions,
) -> Result<CMakeBuilder, BuildError> {
    let source_dir = ctx.source_dir(checkout);
    if !is_cmake_project(&source_dir) {
        return Err(BuildError::filesystem(
            source_dir.join("CMakeLists.txt"),
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no CMake project for `{}`", product),
            ),
        ));
    }

    Ok(CMakeBuilder::new(source_dir, ctx.build_dir(product, target))?
        .options(options)
        .variant(ctx.variant)
        .jobs(ctx.jobs))
}

/// Configure and build `targets` of a CMake product.
pub fn build_with_cmake(
    ctx: &BuildContext,
    product: &str,
    checkout: &str,
    target: &BuildTarget,
    options: CMakeOptions,
    targets: &[&str],
) -> Result<PathBuf, BuildError> {
    let builder = cmake_builder(ctx, product, checkout, target, options)?;
    builder.build(targets)?;
    Ok(builder.build_dir().to_path_buf())
}

/// Run the install targets of an already configured CMake product.
pub fn install_with_cmake(
    ctx: &BuildContext,
    product: &str,
    checkout: &str,
    target: &BuildTarget,
    targets: &[&str],
) -> Result<(), BuildError> {
    let builder = cmake_builder(ctx, product, checkout, target, CMakeOptions::new())?;
    builder.install(targets, &ctx.host_install_destdir(target))
}

/// Test phases need to execute what was built, so they only run natively,
/// and only for products that are built at all.
pub fn should_test_natively(ctx: &BuildContext, product: &str, target: &BuildTarget) -> bool {
    ctx.product_enabled(product) && !ctx.is_cross_compile_target(target) && ctx.test_enabled()
}

/// Install phases run for built products when `install-all` is set.
pub fn should_install_built(ctx: &BuildContext, product: &str) -> bool {
    ctx.product_enabled(product) && ctx.install_all()
}
