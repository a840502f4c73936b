//! Build context - the shared configuration every lifecycle call receives.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::builder::sdk::{SdkLocator, XcrunSdkLocator};
use crate::core::error::ConfigurationError;
use crate::core::target::BuildTarget;
use crate::core::variant::BuildVariant;
use crate::util::config::Config;
use crate::util::fs::resolve_against;

/// Default install prefix inside the staging directory.
pub const DEFAULT_INSTALL_PREFIX: &str = "/usr";

/// Build context containing configuration and runtime facts.
///
/// Products never read global state: everything a predicate or phase may
/// consult is reachable from here.
#[derive(Clone)]
pub struct BuildContext {
    /// Merged configuration
    pub config: Config,

    /// Target of the machine running the build
    pub host: BuildTarget,

    /// Additional targets built by cross-compilation
    pub cross_compile_hosts: Vec<BuildTarget>,

    /// CMake build variant
    pub variant: BuildVariant,

    /// Directory holding product checkouts
    pub source_root: PathBuf,

    /// Directory holding per-product build directories
    pub build_root: PathBuf,

    /// Staging directory for install phases
    pub install_destdir: PathBuf,

    /// Install prefix inside the staging directory
    pub install_prefix: String,

    /// Parallel jobs for the native build tool
    pub jobs: Option<usize>,

    /// Platform SDK locator
    sdk: Arc<dyn SdkLocator>,
}

impl fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildContext")
            .field("host", &self.host)
            .field("cross_compile_hosts", &self.cross_compile_hosts)
            .field("variant", &self.variant)
            .field("source_root", &self.source_root)
            .field("build_root", &self.build_root)
            .field("install_destdir", &self.install_destdir)
            .field("install_prefix", &self.install_prefix)
            .field("jobs", &self.jobs)
            .finish_non_exhaustive()
    }
}

impl BuildContext {
    /// Create a context from merged configuration.
    ///
    /// Relative paths in the configuration resolve against `root`.
    pub fn from_config(config: Config, root: &Path) -> Result<Self, ConfigurationError> {
        let host = match config.targets.host.as_deref() {
            Some(host) => BuildTarget::parse(host)?,
            None => BuildTarget::host(),
        };

        let cross_compile_hosts = config
            .targets
            .cross_compile
            .iter()
            .map(|t| BuildTarget::parse(t))
            .collect::<Result<Vec<_>, _>>()?;

        let variant = match config.build.variant.as_deref() {
            Some(variant) => variant.parse()?,
            None => BuildVariant::default(),
        };

        let source_root = config
            .paths
            .source_root
            .as_deref()
            .map(|p| resolve_against(root, p))
            .unwrap_or_else(|| root.to_path_buf());

        let build_root = config
            .paths
            .build_root
            .as_deref()
            .map(|p| resolve_against(root, p))
            .unwrap_or_else(|| root.join("build"));

        let install_destdir = config
            .paths
            .install_destdir
            .as_deref()
            .map(|p| resolve_against(root, p))
            .unwrap_or_else(|| build_root.join("install"));

        let install_prefix = config
            .paths
            .install_prefix
            .clone()
            .unwrap_or_else(|| DEFAULT_INSTALL_PREFIX.to_string());

        let jobs = config.build.jobs;

        Ok(BuildContext {
            config,
            host,
            cross_compile_hosts,
            variant,
            source_root,
            build_root,
            install_destdir,
            install_prefix,
            jobs,
            sdk: Arc::new(XcrunSdkLocator),
        })
    }

    /// Replace the platform SDK locator.
    pub fn with_sdk_locator(mut self, sdk: Arc<dyn SdkLocator>) -> Self {
        self.sdk = sdk;
        self
    }

    /// The platform SDK locator.
    pub fn sdk(&self) -> &dyn SdkLocator {
        self.sdk.as_ref()
    }

    /// The host followed by every cross-compile target.
    pub fn default_targets(&self) -> Vec<BuildTarget> {
        let mut targets = vec![self.host.clone()];
        for target in &self.cross_compile_hosts {
            if !targets.contains(target) {
                targets.push(target.clone());
            }
        }
        targets
    }

    /// Whether `target` is built on a machine of a different target.
    pub fn is_cross_compile_target(&self, target: &BuildTarget) -> bool {
        target != &self.host
    }

    /// Whether the configuration asks for `product` to be built.
    pub fn product_enabled(&self, product: &str) -> bool {
        self.config.product_enabled(product)
    }

    /// Whether test phases were requested.
    pub fn test_enabled(&self) -> bool {
        self.config.build.test
    }

    /// Whether every product should be installed.
    pub fn install_all(&self) -> bool {
        self.config.build.install_all
    }

    /// Checkout directory of a product.
    pub fn source_dir(&self, checkout: &str) -> PathBuf {
        self.source_root.join(checkout)
    }

    /// Build directory of a product for one target (`<build-root>/<product>-<target>`).
    pub fn build_dir(&self, product: &str, target: &BuildTarget) -> PathBuf {
        self.build_root.join(format!("{}-{}", product, target))
    }

    /// Staging directory the install phase writes to for `target`.
    ///
    /// Targets get their own subdirectory once cross-compilation is in play,
    /// either through configured cross hosts or a non-host target.
    pub fn host_install_destdir(&self, target: &BuildTarget) -> PathBuf {
        if self.cross_compile_hosts.is_empty() && !self.is_cross_compile_target(target) {
            self.install_destdir.clone()
        } else {
            self.install_destdir.join(target.to_string())
        }
    }

    /// Configured minimum OS version for a Darwin target.
    pub fn deployment_version(&self, target: &BuildTarget) -> Option<&str> {
        let darwin = &self.config.darwin;
        let version = match target.platform() {
            "macosx" => &darwin.deployment_version_osx,
            "iphoneos" | "iphonesimulator" => &darwin.deployment_version_ios,
            "appletvos" | "appletvsimulator" => &darwin.deployment_version_tvos,
            "watchos" | "watchsimulator" => &darwin.deployment_version_watchos,
            _ => return None,
        };
        version.as_deref()
    }
}
