//! Configuration file support for Drydock.
//!
//! Drydock reads two configuration files:
//! - Global: `~/.drydock/config.toml` - user-wide defaults
//! - Project: `drydock.toml` - the build being orchestrated
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.
//!
//! ```toml
//! [build]
//! variant = "RelWithDebInfo"
//! test = true
//!
//! [paths]
//! source-root = ".."
//! build-root = "build"
//!
//! [targets]
//! cross-compile = ["iphoneos-arm64"]
//!
//! [products.alive]
//! build = true
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Name of the project configuration file.
pub const CONFIG_FILE: &str = "drydock.toml";

/// Drydock configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Build settings
    pub build: BuildConfig,

    /// Directory layout
    pub paths: PathsConfig,

    /// Host and cross-compile targets
    pub targets: TargetsConfig,

    /// Apple platform settings
    pub darwin: DarwinConfig,

    /// Per-product settings, keyed by product name
    pub products: BTreeMap<String, ProductConfig>,

    /// Legacy build phase
    pub legacy: LegacyConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildConfig {
    /// CMake build variant (Debug, Release, RelWithDebInfo, MinSizeRel)
    pub variant: Option<String>,

    /// Run test phases
    pub test: bool,

    /// Run install phases for every product
    pub install_all: bool,

    /// Parallel jobs passed to the native build tool (None = tool default)
    pub jobs: Option<usize>,
}

/// Directory layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PathsConfig {
    /// Directory holding product checkouts (default: the project directory)
    pub source_root: Option<PathBuf>,

    /// Directory holding per-product build directories (default: `build`)
    pub build_root: Option<PathBuf>,

    /// Staging directory for install phases (default: `<build-root>/install`)
    pub install_destdir: Option<PathBuf>,

    /// Install prefix inside the staging directory (default: `/usr`)
    pub install_prefix: Option<String>,
}

/// Target configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TargetsConfig {
    /// Host target (default: detected)
    pub host: Option<String>,

    /// Additional targets built by cross-compilation
    pub cross_compile: Vec<String>,
}

/// Apple platform deployment versions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DarwinConfig {
    pub deployment_version_osx: Option<String>,
    pub deployment_version_ios: Option<String>,
    pub deployment_version_tvos: Option<String>,
    pub deployment_version_watchos: Option<String>,
}

/// Per-product configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProductConfig {
    /// Whether the product is built
    pub build: bool,
}

/// Legacy build phase configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LegacyConfig {
    /// Script that performs the legacy phase
    pub script: Option<PathBuf>,

    /// Extra arguments passed to the script
    pub args: Vec<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is missing
    /// or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        // Build settings
        if other.build.variant.is_some() {
            self.build.variant = other.build.variant;
        }
        if other.build.test {
            self.build.test = true;
        }
        if other.build.install_all {
            self.build.install_all = true;
        }
        if other.build.jobs.is_some() {
            self.build.jobs = other.build.jobs;
        }

        // Paths
        if other.paths.source_root.is_some() {
            self.paths.source_root = other.paths.source_root;
        }
        if other.paths.build_root.is_some() {
            self.paths.build_root = other.paths.build_root;
        }
        if other.paths.install_destdir.is_some() {
            self.paths.install_destdir = other.paths.install_destdir;
        }
        if other.paths.install_prefix.is_some() {
            self.paths.install_prefix = other.paths.install_prefix;
        }

        // Targets
        if other.targets.host.is_some() {
            self.targets.host = other.targets.host;
        }
        if !other.targets.cross_compile.is_empty() {
            self.targets.cross_compile = other.targets.cross_compile;
        }

        // Darwin
        if other.darwin.deployment_version_osx.is_some() {
            self.darwin.deployment_version_osx = other.darwin.deployment_version_osx;
        }
        if other.darwin.deployment_version_ios.is_some() {
            self.darwin.deployment_version_ios = other.darwin.deployment_version_ios;
        }
        if other.darwin.deployment_version_tvos.is_some() {
            self.darwin.deployment_version_tvos = other.darwin.deployment_version_tvos;
        }
        if other.darwin.deployment_version_watchos.is_some() {
            self.darwin.deployment_version_watchos = other.darwin.deployment_version_watchos;
        }

        // Products are merged per entry
        self.products.extend(other.products);

        // Legacy phase
        if other.legacy.script.is_some() {
            self.legacy.script = other.legacy.script;
        }
        if !other.legacy.args.is_empty() {
            self.legacy.args = other.legacy.args;
        }
    }

    /// Whether `[products.<name>] build = true`.
    pub fn product_enabled(&self, name: &str) -> bool {
        self.products.get(name).map(|p| p.build).unwrap_or(false)
    }

    /// Enable building a product.
    pub fn enable_product(&mut self, name: &str) {
        self.products.entry(name.to_string()).or_default().build = true;
    }

    /// Product names mentioned in the configuration.
    pub fn configured_products(&self) -> impl Iterator<Item = &str> + '_ {
        self.products.keys().map(String::as_str)
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (`drydock.toml`)
/// 2. Global config (`~/.drydock/config.toml`)
/// 3. Defaults
///
/// A broken global config is ignored with a warning; a broken project
/// config is an error.
pub fn load_config(global_path: Option<&Path>, project_path: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    if let Some(project_path) = project_path {
        config.merge(Config::load(project_path)?);
    }

    Ok(config)
}

/// Get the global drydock config directory (`~/.drydock`).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".drydock"))
}

/// Get the global config path (`~/.drydock/config.toml`).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}
