//! CMake adapter: configure, build and install one CMake project.

use std::path::{Path, PathBuf};

use crate::core::error::BuildError;
use crate::core::variant::BuildVariant;
use crate::util::fs::ensure_dir;
use crate::util::process::{find_cmake, find_ninja, ProcessBuilder};

/// Ordered `-D` cache definitions for a CMake configure step.
///
/// Redefining a key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CMakeOptions {
    defines: Vec<(String, String)>,
}

impl CMakeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define `key` (optionally typed, e.g. `CMAKE_OSX_SYSROOT:PATH`).
    pub fn define(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.defines.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.defines.push((key, value)),
        }
        self
    }

    /// Look up a define by its full key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.defines
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Render as command-line arguments.
    pub fn to_args(&self) -> Vec<String> {
        self.defines
            .iter()
            .map(|(k, v)| format!("-D{}={}", k, v))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.defines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defines.is_empty()
    }
}

/// CMake build adapter.
pub struct CMakeBuilder {
    cmake: PathBuf,
    source_dir: PathBuf,
    build_dir: PathBuf,
    options: CMakeOptions,
    variant: BuildVariant,
    jobs: Option<usize>,
}

impl CMakeBuilder {
    /// Create a new CMake builder. Fails when `cmake` is not on PATH.
    pub fn new(source_dir: PathBuf, build_dir: PathBuf) -> Result<Self, BuildError> {
        let cmake = find_cmake().ok_or_else(|| {
            BuildError::tool_not_found(
                "cmake",
                "Install CMake and ensure it's in your PATH",
            )
        })?;

        Ok(CMakeBuilder {
            cmake,
            source_dir,
            build_dir,
            options: CMakeOptions::new(),
            variant: BuildVariant::default(),
            jobs: None,
        })
    }

    /// Set the cache definitions.
    pub fn options(mut self, options: CMakeOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the build variant.
    pub fn variant(mut self, variant: BuildVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Limit parallel jobs.
    pub fn jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// Configure, then build `targets` (all targets when empty).
    pub fn build(&self, targets: &[&str]) -> Result<(), BuildError> {
        ensure_dir(&self.build_dir)?;
        self.configure()?;
        self.compile(targets, None)
    }

    /// Build the install targets with `DESTDIR` pointing at `destdir`.
    pub fn install(&self, targets: &[&str], destdir: &Path) -> Result<(), BuildError> {
        if !self.build_dir.join("CMakeCache.txt").is_file() {
            return Err(BuildError::filesystem(
                self.build_dir.join("CMakeCache.txt"),
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "project has not been configured; build it first",
                ),
            ));
        }
        ensure_dir(destdir)?;
        self.compile(targets, Some(destdir))
    }

    /// The configure command.
    pub fn configure_command(&self) -> ProcessBuilder {
        let mut cmd = ProcessBuilder::new(&self.cmake)
            .arg("-S")
            .arg(&self.source_dir)
            .arg("-B")
            .arg(&self.build_dir);

        // Generator choice is sticky once a cache exists
        if !self.build_dir.join("CMakeCache.txt").exists() && find_ninja().is_some() {
            cmd = cmd.args(["-G", "Ninja"]);
        }

        cmd.args(self.options.to_args())
    }

    /// The build command for `targets`.
    pub fn build_command(&self, targets: &[&str]) -> ProcessBuilder {
        let mut cmd = ProcessBuilder::new(&self.cmake)
            .arg("--build")
            .arg(&self.build_dir)
            .arg("--config")
            .arg(self.variant.as_str());

        match self.jobs {
            Some(jobs) => cmd = cmd.arg("--parallel").arg(jobs.to_string()),
            None => cmd = cmd.arg("--parallel"),
        }

        if !targets.is_empty() {
            cmd = cmd.arg("--target").args(targets);
        }

        cmd
    }

    fn configure(&self) -> Result<(), BuildError> {
        tracing::info!("Configuring {}", self.source_dir.display());
        self.configure_command().exec_and_check()?;
        Ok(())
    }

    fn compile(&self, targets: &[&str], destdir: Option<&Path>) -> Result<(), BuildError> {
        let mut cmd = self.build_command(targets);
        if let Some(destdir) = destdir {
            cmd = cmd.env("DESTDIR", destdir.to_string_lossy());
        }
        cmd.exec_and_check()?;
        Ok(())
    }
}

/// Check if a directory contains a CMake project.
pub fn is_cmake_project(dir: &Path) -> bool {
    dir.join("CMakeLists.txt").exists()
}
