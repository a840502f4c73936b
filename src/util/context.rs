//! Global context for Drydock operations.
//!
//! Provides centralized access to the working directory, the located
//! configuration files and output preferences.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::config::{self, Config, CONFIG_FILE};

/// Global context containing paths and output preferences.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Global config file (`~/.drydock/config.toml`), if a home exists
    global_config: Option<PathBuf>,

    /// Whether to use verbose output
    verbose: bool,

    /// Whether to use colors in output
    color: bool,
}

impl GlobalContext {
    /// Create a new GlobalContext rooted at the current directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        GlobalContext {
            cwd,
            global_config: config::global_config_path(),
            verbose: false,
            color: true,
        }
    }

    /// Override the global config location.
    pub fn with_global_config(mut self, path: Option<PathBuf>) -> Self {
        self.global_config = path;
        self
    }

    /// Set verbose mode.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Set color output.
    pub fn set_color(&mut self, color: bool) {
        self.color = color;
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Check if verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Check if color output is enabled.
    pub fn color(&self) -> bool {
        self.color
    }

    /// Find `drydock.toml` starting from cwd and searching upward.
    pub fn find_config(&self) -> Option<PathBuf> {
        self.cwd
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE))
            .find(|candidate| candidate.is_file())
    }

    /// Load the merged configuration.
    ///
    /// `explicit` replaces the upward search for the project config. Returns
    /// the configuration and the project root relative paths resolve
    /// against: the project config's directory, or cwd without one.
    pub fn load_config(&self, explicit: Option<&Path>) -> Result<(Config, PathBuf, Option<PathBuf>)> {
        let project = match explicit {
            Some(path) => {
                let path = self.cwd.join(path);
                if !path.is_file() {
                    anyhow::bail!("config file not found: {}", path.display());
                }
                Some(path)
            }
            None => self.find_config(),
        };

        let config = config::load_config(self.global_config.as_deref(), project.as_deref())?;

        let root = project
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.cwd.clone());

        Ok((config, root, project))
    }
}
