//! Error taxonomy for planning and running builds.

use std::io;
use std::path::{Path, PathBuf};

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::product::PhaseBlock;
use crate::util::diagnostic::Diagnostic;

/// A problem with the declared products or the run configuration.
///
/// Always detected before any phase runs.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ConfigurationError {
    #[error("cycle detected in product graph: {}", .products.join(" -> "))]
    #[diagnostic(
        code(drydock::plan::cycle),
        help("Break the cycle by removing one of the declared dependencies")
    )]
    Cycle { products: Vec<String> },

    #[error("product `{product}` depends on `{dependency}`, which is not registered")]
    #[diagnostic(
        code(drydock::plan::missing_dependency),
        help("Register `{dependency}` or drop it from the dependencies of `{product}`")
    )]
    MissingDependency { product: String, dependency: String },

    #[error(
        "product `{product}` runs {product_block} but depends on `{dependency}`, which runs {dependency_block}"
    )]
    #[diagnostic(
        code(drydock::plan::phase_ordering),
        help("Move `{dependency}` into an earlier phase or `{product}` into a later one")
    )]
    PhaseOrdering {
        product: String,
        product_block: PhaseBlock,
        dependency: String,
        dependency_block: PhaseBlock,
    },

    #[error("product `{0}` is registered more than once")]
    #[diagnostic(code(drydock::registry::duplicate))]
    DuplicateProduct(String),

    #[error("unknown product `{name}`")]
    #[diagnostic(
        code(drydock::registry::unknown),
        help("Run `drydock products` to list the known products")
    )]
    UnknownProduct {
        name: String,
        suggestions: Vec<String>,
    },

    #[error("invalid build target `{0}`: expected `<platform>-<arch>`")]
    #[diagnostic(
        code(drydock::config::target),
        help("Targets look like `macosx-arm64` or `linux-x86_64`")
    )]
    InvalidTarget(String),

    #[error("unknown build variant `{0}`")]
    #[diagnostic(
        code(drydock::config::variant),
        help("Use one of Debug, Release, RelWithDebInfo, MinSizeRel")
    )]
    InvalidVariant(String),
}

impl ConfigurationError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.to_string());

        if let ConfigurationError::UnknownProduct { suggestions, .. } = self {
            if !suggestions.is_empty() {
                diag = diag.with_context(format!("did you mean: {}?", suggestions.join(", ")));
            }
        }

        if let Some(help) = MietteDiagnostic::help(self) {
            diag = diag.with_suggestion(help.to_string());
        }

        diag
    }
}

/// Error raised while planning or running a product phase.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("`{tool}` not found")]
    ToolNotFound { tool: String, hint: String },

    #[error("`{command}` failed with exit code {code:?}")]
    ToolFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("failed to run `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("filesystem error at {}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BuildError {
    /// Create a tool-not-found error with an installation hint.
    pub fn tool_not_found(tool: impl Into<String>, hint: impl Into<String>) -> Self {
        BuildError::ToolNotFound {
            tool: tool.into(),
            hint: hint.into(),
        }
    }

    /// Wrap an I/O error with the path it concerns.
    pub fn filesystem(path: impl AsRef<Path>, source: io::Error) -> Self {
        BuildError::Filesystem {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Whether this error was detected before any phase ran.
    pub fn is_configuration(&self) -> bool {
        matches!(self, BuildError::Configuration(_))
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            BuildError::Configuration(err) => err.to_diagnostic(),

            BuildError::ToolNotFound { tool, hint } => {
                Diagnostic::error(format!("`{}` not found", tool)).with_suggestion(hint.clone())
            }

            BuildError::ToolFailed {
                command,
                code,
                stderr,
            } => {
                let status = match code {
                    Some(code) => format!("exit code {}", code),
                    None => "terminated by signal".to_string(),
                };
                let mut diag = Diagnostic::error(format!("`{}` failed ({})", command, status));
                for line in stderr.lines().filter(|l| !l.trim().is_empty()).take(20) {
                    diag = diag.with_context(line.to_string());
                }
                diag.with_suggestion("Run with `--verbose` to see the full tool output")
            }

            BuildError::Spawn { command, source } => {
                Diagnostic::error(format!("failed to run `{}`", command))
                    .with_context(source.to_string())
            }

            BuildError::Filesystem { path, source } => {
                Diagnostic::error(format!("filesystem error: {}", source)).with_location(path)
            }
        }
    }
}
