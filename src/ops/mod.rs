//! High-level operations.
//!
//! This module contains the implementation of Drydock commands.

pub mod drydock_build;

pub use drydock_build::{
    build, preview, BuildOptions, Orchestrator, PlannedStep, ProductRun, ProductState, RunError,
    RunReport,
};
