//! Drydock - a dependency-ordered orchestrator for multi-product native builds
//!
//! Each build product (LLVM, Z3, Alive, ...) implements a small lifecycle
//! contract. Drydock orders the registered products into an execution plan
//! and drives their build, test and install phases once per target.

pub mod builder;
pub mod core;
pub mod ops;
pub mod planner;
pub mod products;
pub mod util;

/// Test doubles for products, legacy phases and SDK lookup.
#[cfg(test)]
pub mod test_support;

pub use core::{
    error::{BuildError, ConfigurationError},
    product::{Phase, PhaseBlock, Product},
    registry::ProductRegistry,
    target::BuildTarget,
    variant::BuildVariant,
};

pub use builder::BuildContext;
pub use planner::ExecutionPlan;
pub use util::context::GlobalContext;
