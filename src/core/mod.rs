//! Core types: products, targets, variants and the error taxonomy.

pub mod error;
pub mod product;
pub mod registry;
pub mod target;
pub mod variant;

pub use error::{BuildError, ConfigurationError};
pub use product::{Phase, PhaseBlock, Product};
pub use registry::ProductRegistry;
pub use target::BuildTarget;
pub use variant::BuildVariant;
