//! Execution planning: turning registered products into an ordered plan.

pub mod plan;

pub use plan::{ExecutionPlan, PlannedProduct};
