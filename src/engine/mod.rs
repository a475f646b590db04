//! Execution engine

pub mod plan;
pub mod runner;

pub use plan::ExecutionPlan;
pub use runner::{RunSummary, Runner};
