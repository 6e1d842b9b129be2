//! The staged generation workflow.
//!
//! This module provides:
//! - [`WorkflowState`] and its pure transition function
//! - [`WorkflowController`], which runs the stages against a
//!   [`GenerationClient`](crate::generation::GenerationClient)
//! - [`AlignmentReport`], the local check of the assessment's alignment claims

mod alignment;
mod controller;
#[cfg(test)]
mod controller_tests;
#[cfg(test)]
mod integration_tests;
mod state;

pub use alignment::{AlignmentPolicy, AlignmentReport, DanglingReference};
pub use controller::{ObjectivesStrategy, StageRun, WorkflowController};
pub use state::{ActiveRun, StageResult, StageSlot, WorkflowEvent, WorkflowState};
