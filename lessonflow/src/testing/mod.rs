//! Testing utilities for lessonflow workflows.
//!
//! This module provides:
//! - Consistent sample lessons and stage results
//! - A scripted generation client
//! - Assertions over workflow state

mod assertions;
pub mod fixtures;
mod mocks;

pub use assertions::{
    assert_alignment_clean, assert_stage_cleared, assert_stage_status, assert_stage_succeeded,
};
pub use mocks::{Reply, ScriptedGenerationClient};
