//! Core domain enums for lessonflow.
//!
//! This module contains the small vocabulary shared by every other module:
//! - The three generation stages and their ordering
//! - Per-stage execution status
//! - Draft save status

mod status;

pub use status::{SaveStatus, StageKind, StageStatus};
