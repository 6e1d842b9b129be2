//! Stage output contracts.
//!
//! This module provides:
//! - Typed parsing of raw generated text into stage payloads
//! - The response schemas sent to the generation service

mod schema;
mod typed_output;

pub use schema::{
    assessment_schema, framework_schema, objectives_draft_schema, objectives_schema,
    scenario_schema,
};
pub use typed_output::{strip_code_fence, SchemaError, TypedPayload};
