//! Test assertions for workflow state.

use crate::core::{StageKind, StageStatus};
use crate::workflow::WorkflowState;

/// Asserts that `stage` has the expected status.
pub fn assert_stage_status(state: &WorkflowState, stage: StageKind, expected: StageStatus) {
    let actual = state.status(stage);
    assert_eq!(
        actual, expected,
        "Expected {stage} to be {expected:?}, got {actual:?}"
    );
}

/// Asserts that `stage` succeeded and holds a result.
pub fn assert_stage_succeeded(state: &WorkflowState, stage: StageKind) {
    assert_stage_status(state, stage, StageStatus::Succeeded);
    assert!(
        state.result(stage).is_some(),
        "Expected {stage} to hold a result"
    );
}

/// Asserts that `stage` is back to not started with no result.
pub fn assert_stage_cleared(state: &WorkflowState, stage: StageKind) {
    assert_stage_status(state, stage, StageStatus::NotStarted);
    assert!(
        state.result(stage).is_none(),
        "Expected {stage} to hold no result"
    );
}

/// Asserts that the last assessment left no dangling references.
pub fn assert_alignment_clean(state: &WorkflowState) {
    match &state.alignment {
        Some(report) => assert!(report.is_clean(), "Dangling alignment: {report:?}"),
        None => panic!("Expected an alignment report, found none"),
    }
}
