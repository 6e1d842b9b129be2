//! Workflow state and its transition function.
//!
//! [`WorkflowState::apply`] is the only way the state changes. It never
//! fails: events that do not fit the current state (a completion for a run
//! that is no longer active, a start while busy) leave the state as it is.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::AlignmentReport;
use crate::core::{StageKind, StageStatus};
use crate::errors::ValidationError;
use crate::model::{AssessmentPackage, LessonInput, ObjectivesResult, ScenarioResult};

/// Status and result of one stage.
///
/// A re-run keeps the previous result while it is running and after it
/// fails; only a success replaces it. Objectives is the exception: starting
/// it drops everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSlot<T> {
    /// Current status.
    pub status: StageStatus,
    /// The stored result.
    pub result: Option<Arc<T>>,
}

impl<T> Default for StageSlot<T> {
    fn default() -> Self {
        Self {
            status: StageStatus::NotStarted,
            result: None,
        }
    }
}

impl<T> StageSlot<T> {
    fn set_status(&mut self, status: StageStatus) {
        self.status = status;
    }

    fn succeeded(result: Arc<T>) -> Self {
        Self {
            status: StageStatus::Succeeded,
            result: Some(result),
        }
    }
}

/// A stage payload, shared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", content = "result", rename_all = "snake_case")]
pub enum StageResult {
    /// Stage 1.
    Objectives(Arc<ObjectivesResult>),
    /// Stage 2.
    Scenario(Arc<ScenarioResult>),
    /// Stage 3.
    Assessment(Arc<AssessmentPackage>),
}

impl StageResult {
    /// The stage this result belongs to.
    #[must_use]
    pub fn kind(&self) -> StageKind {
        match self {
            Self::Objectives(_) => StageKind::Objectives,
            Self::Scenario(_) => StageKind::Scenario,
            Self::Assessment(_) => StageKind::Assessment,
        }
    }

    /// Returns true if both point at the same stored value.
    #[must_use]
    pub fn is_same(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Objectives(a), Self::Objectives(b)) => Arc::ptr_eq(a, b),
            (Self::Scenario(a), Self::Scenario(b)) => Arc::ptr_eq(a, b),
            (Self::Assessment(a), Self::Assessment(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// The run currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveRun {
    /// Running stage.
    pub stage: StageKind,
    /// Id of the run.
    pub run_id: Uuid,
}

/// Everything that can happen to the workflow.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowEvent {
    /// The lesson form changed. Stored results are kept.
    LessonEdited(LessonInput),
    /// A stage run began.
    StageStarted {
        /// Stage being run.
        stage: StageKind,
        /// Id of the new run.
        run_id: Uuid,
    },
    /// A run produced a result.
    StageCompleted {
        /// Id of the run.
        run_id: Uuid,
        /// The result.
        result: StageResult,
        /// Alignment report, for assessment runs.
        alignment: Option<AlignmentReport>,
    },
    /// A run failed.
    StageFailed {
        /// Id of the run.
        run_id: Uuid,
        /// User-facing message.
        message: String,
    },
    /// A trigger was refused before any call.
    Rejected {
        /// User-facing message.
        message: String,
    },
    /// A stored result was replaced by an edited copy.
    ResultEdited(StageResult),
    /// Back to the default lesson with every stage cleared.
    Reset,
}

/// The state of one authoring session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowState {
    /// Session id.
    pub session_id: Uuid,
    /// The lesson form.
    pub lesson: LessonInput,
    /// Stage 1.
    pub objectives: StageSlot<ObjectivesResult>,
    /// Stage 2.
    pub scenario: StageSlot<ScenarioResult>,
    /// Stage 3.
    pub assessment: StageSlot<AssessmentPackage>,
    /// Alignment report of the stored assessment.
    pub alignment: Option<AlignmentReport>,
    /// Message of the last failure or refusal.
    pub error: Option<String>,
    /// The run in flight, if any.
    pub active_run: Option<ActiveRun>,
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::new(LessonInput::default())
    }
}

impl WorkflowState {
    /// A fresh state for `lesson`.
    #[must_use]
    pub fn new(lesson: LessonInput) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            lesson,
            objectives: StageSlot::default(),
            scenario: StageSlot::default(),
            assessment: StageSlot::default(),
            alignment: None,
            error: None,
            active_run: None,
        }
    }

    /// Status of a stage.
    #[must_use]
    pub fn status(&self, stage: StageKind) -> StageStatus {
        match stage {
            StageKind::Objectives => self.objectives.status,
            StageKind::Scenario => self.scenario.status,
            StageKind::Assessment => self.assessment.status,
        }
    }

    /// Stored result of a stage.
    #[must_use]
    pub fn result(&self, stage: StageKind) -> Option<StageResult> {
        match stage {
            StageKind::Objectives => self.objectives.result.clone().map(StageResult::Objectives),
            StageKind::Scenario => self.scenario.result.clone().map(StageResult::Scenario),
            StageKind::Assessment => self.assessment.result.clone().map(StageResult::Assessment),
        }
    }

    /// Returns true while a stage is running.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.active_run.is_some()
    }

    /// The running stage, if any.
    #[must_use]
    pub fn running_stage(&self) -> Option<StageKind> {
        self.active_run.map(|run| run.stage)
    }

    /// Checks the preconditions of running `stage`, ignoring the busy rule.
    pub fn check_can_run(&self, stage: StageKind) -> Result<(), ValidationError> {
        if stage == StageKind::Objectives {
            return self.lesson.validate();
        }
        match stage
            .prerequisites()
            .iter()
            .find(|p| !self.status(**p).is_success())
        {
            Some(requires) => Err(ValidationError::StageBlocked {
                stage,
                requires: *requires,
            }),
            None => Ok(()),
        }
    }

    /// Stages whose result is missing for export.
    #[must_use]
    pub fn missing_for_export(&self) -> Vec<StageKind> {
        StageKind::ALL
            .into_iter()
            .filter(|s| self.result(*s).is_none())
            .collect()
    }

    /// Applies `event` and returns the next state.
    #[must_use]
    pub fn apply(&self, event: &WorkflowEvent) -> Self {
        let mut next = self.clone();
        match event {
            WorkflowEvent::LessonEdited(lesson) => {
                next.lesson = lesson.clone();
                next.refresh_alignment();
            }
            WorkflowEvent::StageStarted { stage, run_id } => {
                if self.is_busy() || self.check_can_run(*stage).is_err() {
                    return next;
                }
                if *stage == StageKind::Objectives {
                    next.clear_stage(*stage);
                }
                for downstream in stage.downstream() {
                    next.clear_stage(*downstream);
                }
                next.set_status(*stage, StageStatus::Running);
                next.error = None;
                next.active_run = Some(ActiveRun {
                    stage: *stage,
                    run_id: *run_id,
                });
            }
            WorkflowEvent::StageCompleted {
                run_id,
                result,
                alignment,
            } => {
                let Some(active) = self.active_run else {
                    return next;
                };
                if active.run_id != *run_id || active.stage != result.kind() {
                    return next;
                }
                match result {
                    StageResult::Objectives(r) => next.objectives = StageSlot::succeeded(Arc::clone(r)),
                    StageResult::Scenario(r) => next.scenario = StageSlot::succeeded(Arc::clone(r)),
                    StageResult::Assessment(r) => {
                        next.assessment = StageSlot::succeeded(Arc::clone(r));
                        next.alignment = alignment.clone();
                    }
                }
                next.active_run = None;
            }
            WorkflowEvent::StageFailed { run_id, message } => {
                let Some(active) = self.active_run else {
                    return next;
                };
                if active.run_id != *run_id {
                    return next;
                }
                next.mark_failed(active.stage, message.clone());
            }
            WorkflowEvent::Rejected { message } => {
                next.error = Some(message.clone());
            }
            WorkflowEvent::ResultEdited(result) => {
                if self.result(result.kind()).is_none() {
                    return next;
                }
                match result {
                    StageResult::Objectives(r) => next.objectives.result = Some(Arc::clone(r)),
                    StageResult::Scenario(r) => next.scenario.result = Some(Arc::clone(r)),
                    StageResult::Assessment(r) => next.assessment.result = Some(Arc::clone(r)),
                }
                next.refresh_alignment();
            }
            WorkflowEvent::Reset => {
                next = Self {
                    session_id: self.session_id,
                    ..Self::default()
                };
            }
        }
        next
    }

    /// A state captured mid-run comes back with the running stage failed.
    #[must_use]
    pub fn recovered(mut self) -> Self {
        if let Some(active) = self.active_run {
            self.mark_failed(active.stage, active.stage.failure_message().to_string());
        }
        self
    }

    fn mark_failed(&mut self, stage: StageKind, message: String) {
        self.set_status(stage, StageStatus::Failed);
        self.error = Some(message);
        self.active_run = None;
    }

    fn set_status(&mut self, stage: StageKind, status: StageStatus) {
        match stage {
            StageKind::Objectives => self.objectives.set_status(status),
            StageKind::Scenario => self.scenario.set_status(status),
            StageKind::Assessment => self.assessment.set_status(status),
        }
    }

    fn clear_stage(&mut self, stage: StageKind) {
        match stage {
            StageKind::Objectives => self.objectives = StageSlot::default(),
            StageKind::Scenario => self.scenario = StageSlot::default(),
            StageKind::Assessment => {
                self.assessment = StageSlot::default();
                self.alignment = None;
            }
        }
    }

    fn refresh_alignment(&mut self) {
        self.alignment = match (&self.objectives.result, &self.assessment.result) {
            (Some(objectives), Some(assessment)) => {
                Some(AlignmentReport::check(&self.lesson, objectives, assessment))
            }
            _ => None,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TagCategory;
    use crate::testing::fixtures;
    use pretty_assertions::assert_eq;

    fn started(state: &WorkflowState, stage: StageKind) -> (WorkflowState, Uuid) {
        let run_id = Uuid::new_v4();
        (state.apply(&WorkflowEvent::StageStarted { stage, run_id }), run_id)
    }

    fn completed(state: &WorkflowState, run_id: Uuid, result: StageResult) -> WorkflowState {
        state.apply(&WorkflowEvent::StageCompleted {
            run_id,
            result,
            alignment: None,
        })
    }

    fn objectives_result() -> StageResult {
        StageResult::Objectives(Arc::new(fixtures::sample_objectives()))
    }

    fn scenario_result() -> StageResult {
        StageResult::Scenario(Arc::new(fixtures::sample_scenario()))
    }

    fn assessment_result() -> StageResult {
        StageResult::Assessment(Arc::new(fixtures::sample_assessment()))
    }

    fn fully_generated() -> WorkflowState {
        let state = WorkflowState::new(fixtures::zakat_lesson());
        let (state, run) = started(&state, StageKind::Objectives);
        let state = completed(&state, run, objectives_result());
        let (state, run) = started(&state, StageKind::Scenario);
        let state = completed(&state, run, scenario_result());
        let (state, run) = started(&state, StageKind::Assessment);
        completed(&state, run, assessment_result())
    }

    #[test]
    fn test_start_marks_running() {
        let state = WorkflowState::new(fixtures::zakat_lesson());
        let (next, run_id) = started(&state, StageKind::Objectives);

        assert_eq!(next.status(StageKind::Objectives), StageStatus::Running);
        assert_eq!(next.running_stage(), Some(StageKind::Objectives));
        assert_eq!(next.active_run.map(|r| r.run_id), Some(run_id));
        // the previous value is untouched
        assert_eq!(state.status(StageKind::Objectives), StageStatus::NotStarted);
    }

    #[test]
    fn test_rerun_clears_downstream() {
        let state = fully_generated();
        assert!(state.missing_for_export().is_empty());

        let (next, _) = started(&state, StageKind::Objectives);
        assert_eq!(next.status(StageKind::Objectives), StageStatus::Running);
        assert_eq!(next.objectives.result, None);
        assert_eq!(next.scenario, StageSlot::default());
        assert_eq!(next.assessment, StageSlot::default());
        assert_eq!(next.alignment, None);

        let (next, _) = started(&state, StageKind::Scenario);
        assert!(next.objectives.result.is_some());
        assert_eq!(next.status(StageKind::Scenario), StageStatus::Running);
        assert_eq!(next.assessment, StageSlot::default());
    }

    #[test]
    fn test_start_while_busy_is_ignored() {
        let state = WorkflowState::new(fixtures::zakat_lesson());
        let (busy, run_id) = started(&state, StageKind::Objectives);
        let (again, _) = started(&busy, StageKind::Objectives);
        assert_eq!(again, busy);
        assert_eq!(again.active_run.map(|r| r.run_id), Some(run_id));
    }

    #[test]
    fn test_blocked_start_is_ignored() {
        let state = WorkflowState::new(fixtures::zakat_lesson());
        assert_eq!(
            state.check_can_run(StageKind::Assessment),
            Err(ValidationError::StageBlocked {
                stage: StageKind::Assessment,
                requires: StageKind::Objectives,
            })
        );
        let (next, _) = started(&state, StageKind::Scenario);
        assert_eq!(next, state);
    }

    #[test]
    fn test_stale_completion_is_discarded() {
        let state = WorkflowState::new(fixtures::zakat_lesson());
        let (running, run_id) = started(&state, StageKind::Objectives);

        let other = completed(&running, Uuid::new_v4(), objectives_result());
        assert_eq!(other, running);

        let wrong_stage = completed(&running, run_id, scenario_result());
        assert_eq!(wrong_stage, running);

        let reset = running.apply(&WorkflowEvent::Reset);
        let late = completed(&reset, run_id, objectives_result());
        assert_eq!(late, reset);
        assert_eq!(late.session_id, state.session_id);
        assert_eq!(late.lesson, LessonInput::default());
    }

    #[test]
    fn test_rerun_keeps_previous_result_until_success() {
        let state = fully_generated();
        let previous = state.assessment.result.clone();

        let (running, run) = started(&state, StageKind::Assessment);
        assert_eq!(running.status(StageKind::Assessment), StageStatus::Running);
        assert_eq!(running.assessment.result, previous);

        let failed = running.apply(&WorkflowEvent::StageFailed {
            run_id: run,
            message: StageKind::Assessment.failure_message().to_string(),
        });
        assert_eq!(failed.status(StageKind::Assessment), StageStatus::Failed);
        assert_eq!(failed.assessment.result, previous);
        assert!(failed.missing_for_export().is_empty());

        let (running, run) = started(&failed, StageKind::Assessment);
        let mut replacement = fixtures::sample_assessment();
        replacement.asesmen_formatif.instrumen = "Lembar observasi baru".to_string();
        let done = completed(
            &running,
            run,
            StageResult::Assessment(Arc::new(replacement.clone())),
        );
        assert_eq!(done.status(StageKind::Assessment), StageStatus::Succeeded);
        assert_eq!(done.assessment.result.as_deref(), Some(&replacement));
    }

    #[test]
    fn test_objectives_rerun_drops_own_result() {
        let state = fully_generated();
        let (running, run) = started(&state, StageKind::Objectives);
        let failed = running.apply(&WorkflowEvent::StageFailed {
            run_id: run,
            message: StageKind::Objectives.failure_message().to_string(),
        });
        assert_eq!(failed.objectives.result, None);
        assert_eq!(
            failed.missing_for_export(),
            [StageKind::Objectives, StageKind::Scenario, StageKind::Assessment]
        );
    }

    #[test]
    fn test_failure_keeps_upstream() {
        let state = WorkflowState::new(fixtures::zakat_lesson());
        let (state, run) = started(&state, StageKind::Objectives);
        let state = completed(&state, run, objectives_result());
        let (state, run) = started(&state, StageKind::Scenario);
        let state = state.apply(&WorkflowEvent::StageFailed {
            run_id: run,
            message: StageKind::Scenario.failure_message().to_string(),
        });

        assert_eq!(state.status(StageKind::Objectives), StageStatus::Succeeded);
        assert_eq!(state.status(StageKind::Scenario), StageStatus::Failed);
        assert_eq!(state.scenario.result, None);
        assert!(!state.is_busy());
        assert_eq!(
            state.error.as_deref(),
            Some("Gagal menghasilkan Skenario Kegiatan. Silakan coba lagi.")
        );
    }

    #[test]
    fn test_result_edit_requires_result() {
        let state = WorkflowState::new(fixtures::zakat_lesson());
        let edited = state.apply(&WorkflowEvent::ResultEdited(scenario_result()));
        assert_eq!(edited, state);

        let state = fully_generated();
        let mut scenario = fixtures::sample_scenario();
        scenario.kegiatan_penutup.refleksi = "X".to_string();
        let edited = state.apply(&WorkflowEvent::ResultEdited(StageResult::Scenario(Arc::new(
            scenario,
        ))));
        assert_eq!(
            edited.scenario.result.as_ref().map(|s| s.kegiatan_penutup.refleksi.as_str()),
            Some("X")
        );
        assert_eq!(edited.status(StageKind::Assessment), StageStatus::Succeeded);
    }

    #[test]
    fn test_lesson_edit_keeps_results() {
        let state = fully_generated();
        let mut lesson = state.lesson.clone();
        lesson.topik = "Zakat Fitrah".to_string();
        let next = state.apply(&WorkflowEvent::LessonEdited(lesson));
        assert_eq!(next.lesson.topik, "Zakat Fitrah");
        assert!(next.missing_for_export().is_empty());
    }

    #[test]
    fn test_lesson_edit_refreshes_alignment() {
        let state = fully_generated();
        let mut lesson = state.lesson.clone();
        assert!(!lesson.toggle_tag(TagCategory::Dpl, "Kolaborasi"));

        let next = state.apply(&WorkflowEvent::LessonEdited(lesson));
        let report = next.alignment.unwrap();
        assert!(report.dangling_objectives.is_empty());
        assert_eq!(
            report
                .unselected_tags
                .iter()
                .map(|d| d.reference.as_str())
                .collect::<Vec<_>>(),
            ["Kolaborasi"]
        );
    }

    #[test]
    fn test_recovered_snapshot_fails_running_stage() {
        let state = fully_generated();
        let (running, _) = started(&state, StageKind::Assessment);
        let recovered = running.recovered();
        assert_eq!(recovered.status(StageKind::Assessment), StageStatus::Failed);
        assert_eq!(recovered.status(StageKind::Scenario), StageStatus::Succeeded);
        assert!(!recovered.is_busy());
        assert_eq!(
            recovered.error.as_deref(),
            Some(StageKind::Assessment.failure_message())
        );
    }

    #[test]
    fn test_state_serde_roundtrip() {
        let state = fully_generated();
        let json = serde_json::to_string(&state).unwrap();
        let back: WorkflowState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
