//! The workflow controller.
//!
//! Owns the [`WorkflowState`] and drives the three generation stages. The
//! state lock is only taken inside synchronous helpers, so it is never held
//! across a generation call.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::{AlignmentPolicy, AlignmentReport, StageResult, WorkflowEvent, WorkflowState};
use crate::config::WorkflowConfig;
use crate::core::StageKind;
use crate::draft::DraftAutosaver;
use crate::errors::{EditPreconditionError, GenerationError, LessonflowError, ValidationError};
use crate::events::{
    EventSink, NoOpEventSink, RESULT_EDITED, STAGE_FAILED, STAGE_REJECTED, STAGE_STARTED,
    STAGE_SUCCEEDED,
};
use crate::export::{DocumentExporter, ExportBundle, ExportedDocument};
use crate::generation::{AssessmentRequest, FrameworkRequest, GenerationClient, ScenarioRequest};
use crate::model::{LessonInput, ObjectivesResult};
use crate::observability::StageTimer;
use crate::overlay::{self, FieldPath};

/// How stage 1 calls the generation service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectivesStrategy {
    /// One call returning objectives and framework.
    #[default]
    Combined,
    /// An objectives call, then a framework call fed with the objectives.
    Sequential,
}

impl fmt::Display for ObjectivesStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Combined => write!(f, "combined"),
            Self::Sequential => write!(f, "sequential"),
        }
    }
}

impl std::str::FromStr for ObjectivesStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "combined" => Ok(Self::Combined),
            "sequential" => Ok(Self::Sequential),
            other => Err(format!("unknown objectives strategy '{other}'")),
        }
    }
}

/// Outcome of triggering a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageRun {
    /// Another stage was running; nothing happened.
    Ignored {
        /// The stage that was running.
        running: StageKind,
    },
    /// The result was stored.
    Succeeded,
    /// The run failed; the stage is `Failed`.
    Failed {
        /// User-facing message.
        message: String,
    },
    /// The run finished after the workflow moved on (for instance a reset);
    /// its outcome was dropped.
    Discarded,
}

impl StageRun {
    /// Returns true if the result was stored.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// Inputs captured under the lock when a run starts.
enum StageInput {
    Objectives(LessonInput),
    Scenario(ScenarioRequest),
    Assessment {
        request: AssessmentRequest,
        lesson: LessonInput,
        objectives: Arc<ObjectivesResult>,
    },
}

/// Drives the staged generation of one lesson plan.
pub struct WorkflowController {
    client: Arc<dyn GenerationClient>,
    config: WorkflowConfig,
    state: Mutex<WorkflowState>,
    updates: watch::Sender<WorkflowState>,
    sink: Arc<dyn EventSink>,
    autosaver: Option<DraftAutosaver>,
}

impl fmt::Debug for WorkflowController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowController")
            .field("config", &self.config)
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

impl WorkflowController {
    /// Creates a controller over the default lesson.
    #[must_use]
    pub fn new(client: Arc<dyn GenerationClient>, config: WorkflowConfig) -> Self {
        let state = WorkflowState::default();
        Self {
            client,
            config,
            updates: watch::Sender::new(state.clone()),
            state: Mutex::new(state),
            sink: Arc::new(NoOpEventSink),
            autosaver: None,
        }
    }

    /// Starts from `lesson` instead of the default lesson.
    #[must_use]
    pub fn with_lesson(self, lesson: LessonInput) -> Self {
        self.replace_state(WorkflowState::new(lesson));
        self
    }

    /// Reports transitions to `sink`.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Persists every lesson edit through `autosaver`.
    #[must_use]
    pub fn with_autosaver(mut self, autosaver: DraftAutosaver) -> Self {
        self.autosaver = Some(autosaver);
        self
    }

    /// The draft autosaver, if one is attached.
    #[must_use]
    pub fn autosaver(&self) -> Option<&DraftAutosaver> {
        self.autosaver.as_ref()
    }

    /// The workflow configuration.
    #[must_use]
    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// A copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> WorkflowState {
        self.state.lock().clone()
    }

    /// Watches state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<WorkflowState> {
        self.updates.subscribe()
    }

    /// Replaces the state with a saved snapshot.
    ///
    /// A snapshot taken while a stage was running comes back with that stage
    /// `Failed`.
    pub fn restore(&self, snapshot: WorkflowState) {
        let recovered = snapshot.recovered();
        debug!(session_id = %recovered.session_id, "Restoring workflow state");
        self.replace_state(recovered);
    }

    /// Edits the lesson form. Stored results are kept.
    pub fn update_lesson(&self, edit: impl FnOnce(&mut LessonInput)) -> LessonInput {
        let lesson = {
            let mut state = self.state.lock();
            let mut lesson = state.lesson.clone();
            edit(&mut lesson);
            let next = state.apply(&WorkflowEvent::LessonEdited(lesson.clone()));
            self.commit(&mut state, next);
            lesson
        };
        if let Some(autosaver) = &self.autosaver {
            autosaver.notify(&lesson);
        }
        lesson
    }

    /// Clears every stage, restores the default lesson and removes the draft.
    ///
    /// A run still in flight finishes into [`StageRun::Discarded`].
    pub async fn reset(&self) {
        {
            let mut state = self.state.lock();
            let next = state.apply(&WorkflowEvent::Reset);
            self.commit(&mut state, next);
        }
        info!("Workflow reset");
        if let Some(autosaver) = &self.autosaver {
            autosaver.clear().await;
        }
    }

    /// Runs stage 1.
    pub async fn generate_objectives(&self) -> Result<StageRun, ValidationError> {
        self.run_stage(StageKind::Objectives).await
    }

    /// Runs stage 2.
    pub async fn generate_scenario(&self) -> Result<StageRun, ValidationError> {
        self.run_stage(StageKind::Scenario).await
    }

    /// Runs stage 3.
    pub async fn generate_assessment(&self) -> Result<StageRun, ValidationError> {
        self.run_stage(StageKind::Assessment).await
    }

    /// Runs `stage`.
    ///
    /// Returns `Ignored` without any effect while another stage is running.
    /// Fails with a [`ValidationError`] before any call when a prerequisite
    /// has not succeeded. Generation failures are not errors of this call:
    /// they leave the stage `Failed` and return [`StageRun::Failed`].
    pub async fn run_stage(&self, stage: StageKind) -> Result<StageRun, ValidationError> {
        let (run_id, input) = match self.begin(stage) {
            Ok(Some(started)) => started,
            Ok(None) => {
                let running = self.snapshot().running_stage().unwrap_or(stage);
                debug!(%stage, %running, "Stage trigger ignored while busy");
                return Ok(StageRun::Ignored { running });
            }
            Err(e) => {
                warn!(%stage, error = %e, "Stage trigger rejected");
                self.sink
                    .emit(
                        STAGE_REJECTED,
                        Some(serde_json::json!({ "stage": stage, "reason": e.to_string() })),
                    )
                    .await;
                return Err(e);
            }
        };

        self.sink
            .emit(
                STAGE_STARTED,
                Some(serde_json::json!({ "stage": stage, "run_id": run_id })),
            )
            .await;
        let timer = StageTimer::start();

        match self.execute(input).await {
            Ok((result, alignment)) => {
                let applied = self.complete(run_id, result, alignment);
                if !applied {
                    info!(%stage, %run_id, "Discarding result of a superseded run");
                    return Ok(StageRun::Discarded);
                }
                info!(%stage, %run_id, duration_ms = timer.elapsed_ms(), "Stage succeeded");
                self.sink
                    .emit(
                        STAGE_SUCCEEDED,
                        Some(serde_json::json!({
                            "stage": stage,
                            "run_id": run_id,
                            "duration_ms": timer.elapsed_ms(),
                        })),
                    )
                    .await;
                Ok(StageRun::Succeeded)
            }
            Err(e) => {
                let message = stage.failure_message().to_string();
                let applied = self.fail(run_id, message.clone());
                if !applied {
                    info!(%stage, %run_id, error = %e, "Discarding failure of a superseded run");
                    return Ok(StageRun::Discarded);
                }
                error!(%stage, %run_id, error = %e, "Stage failed");
                self.sink
                    .emit(
                        STAGE_FAILED,
                        Some(serde_json::json!({
                            "stage": stage,
                            "run_id": run_id,
                            "error": e.to_string(),
                        })),
                    )
                    .await;
                Ok(StageRun::Failed { message })
            }
        }
    }

    /// Replaces the description of one learning objective.
    pub fn edit_objective(&self, id: &str, text: &str) -> Result<(), EditPreconditionError> {
        let objectives = self
            .snapshot()
            .objectives
            .result
            .ok_or(EditPreconditionError::NoResult(StageKind::Objectives))?;
        let edited = overlay::replace_objective(&objectives, id, text)?;
        let path = format!("tujuan_pembelajaran[id={id}].deskripsi");
        self.publish_edit(
            &StageResult::Objectives(objectives),
            StageResult::Objectives(Arc::new(edited)),
            &path,
        )
    }

    /// Replaces the text leaf at `path` in the result of `stage`.
    pub fn edit_result(
        &self,
        stage: StageKind,
        path: &FieldPath,
        value: &str,
    ) -> Result<(), EditPreconditionError> {
        let base = self
            .snapshot()
            .result(stage)
            .ok_or(EditPreconditionError::NoResult(stage))?;
        self.edit_from(base, path, value)
    }

    /// Edits `base` and publishes the result if `base` is still the stored
    /// value of its stage.
    pub(super) fn edit_from(
        &self,
        base: StageResult,
        path: &FieldPath,
        value: &str,
    ) -> Result<(), EditPreconditionError> {
        let edited = match &base {
            StageResult::Objectives(r) => {
                StageResult::Objectives(Arc::new(overlay::apply_edit(&**r, path, value)?))
            }
            StageResult::Scenario(r) => {
                StageResult::Scenario(Arc::new(overlay::apply_edit(&**r, path, value)?))
            }
            StageResult::Assessment(r) => {
                StageResult::Assessment(Arc::new(overlay::apply_edit(&**r, path, value)?))
            }
        };
        self.publish_edit(&base, edited, &path.to_string())
    }

    /// Everything the exporter needs, or the list of missing stages.
    pub fn export_bundle(&self) -> Result<ExportBundle, ValidationError> {
        let mut state = self.state.lock();
        if let (Some(objectives), Some(scenario), Some(assessment)) = (
            state.objectives.result.clone(),
            state.scenario.result.clone(),
            state.assessment.result.clone(),
        ) {
            return Ok(ExportBundle::new(
                state.lesson.clone(),
                objectives,
                scenario,
                assessment,
            ));
        }

        let err = ValidationError::IncompleteExport {
            missing: state.missing_for_export(),
        };
        let next = state.apply(&WorkflowEvent::Rejected {
            message: err.user_message(),
        });
        self.commit(&mut state, next);
        drop(state);

        warn!(error = %err, "Export rejected");
        self.sink.try_emit(
            STAGE_REJECTED,
            Some(serde_json::json!({ "action": "export", "reason": err.to_string() })),
        );
        Err(err)
    }

    /// Builds the document with `exporter`.
    ///
    /// The exporter is not called unless every stage has a result.
    pub fn export_with(
        &self,
        exporter: &dyn DocumentExporter,
    ) -> Result<ExportedDocument, LessonflowError> {
        let bundle = self.export_bundle()?;
        let document = exporter.export(&bundle)?;
        info!(filename = %document.filename, bytes = document.bytes.len(), "Document exported");
        Ok(document)
    }

    fn begin(&self, stage: StageKind) -> Result<Option<(Uuid, StageInput)>, ValidationError> {
        let mut state = self.state.lock();
        if state.is_busy() {
            return Ok(None);
        }

        if let Err(e) = state.check_can_run(stage) {
            let next = state.apply(&WorkflowEvent::Rejected {
                message: e.user_message(),
            });
            self.commit(&mut state, next);
            return Err(e);
        }

        let input = match stage {
            StageKind::Objectives => StageInput::Objectives(state.lesson.clone()),
            StageKind::Scenario => {
                let objectives = state
                    .objectives
                    .result
                    .clone()
                    .ok_or(ValidationError::StageBlocked {
                        stage,
                        requires: StageKind::Objectives,
                    })?;
                StageInput::Scenario(ScenarioRequest::new(&state.lesson, &objectives))
            }
            StageKind::Assessment => {
                let blocked = |requires| ValidationError::StageBlocked { stage, requires };
                let objectives = state
                    .objectives
                    .result
                    .clone()
                    .ok_or_else(|| blocked(StageKind::Objectives))?;
                let scenario = state
                    .scenario
                    .result
                    .clone()
                    .ok_or_else(|| blocked(StageKind::Scenario))?;
                StageInput::Assessment {
                    request: AssessmentRequest::new(&state.lesson, &objectives, &scenario),
                    lesson: state.lesson.clone(),
                    objectives,
                }
            }
        };

        let run_id = Uuid::new_v4();
        let next = state.apply(&WorkflowEvent::StageStarted { stage, run_id });
        self.commit(&mut state, next);
        debug!(%stage, %run_id, "Stage started");
        Ok(Some((run_id, input)))
    }

    async fn execute(
        &self,
        input: StageInput,
    ) -> Result<(StageResult, Option<AlignmentReport>), GenerationError> {
        match input {
            StageInput::Objectives(lesson) => {
                let result = match self.config.objectives_strategy {
                    ObjectivesStrategy::Combined => {
                        self.client.objectives_with_framework(&lesson).await?
                    }
                    ObjectivesStrategy::Sequential => {
                        let draft = self.client.objectives(&lesson).await?;
                        let framework = self
                            .client
                            .framework(&FrameworkRequest::new(&lesson, &draft))
                            .await?;
                        draft.with_framework(framework)
                    }
                };
                Ok((StageResult::Objectives(Arc::new(result)), None))
            }
            StageInput::Scenario(request) => {
                let result = self.client.scenario(&request).await?;
                Ok((StageResult::Scenario(Arc::new(result)), None))
            }
            StageInput::Assessment {
                request,
                lesson,
                objectives,
            } => {
                let package = self.client.assessment(&request).await?;
                let report = AlignmentReport::check(&lesson, &objectives, &package);
                if !report.is_clean() {
                    warn!(
                        dangling_objectives = ?report.dangling_ids(),
                        unselected_tags = report.unselected_tags.len(),
                        "Assessment alignment has dangling references"
                    );
                    if self.config.alignment == AlignmentPolicy::Reject
                        && !report.dangling_objectives.is_empty()
                    {
                        return Err(GenerationError::Misaligned {
                            ids: report.dangling_ids(),
                        });
                    }
                }
                Ok((StageResult::Assessment(Arc::new(package)), Some(report)))
            }
        }
    }

    /// Returns false if the run was no longer active.
    fn complete(
        &self,
        run_id: Uuid,
        result: StageResult,
        alignment: Option<AlignmentReport>,
    ) -> bool {
        let mut state = self.state.lock();
        if state.active_run.map(|run| run.run_id) != Some(run_id) {
            return false;
        }
        let next = state.apply(&WorkflowEvent::StageCompleted {
            run_id,
            result,
            alignment,
        });
        self.commit(&mut state, next);
        true
    }

    /// Returns false if the run was no longer active.
    fn fail(&self, run_id: Uuid, message: String) -> bool {
        let mut state = self.state.lock();
        if state.active_run.map(|run| run.run_id) != Some(run_id) {
            return false;
        }
        let next = state.apply(&WorkflowEvent::StageFailed { run_id, message });
        self.commit(&mut state, next);
        true
    }

    fn publish_edit(
        &self,
        base: &StageResult,
        edited: StageResult,
        path: &str,
    ) -> Result<(), EditPreconditionError> {
        let stage = edited.kind();
        {
            let mut state = self.state.lock();
            match state.result(stage) {
                None => return Err(EditPreconditionError::NoResult(stage)),
                Some(current) if !current.is_same(base) => {
                    return Err(EditPreconditionError::Superseded(stage));
                }
                Some(_) => {}
            }
            let next = state.apply(&WorkflowEvent::ResultEdited(edited));
            self.commit(&mut state, next);
        }
        debug!(%stage, path, "Result edited");
        self.sink.try_emit(
            RESULT_EDITED,
            Some(serde_json::json!({ "stage": stage, "path": path })),
        );
        Ok(())
    }

    fn replace_state(&self, next: WorkflowState) {
        let mut state = self.state.lock();
        self.commit(&mut state, next);
    }

    fn commit(&self, state: &mut WorkflowState, next: WorkflowState) {
        *state = next;
        self.updates.send_replace(state.clone());
    }
}
