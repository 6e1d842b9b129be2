#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Semaphore;

    use crate::config::WorkflowConfig;
    use crate::core::{SaveStatus, StageKind, StageStatus};
    use crate::draft::{DraftAutosaver, DraftStore, MemoryStorage, DRAFT_KEY};
    use crate::errors::{EditPreconditionError, LessonflowError, ValidationError};
    use crate::events::{
        CollectingEventSink, NoOpEventSink, RESULT_EDITED, STAGE_FAILED, STAGE_REJECTED,
        STAGE_STARTED, STAGE_SUCCEEDED,
    };
    use crate::export::{ExportedDocument, MockDocumentExporter};
    use crate::generation::MockGenerationClient;
    use crate::model::LessonInput;
    use crate::overlay::FieldPath;
    use crate::testing::{
        assert_alignment_clean, assert_stage_cleared, assert_stage_status, assert_stage_succeeded,
        fixtures, Reply, ScriptedGenerationClient,
    };
    use crate::workflow::{AlignmentPolicy, ObjectivesStrategy, StageRun, WorkflowController};

    fn controller(client: Arc<ScriptedGenerationClient>) -> WorkflowController {
        WorkflowController::new(client, WorkflowConfig::default())
            .with_lesson(fixtures::zakat_lesson())
    }

    async fn run_all(controller: &WorkflowController) {
        for stage in StageKind::ALL {
            let run = controller.run_stage(stage).await.unwrap();
            assert_eq!(run, StageRun::Succeeded, "{stage}");
        }
    }

    #[tokio::test]
    async fn test_scenario_blocked_without_objectives() {
        let mut client = MockGenerationClient::new();
        client.expect_scenario().never();
        client.expect_objectives_with_framework().never();
        let controller = WorkflowController::new(Arc::new(client), WorkflowConfig::default())
            .with_lesson(fixtures::zakat_lesson());

        let err = controller.generate_scenario().await.unwrap_err();

        assert_eq!(
            err,
            ValidationError::StageBlocked {
                stage: StageKind::Scenario,
                requires: StageKind::Objectives,
            }
        );
        let state = controller.snapshot();
        assert_stage_cleared(&state, StageKind::Scenario);
        assert_stage_cleared(&state, StageKind::Objectives);
        assert_eq!(
            state.error.as_deref(),
            Some("Harap hasilkan Tujuan Pembelajaran terlebih dahulu.")
        );
    }

    #[tokio::test]
    async fn test_assessment_blocked_names_missing_scenario() {
        let client = Arc::new(ScriptedGenerationClient::new());
        let controller = controller(Arc::clone(&client));
        controller.generate_objectives().await.unwrap();

        let err = controller.generate_assessment().await.unwrap_err();

        assert_eq!(
            err,
            ValidationError::StageBlocked {
                stage: StageKind::Assessment,
                requires: StageKind::Scenario,
            }
        );
        assert_eq!(client.call_count("assessment"), 0);
        assert_stage_succeeded(&controller.snapshot(), StageKind::Objectives);
    }

    #[tokio::test]
    async fn test_invalid_lesson_blocks_objectives() {
        let mut client = MockGenerationClient::new();
        client.expect_objectives_with_framework().never();
        let controller = WorkflowController::new(Arc::new(client), WorkflowConfig::default());
        controller.update_lesson(|lesson| lesson.mapel = "  ".to_string());

        let err = controller.generate_objectives().await.unwrap_err();

        assert!(matches!(err, ValidationError::InvalidLesson { field: "mapel", .. }));
        assert_stage_status(&controller.snapshot(), StageKind::Objectives, StageStatus::NotStarted);
    }

    #[tokio::test]
    async fn test_mock_client_receives_lesson() {
        let mut client = MockGenerationClient::new();
        client
            .expect_objectives_with_framework()
            .withf(|lesson: &LessonInput| lesson.topik == "Zakat")
            .times(1)
            .returning(|_| Ok(fixtures::sample_objectives()));
        let controller = WorkflowController::new(Arc::new(client), WorkflowConfig::default())
            .with_lesson(fixtures::zakat_lesson());

        tokio_test::assert_ok!(controller.generate_objectives().await);
        assert_stage_succeeded(&controller.snapshot(), StageKind::Objectives);
    }

    #[tokio::test]
    async fn test_rerun_objectives_resets_downstream() {
        let client = Arc::new(ScriptedGenerationClient::new());
        let controller = controller(Arc::clone(&client));
        run_all(&controller).await;
        assert_alignment_clean(&controller.snapshot());

        let run = controller.generate_objectives().await.unwrap();

        assert_eq!(run, StageRun::Succeeded);
        let state = controller.snapshot();
        assert_stage_succeeded(&state, StageKind::Objectives);
        assert_stage_cleared(&state, StageKind::Scenario);
        assert_stage_cleared(&state, StageKind::Assessment);
        assert_eq!(client.call_count("objectives_with_framework"), 2);
    }

    #[tokio::test]
    async fn test_rerun_scenario_keeps_objectives() {
        let client = Arc::new(ScriptedGenerationClient::new());
        let controller = controller(Arc::clone(&client));
        run_all(&controller).await;
        let objectives_before = controller.snapshot().objectives.result;

        controller.generate_scenario().await.unwrap();

        let state = controller.snapshot();
        assert_stage_succeeded(&state, StageKind::Scenario);
        assert_stage_cleared(&state, StageKind::Assessment);
        assert!(Arc::ptr_eq(
            state.objectives.result.as_ref().unwrap(),
            objectives_before.as_ref().unwrap()
        ));
    }

    #[tokio::test]
    async fn test_trigger_while_running_is_ignored() {
        let gate = Arc::new(Semaphore::new(0));
        let client = Arc::new(ScriptedGenerationClient::new().with_gate(Arc::clone(&gate)));
        let controller = Arc::new(controller(Arc::clone(&client)));
        let mut updates = controller.subscribe();

        let running = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.generate_objectives().await })
        };
        updates.wait_for(|state| state.is_busy()).await.unwrap();

        let second = controller.generate_objectives().await.unwrap();
        let other = controller.generate_scenario().await.unwrap();

        assert_eq!(second, StageRun::Ignored { running: StageKind::Objectives });
        assert_eq!(other, StageRun::Ignored { running: StageKind::Objectives });
        assert_eq!(client.call_count("objectives_with_framework"), 1);
        assert_eq!(client.call_count("scenario"), 0);
        assert_eq!(controller.snapshot().error, None);

        gate.add_permits(1);
        let first = running.await.unwrap().unwrap();
        assert_eq!(first, StageRun::Succeeded);
        assert_stage_succeeded(&controller.snapshot(), StageKind::Objectives);
    }

    #[tokio::test]
    async fn test_busy_check_precedes_precondition() {
        let gate = Arc::new(Semaphore::new(0));
        let client = Arc::new(ScriptedGenerationClient::new().with_gate(Arc::clone(&gate)));
        let controller = Arc::new(controller(Arc::clone(&client)));
        let mut updates = controller.subscribe();

        let running = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.generate_objectives().await })
        };
        updates.wait_for(|state| state.is_busy()).await.unwrap();

        // stage 3 is also blocked, but busy wins
        let run = controller.generate_assessment().await;
        assert_eq!(run, Ok(StageRun::Ignored { running: StageKind::Objectives }));

        gate.add_permits(1);
        running.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_stale_completion_after_reset_is_discarded() {
        let gate = Arc::new(Semaphore::new(0));
        let client = Arc::new(ScriptedGenerationClient::new().with_gate(Arc::clone(&gate)));
        let controller = Arc::new(controller(Arc::clone(&client)));
        let mut updates = controller.subscribe();
        let session_id = controller.snapshot().session_id;

        let running = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.generate_objectives().await })
        };
        updates.wait_for(|state| state.is_busy()).await.unwrap();

        controller.reset().await;
        gate.add_permits(1);
        let run = running.await.unwrap().unwrap();

        assert_eq!(run, StageRun::Discarded);
        let state = controller.snapshot();
        assert_stage_cleared(&state, StageKind::Objectives);
        assert_eq!(state.lesson, LessonInput::default());
        assert_eq!(state.session_id, session_id);
        assert!(!state.is_busy());
    }

    #[tokio::test]
    async fn test_restore_running_snapshot_marks_failed() {
        let gate = Arc::new(Semaphore::new(0));
        let client = Arc::new(ScriptedGenerationClient::new().with_gate(Arc::clone(&gate)));
        let controller = Arc::new(controller(Arc::clone(&client)));
        let mut updates = controller.subscribe();

        let running = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.generate_objectives().await })
        };
        updates.wait_for(|state| state.is_busy()).await.unwrap();
        let snapshot = controller.snapshot();

        let restored = WorkflowController::new(
            Arc::new(ScriptedGenerationClient::new()),
            WorkflowConfig::default(),
        );
        restored.restore(snapshot);

        let state = restored.snapshot();
        assert_stage_status(&state, StageKind::Objectives, StageStatus::Failed);
        assert!(!state.is_busy());
        assert_eq!(
            state.error.as_deref(),
            Some(StageKind::Objectives.failure_message())
        );

        gate.add_permits(1);
        running.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_sequential_strategy_calls_objectives_then_framework() {
        let client = Arc::new(ScriptedGenerationClient::new());
        let controller = WorkflowController::new(
            client.clone(),
            WorkflowConfig::default().with_objectives_strategy(ObjectivesStrategy::Sequential),
        )
        .with_lesson(fixtures::zakat_lesson());

        controller.generate_objectives().await.unwrap();

        assert_eq!(client.calls(), ["objectives", "framework"]);
        let state = controller.snapshot();
        assert_eq!(
            state.objectives.result.as_deref(),
            Some(&fixtures::sample_objectives())
        );
    }

    #[tokio::test]
    async fn test_sequential_framework_failure_stores_nothing() {
        let client = Arc::new(
            ScriptedGenerationClient::new().with_framework(Reply::Fail("quota".to_string())),
        );
        let controller = WorkflowController::new(
            client.clone(),
            WorkflowConfig::default().with_objectives_strategy(ObjectivesStrategy::Sequential),
        )
        .with_lesson(fixtures::zakat_lesson());

        let run = controller.generate_objectives().await.unwrap();

        assert!(matches!(run, StageRun::Failed { .. }));
        let state = controller.snapshot();
        assert_stage_status(&state, StageKind::Objectives, StageStatus::Failed);
        assert!(state.objectives.result.is_none());
    }

    #[tokio::test]
    async fn test_generation_failure_keeps_earlier_stages() {
        let client = Arc::new(
            ScriptedGenerationClient::new().with_scenario(Reply::Fail("overloaded".to_string())),
        );
        let controller = controller(Arc::clone(&client));
        controller.generate_objectives().await.unwrap();

        let run = controller.generate_scenario().await.unwrap();

        assert_eq!(
            run,
            StageRun::Failed {
                message: "Gagal menghasilkan Skenario Kegiatan. Silakan coba lagi.".to_string(),
            }
        );
        let state = controller.snapshot();
        assert_stage_succeeded(&state, StageKind::Objectives);
        assert_stage_status(&state, StageKind::Scenario, StageStatus::Failed);
        assert!(state.scenario.result.is_none());
        assert_eq!(
            state.error.as_deref(),
            Some("Gagal menghasilkan Skenario Kegiatan. Silakan coba lagi.")
        );

        // a later attempt can succeed
        client.set_scenario(Reply::Value(fixtures::sample_scenario()));
        assert_eq!(controller.generate_scenario().await, Ok(StageRun::Succeeded));
        assert_eq!(controller.snapshot().error, None);
    }

    #[tokio::test]
    async fn test_failed_assessment_rerun_keeps_previous_package() {
        let client = Arc::new(ScriptedGenerationClient::new());
        let controller = controller(Arc::clone(&client));
        run_all(&controller).await;
        let before = controller.snapshot().assessment.result.unwrap();

        client.set_assessment(Reply::Fail("overloaded".to_string()));
        let run = controller.generate_assessment().await.unwrap();

        assert!(matches!(run, StageRun::Failed { .. }));
        let state = controller.snapshot();
        assert_stage_status(&state, StageKind::Assessment, StageStatus::Failed);
        assert!(Arc::ptr_eq(state.assessment.result.as_ref().unwrap(), &before));
        assert_stage_succeeded(&state, StageKind::Scenario);

        let mut exporter = MockDocumentExporter::new();
        exporter.expect_export().times(1).returning(|bundle| {
            Ok(ExportedDocument {
                filename: bundle.filename(),
                bytes: Vec::new(),
            })
        });
        assert_eq!(controller.export_with(&exporter).unwrap().filename, "RPP_Zakat.docx");
    }

    #[tokio::test]
    async fn test_failed_scenario_rerun_keeps_scenario_and_clears_assessment() {
        let client = Arc::new(ScriptedGenerationClient::new());
        let controller = controller(Arc::clone(&client));
        run_all(&controller).await;
        let before = controller.snapshot().scenario.result.unwrap();

        client.set_scenario(Reply::Fail("overloaded".to_string()));
        controller.generate_scenario().await.unwrap();

        let state = controller.snapshot();
        assert_stage_status(&state, StageKind::Scenario, StageStatus::Failed);
        assert!(Arc::ptr_eq(state.scenario.result.as_ref().unwrap(), &before));
        assert_stage_cleared(&state, StageKind::Assessment);
        assert_eq!(state.missing_for_export(), [StageKind::Assessment]);
    }

    #[tokio::test]
    async fn test_edit_of_replaced_result_is_refused() {
        let client = Arc::new(ScriptedGenerationClient::new());
        let controller = controller(Arc::clone(&client));
        controller.generate_objectives().await.unwrap();
        controller.generate_scenario().await.unwrap();
        let stale = controller.snapshot().result(StageKind::Scenario).unwrap();

        controller.generate_scenario().await.unwrap();
        let current = controller.snapshot().scenario.result.unwrap();

        let path = FieldPath::from_keys(&["kegiatan_penutup", "refleksi"]);
        assert_eq!(
            controller.edit_from(stale, &path, "X"),
            Err(EditPreconditionError::Superseded(StageKind::Scenario))
        );
        let after = controller.snapshot().scenario.result.unwrap();
        assert!(Arc::ptr_eq(&after, &current));
        assert_ne!(after.kegiatan_penutup.refleksi, "X");

        controller.edit_result(StageKind::Scenario, &path, "X").unwrap();
        assert_eq!(
            controller.snapshot().scenario.result.unwrap().kegiatan_penutup.refleksi,
            "X"
        );
    }

    #[tokio::test]
    async fn test_assessment_request_uses_flattened_activities() {
        let client = Arc::new(ScriptedGenerationClient::new());
        let controller = controller(Arc::clone(&client));
        run_all(&controller).await;

        let request = client.last_assessment_request().unwrap();
        let activities = fixtures::sample_scenario().flattened_activities();
        assert_eq!(request.kegiatan_inti, activities);
        assert_eq!(request.kegiatan_inti.first().unwrap().sintaks, "Orientasi");
        assert_eq!(request.kegiatan_inti.last().unwrap().sintaks, "Evaluasi");
        assert_eq!(request.list_kbc_terpilih, fixtures::zakat_lesson().list_kbc_terpilih);
    }

    fn misaligned_assessment() -> crate::model::AssessmentPackage {
        let mut assessment = fixtures::sample_assessment();
        assessment.validasi_keselarasan[0].tp_terukur = vec!["tp_9".to_string()];
        assessment
    }

    #[tokio::test]
    async fn test_flag_policy_stores_report() {
        let client = Arc::new(
            ScriptedGenerationClient::new().with_assessment(Reply::Value(misaligned_assessment())),
        );
        let controller = controller(Arc::clone(&client));
        run_all(&controller).await;

        let state = controller.snapshot();
        let report = state.alignment.unwrap();
        assert_eq!(report.dangling_ids(), ["tp_9"]);
    }

    #[tokio::test]
    async fn test_reject_policy_fails_assessment() {
        let client = Arc::new(
            ScriptedGenerationClient::new().with_assessment(Reply::Value(misaligned_assessment())),
        );
        let controller = WorkflowController::new(
            client.clone(),
            WorkflowConfig::default().with_alignment(AlignmentPolicy::Reject),
        )
        .with_lesson(fixtures::zakat_lesson());
        controller.generate_objectives().await.unwrap();
        controller.generate_scenario().await.unwrap();

        let run = controller.generate_assessment().await.unwrap();

        assert!(matches!(run, StageRun::Failed { .. }));
        let state = controller.snapshot();
        assert_stage_status(&state, StageKind::Assessment, StageStatus::Failed);
        assert!(state.assessment.result.is_none());
        assert_stage_succeeded(&state, StageKind::Scenario);
    }

    #[tokio::test]
    async fn test_edit_objective_publishes_new_result() {
        let client = Arc::new(ScriptedGenerationClient::new());
        let controller = controller(Arc::clone(&client));
        run_all(&controller).await;
        let before = controller.snapshot().objectives.result.unwrap();

        controller
            .edit_objective("tp_2", "Membedakan zakat fitrah dan zakat mal.")
            .unwrap();

        let state = controller.snapshot();
        let after = state.objectives.result.as_ref().unwrap();
        assert_eq!(
            after.objective("tp_2").unwrap().deskripsi,
            "Membedakan zakat fitrah dan zakat mal."
        );
        assert_eq!(*before, fixtures::sample_objectives());
        // edits never invalidate downstream stages
        assert_stage_succeeded(&state, StageKind::Scenario);
        assert_stage_succeeded(&state, StageKind::Assessment);
    }

    #[tokio::test]
    async fn test_edit_errors_leave_state_untouched() {
        let client = Arc::new(ScriptedGenerationClient::new());
        let controller = controller(Arc::clone(&client));

        let path = FieldPath::from_keys(&["kegiatan_penutup", "refleksi"]);
        assert_eq!(
            controller.edit_result(StageKind::Scenario, &path, "X"),
            Err(EditPreconditionError::NoResult(StageKind::Scenario))
        );
        assert_eq!(
            controller.edit_objective("tp_1", "X"),
            Err(EditPreconditionError::NoResult(StageKind::Objectives))
        );

        controller.generate_objectives().await.unwrap();
        let before = controller.snapshot();
        assert!(matches!(
            controller.edit_objective("tp_9", "X"),
            Err(EditPreconditionError::UnknownObjective(_))
        ));
        let bad_path: FieldPath = "tujuan_pembelajaran.7.deskripsi".parse().unwrap();
        assert!(matches!(
            controller.edit_result(StageKind::Objectives, &bad_path, "X"),
            Err(EditPreconditionError::IndexOutOfRange { .. })
        ));
        assert_eq!(controller.snapshot(), before);
    }

    #[tokio::test]
    async fn test_edit_result_on_scenario() {
        let client = Arc::new(ScriptedGenerationClient::new());
        let sink = Arc::new(CollectingEventSink::new());
        let controller = controller(Arc::clone(&client)).with_event_sink(sink.clone());
        controller.generate_objectives().await.unwrap();
        controller.generate_scenario().await.unwrap();
        let before = controller.snapshot().scenario.result.unwrap();

        let path = FieldPath::from_keys(&["kegiatan_penutup", "refleksi"]);
        controller.edit_result(StageKind::Scenario, &path, "X").unwrap();

        let after = controller.snapshot().scenario.result.unwrap();
        assert_eq!(after.kegiatan_penutup.refleksi, "X");
        assert_eq!(after.kegiatan_inti, before.kegiatan_inti);
        assert_ne!(before.kegiatan_penutup.refleksi, "X");
        assert_eq!(sink.events_of_type(RESULT_EDITED).len(), 1);
    }

    #[tokio::test]
    async fn test_export_rejected_without_assessment() {
        let client = Arc::new(ScriptedGenerationClient::new());
        let controller = controller(Arc::clone(&client));
        controller.generate_objectives().await.unwrap();
        controller.generate_scenario().await.unwrap();
        let mut exporter = MockDocumentExporter::new();
        exporter.expect_export().never();

        let err = controller.export_with(&exporter).unwrap_err();

        assert!(matches!(
            err,
            LessonflowError::Validation(ValidationError::IncompleteExport { ref missing })
                if missing == &[StageKind::Assessment]
        ));
        assert_eq!(
            controller.snapshot().error.as_deref(),
            Some("Harap hasilkan semua komponen RPP sebelum mengekspor.")
        );
    }

    #[tokio::test]
    async fn test_export_with_complete_state() {
        let client = Arc::new(ScriptedGenerationClient::new());
        let controller = controller(Arc::clone(&client));
        run_all(&controller).await;
        let mut exporter = MockDocumentExporter::new();
        exporter
            .expect_export()
            .times(1)
            .withf(|bundle| bundle.lesson.topik == "Zakat" && bundle.assessment.validasi_keselarasan.len() == 2)
            .returning(|bundle| {
                Ok(ExportedDocument {
                    filename: bundle.filename(),
                    bytes: vec![1, 2, 3],
                })
            });

        let document = controller.export_with(&exporter).unwrap();

        assert_eq!(document.filename, "RPP_Zakat.docx");
        assert_eq!(document.bytes, [1, 2, 3]);
    }

    #[tokio::test]
    async fn test_events_for_each_transition() {
        let client = Arc::new(
            ScriptedGenerationClient::new().with_scenario(Reply::Fail("boom".to_string())),
        );
        let sink = Arc::new(CollectingEventSink::new());
        let controller = controller(Arc::clone(&client)).with_event_sink(sink.clone());

        let _ = controller.generate_assessment().await;
        controller.generate_objectives().await.unwrap();
        controller.generate_scenario().await.unwrap();

        assert_eq!(
            sink.event_types(),
            [
                STAGE_REJECTED,
                STAGE_STARTED,
                STAGE_SUCCEEDED,
                STAGE_STARTED,
                STAGE_FAILED,
            ]
        );
        assert_eq!(sink.events_of_type(STAGE_FAILED)[0].stage(), Some("scenario"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_lesson_edits_go_through_autosaver() {
        let storage = Arc::new(MemoryStorage::new());
        let (saver, lesson) = DraftAutosaver::start(
            DraftStore::new(storage.clone()),
            Duration::from_millis(1500),
            Arc::new(NoOpEventSink),
        );
        assert_eq!(lesson, LessonInput::default());

        let client = Arc::new(ScriptedGenerationClient::new());
        let controller = WorkflowController::new(client, WorkflowConfig::default())
            .with_lesson(lesson)
            .with_autosaver(saver);

        controller.update_lesson(|l| l.topik = "Zakat Fitrah".to_string());
        assert_eq!(controller.autosaver().unwrap().status(), SaveStatus::Unsaved);

        controller.autosaver().unwrap().flush().await;
        assert_eq!(storage.writes(), 1);
        assert!(storage.get_raw(DRAFT_KEY).unwrap().contains("Zakat Fitrah"));
        assert_eq!(controller.autosaver().unwrap().status(), SaveStatus::Saved);

        controller.reset().await;
        assert_eq!(storage.get_raw(DRAFT_KEY), None);
        assert_eq!(controller.snapshot().lesson, LessonInput::default());
    }

    #[tokio::test]
    async fn test_update_lesson_keeps_results() {
        let client = Arc::new(ScriptedGenerationClient::new());
        let controller = controller(Arc::clone(&client));
        controller.generate_objectives().await.unwrap();

        let lesson = controller.update_lesson(|l| {
            l.toggle_tag(crate::model::TagCategory::Kbc, "Cinta Ilmu");
        });

        assert!(lesson.list_kbc_terpilih.contains(&"Cinta Ilmu".to_string()));
        let state = controller.snapshot();
        assert_eq!(state.lesson, lesson);
        assert_stage_succeeded(&state, StageKind::Objectives);
    }
}
