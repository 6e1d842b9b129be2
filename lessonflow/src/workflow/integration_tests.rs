#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use std::io::Read;
    use std::sync::Arc;

    use crate::config::WorkflowConfig;
    use crate::core::{StageKind, StageStatus};
    use crate::draft::{DraftStore, FileStorage};
    use crate::events::{CollectingEventSink, STAGE_SUCCEEDED};
    use crate::export::DocxExporter;
    use crate::testing::{
        assert_alignment_clean, assert_stage_status, assert_stage_succeeded, fixtures, Reply,
        ScriptedGenerationClient,
    };
    use crate::workflow::{StageRun, WorkflowController, WorkflowState};

    #[tokio::test]
    async fn test_zakat_lesson_end_to_end() {
        let client = Arc::new(ScriptedGenerationClient::new());
        let sink = Arc::new(CollectingEventSink::new());
        let controller = WorkflowController::new(client.clone(), WorkflowConfig::default())
            .with_lesson(fixtures::zakat_lesson())
            .with_event_sink(sink.clone());

        assert_eq!(controller.generate_objectives().await, Ok(StageRun::Succeeded));
        assert_eq!(controller.generate_scenario().await, Ok(StageRun::Succeeded));
        assert_eq!(controller.generate_assessment().await, Ok(StageRun::Succeeded));

        let state = controller.snapshot();
        for stage in StageKind::ALL {
            assert_stage_succeeded(&state, stage);
        }
        let objectives = state.objectives.result.as_ref().unwrap();
        assert_eq!(objectives.objective_ids().collect::<Vec<_>>(), ["tp_1", "tp_2", "tp_3"]);
        assert!(!objectives.ref_cp.is_empty());
        assert_eq!(objectives.alokasi_waktu, "2 x 40 menit");
        assert_alignment_clean(&state);
        assert_eq!(sink.events_of_type(STAGE_SUCCEEDED).len(), 3);

        // the scenario request carried the lesson and the generated objectives
        let request = client.last_scenario_request().unwrap();
        assert_eq!(request.lesson.mapel, "Fikih");
        assert_eq!(request.tujuan_pembelajaran, objectives.tujuan_pembelajaran);

        let document = controller.export_with(&DocxExporter::new()).unwrap();
        assert_eq!(document.filename, "RPP_Zakat.docx");

        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(document.bytes)).unwrap();
        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        assert!(xml.contains("E. Asesmen Pembelajaran"));
        assert!(xml.contains(&objectives.tujuan_pembelajaran[2].deskripsi));
    }

    #[tokio::test]
    async fn test_malformed_objectives_fail_without_partial_result() {
        let mut raw = serde_json::to_value(fixtures::sample_objectives()).unwrap();
        raw.as_object_mut().unwrap().remove("ref_cp");
        let client = Arc::new(ScriptedGenerationClient::new().with_objectives(Reply::Raw(raw)));
        let controller = WorkflowController::new(client, WorkflowConfig::default())
            .with_lesson(fixtures::zakat_lesson());

        let run = controller.generate_objectives().await.unwrap();

        assert_eq!(
            run,
            StageRun::Failed {
                message: StageKind::Objectives.failure_message().to_string(),
            }
        );
        let state = controller.snapshot();
        assert_stage_status(&state, StageKind::Objectives, StageStatus::Failed);
        assert!(state.objectives.result.is_none());
        assert!(controller.generate_scenario().await.is_err());
    }

    #[tokio::test]
    async fn test_snapshot_survives_serialization() {
        let client = Arc::new(ScriptedGenerationClient::new());
        let controller = WorkflowController::new(client, WorkflowConfig::default())
            .with_lesson(fixtures::zakat_lesson());
        controller.generate_objectives().await.unwrap();
        controller.generate_scenario().await.unwrap();

        let json = serde_json::to_string(&controller.snapshot()).unwrap();
        let restored: WorkflowState = serde_json::from_str(&json).unwrap();

        let resumed = WorkflowController::new(
            Arc::new(ScriptedGenerationClient::new()),
            WorkflowConfig::default(),
        );
        resumed.restore(restored);
        assert_eq!(resumed.snapshot(), controller.snapshot());
        assert_eq!(resumed.generate_assessment().await, Ok(StageRun::Succeeded));
    }

    #[test]
    fn test_draft_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = DraftStore::new(Arc::new(FileStorage::new(dir.path())));
        let lesson = fixtures::zakat_lesson();

        store.save(&lesson).unwrap();
        assert_eq!(store.load(), lesson);

        store.clear().unwrap();
        assert_eq!(store.load_existing(), None);
    }
}
