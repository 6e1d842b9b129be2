//! Lesson input and the structured results of each generation stage.
//!
//! Field names follow the persisted and generated JSON exactly, so every type
//! here round-trips through `serde_json` without renaming (except the two
//! camelCase name fields of [`LessonInput`]). No field carries a default:
//! a payload missing any field fails to deserialize.

mod assessment;
mod lesson;
mod objectives;
mod scenario;

pub use assessment::{
    AlignmentValidation, AssessmentPackage, DiagnosticAssessment, FormativeAssessment,
    FormativeRubricItem, Question, RubricItem, SummativeAssessment, SummativeEssayRubricItem,
};
pub use lesson::{LearningModel, LessonInput, TagCategory, DPL_OPTIONS, KBC_OPTIONS};
pub use objectives::{
    DigitalUse, LearningEnvironment, LearningFramework, LearningObjective, ObjectivesDraft,
    ObjectivesResult, PedagogicalPractice,
};
pub use scenario::{
    Activity, ClosingActivities, CoreActivities, LearningPhase, OpeningActivities, ScenarioResult,
    TriggerQuestion,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_flattened_activities_keep_phase_order() {
        let scenario = fixtures::sample_scenario();
        let flat = scenario.flattened_activities();

        let expected: Vec<Activity> = scenario
            .kegiatan_inti
            .memahami
            .aktivitas
            .iter()
            .chain(&scenario.kegiatan_inti.mengaplikasi.aktivitas)
            .chain(&scenario.kegiatan_inti.merefleksi.aktivitas)
            .cloned()
            .collect();
        assert_eq!(flat, expected);
        assert_eq!(flat.first().map(|a| a.sintaks.as_str()), Some("Orientasi"));
        assert_eq!(flat.last().map(|a| a.sintaks.as_str()), Some("Evaluasi"));
    }

    #[test]
    fn test_objectives_missing_ref_cp_fails() {
        let mut value = serde_json::to_value(fixtures::sample_objectives()).unwrap();
        value.as_object_mut().unwrap().remove("ref_cp");
        assert!(serde_json::from_value::<ObjectivesResult>(value).is_err());
    }

    #[test]
    fn test_objectives_draft_with_framework() {
        let full = fixtures::sample_objectives();
        let draft = ObjectivesDraft {
            tujuan_pembelajaran: full.tujuan_pembelajaran.clone(),
            ref_cp: full.ref_cp.clone(),
            alokasi_waktu: full.alokasi_waktu.clone(),
        };
        assert_eq!(draft.with_framework(full.kerangka.clone()), full);
    }

    #[test]
    fn test_objective_lookup() {
        let objectives = fixtures::sample_objectives();
        assert!(objectives.objective("tp_2").is_some());
        assert!(objectives.objective("tp_9").is_none());
        assert_eq!(objectives.objective_ids().collect::<Vec<_>>(), ["tp_1", "tp_2", "tp_3"]);
    }

    #[test]
    fn test_assessment_nested_field_required() {
        let mut value = serde_json::to_value(fixtures::sample_assessment()).unwrap();
        value["asesmen_formatif"]["rubrik"][0]
            .as_object_mut()
            .unwrap()
            .remove("skor_2");
        assert!(serde_json::from_value::<AssessmentPackage>(value).is_err());
    }
}
