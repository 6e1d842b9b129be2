//! Interface to the text-generation service.
//!
//! A [`GenerationClient`] turns a structured request into a schema-valid
//! stage payload or fails with a [`GenerationError`]. Nothing is retried
//! and nothing partial is returned.

#[cfg(feature = "gemini")]
mod gemini;
pub mod prompts;

#[cfg(feature = "gemini")]
pub use gemini::GeminiClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::GenerationError;
use crate::model::{
    Activity, AssessmentPackage, LearningFramework, LearningObjective, LessonInput,
    ObjectivesDraft, ObjectivesResult, ScenarioResult,
};

/// Input of the framework call: the lesson plus its objectives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameworkRequest {
    /// The lesson.
    #[serde(flatten)]
    pub lesson: LessonInput,
    /// Objectives produced by the objectives call.
    pub tujuan_pembelajaran: Vec<LearningObjective>,
}

impl FrameworkRequest {
    /// Builds the request from the lesson and the objectives draft.
    #[must_use]
    pub fn new(lesson: &LessonInput, draft: &ObjectivesDraft) -> Self {
        Self {
            lesson: lesson.clone(),
            tujuan_pembelajaran: draft.tujuan_pembelajaran.clone(),
        }
    }
}

/// Input of the scenario call: the lesson plus its objectives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioRequest {
    /// The lesson.
    #[serde(flatten)]
    pub lesson: LessonInput,
    /// Objectives of the lesson.
    pub tujuan_pembelajaran: Vec<LearningObjective>,
}

impl ScenarioRequest {
    /// Builds the request from the lesson and the stage 1 result.
    #[must_use]
    pub fn new(lesson: &LessonInput, objectives: &ObjectivesResult) -> Self {
        Self {
            lesson: lesson.clone(),
            tujuan_pembelajaran: objectives.tujuan_pembelajaran.clone(),
        }
    }
}

/// Input of the assessment call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentRequest {
    /// Objectives of the lesson.
    pub tujuan_pembelajaran: Vec<LearningObjective>,
    /// Core activities of all three phases, flattened in phase order.
    pub kegiatan_inti: Vec<Activity>,
    /// Selected Panca Cinta values.
    pub list_kbc_terpilih: Vec<String>,
    /// Selected graduate profile dimensions.
    pub list_dpl_terpilih: Vec<String>,
}

impl AssessmentRequest {
    /// Builds the request from the lesson and the two upstream results.
    #[must_use]
    pub fn new(
        lesson: &LessonInput,
        objectives: &ObjectivesResult,
        scenario: &ScenarioResult,
    ) -> Self {
        Self {
            tujuan_pembelajaran: objectives.tujuan_pembelajaran.clone(),
            kegiatan_inti: scenario.flattened_activities(),
            list_kbc_terpilih: lesson.list_kbc_terpilih.clone(),
            list_dpl_terpilih: lesson.list_dpl_terpilih.clone(),
        }
    }
}

/// A client for the generation service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Objectives and framework in one call.
    async fn objectives_with_framework(
        &self,
        lesson: &LessonInput,
    ) -> Result<ObjectivesResult, GenerationError>;

    /// Objectives, curriculum reference and time allocation only.
    async fn objectives(&self, lesson: &LessonInput) -> Result<ObjectivesDraft, GenerationError>;

    /// The learning framework for already generated objectives.
    async fn framework(
        &self,
        request: &FrameworkRequest,
    ) -> Result<LearningFramework, GenerationError>;

    /// The activity scenario.
    async fn scenario(&self, request: &ScenarioRequest) -> Result<ScenarioResult, GenerationError>;

    /// The assessment package.
    async fn assessment(
        &self,
        request: &AssessmentRequest,
    ) -> Result<AssessmentPackage, GenerationError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scenario_request_flattens_lesson() {
        let lesson = fixtures::zakat_lesson();
        let request = ScenarioRequest::new(&lesson, &fixtures::sample_objectives());
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["topik"], "Zakat");
        assert_eq!(value["namaGuru"], lesson.nama_guru.as_str());
        assert_eq!(value["tujuan_pembelajaran"].as_array().unwrap().len(), 3);
        assert!(value.get("lesson").is_none());
    }

    #[test]
    fn test_assessment_request_uses_flattened_activities() {
        let lesson = fixtures::zakat_lesson();
        let scenario = fixtures::sample_scenario();
        let request =
            AssessmentRequest::new(&lesson, &fixtures::sample_objectives(), &scenario);

        assert_eq!(request.kegiatan_inti, scenario.flattened_activities());
        assert_eq!(request.list_kbc_terpilih, lesson.list_kbc_terpilih);
        assert_eq!(request.list_dpl_terpilih, lesson.list_dpl_terpilih);

        let value = serde_json::to_value(&request).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 4);
    }
}
