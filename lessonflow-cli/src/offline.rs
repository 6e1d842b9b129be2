//! Generation client used when no credential is configured.
//!
//! Commands that never generate (draft, status, edit, export) still need a
//! controller, and the controller needs a client.

use async_trait::async_trait;

use lessonflow::errors::GenerationError;
use lessonflow::generation::{
    AssessmentRequest, FrameworkRequest, GenerationClient, ScenarioRequest,
};
use lessonflow::model::{
    AssessmentPackage, LearningFramework, LessonInput, ObjectivesDraft, ObjectivesResult,
    ScenarioResult,
};

/// Fails every call with the missing credential.
#[derive(Debug, Clone)]
pub struct OfflineClient {
    env: String,
}

impl OfflineClient {
    pub fn new(env: impl Into<String>) -> Self {
        Self { env: env.into() }
    }

    fn missing(&self) -> GenerationError {
        GenerationError::MissingCredential {
            env: self.env.clone(),
        }
    }
}

#[async_trait]
impl GenerationClient for OfflineClient {
    async fn objectives_with_framework(
        &self,
        _lesson: &LessonInput,
    ) -> Result<ObjectivesResult, GenerationError> {
        Err(self.missing())
    }

    async fn objectives(&self, _lesson: &LessonInput) -> Result<ObjectivesDraft, GenerationError> {
        Err(self.missing())
    }

    async fn framework(
        &self,
        _request: &FrameworkRequest,
    ) -> Result<LearningFramework, GenerationError> {
        Err(self.missing())
    }

    async fn scenario(
        &self,
        _request: &ScenarioRequest,
    ) -> Result<ScenarioResult, GenerationError> {
        Err(self.missing())
    }

    async fn assessment(
        &self,
        _request: &AssessmentRequest,
    ) -> Result<AssessmentPackage, GenerationError> {
        Err(self.missing())
    }
}
