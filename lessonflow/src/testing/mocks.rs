//! Scripted generation client for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tokio::sync::Semaphore;

use super::fixtures;
use crate::contracts::TypedPayload;
use crate::errors::GenerationError;
use crate::generation::{AssessmentRequest, FrameworkRequest, GenerationClient, ScenarioRequest};
use crate::model::{
    AssessmentPackage, LearningFramework, LessonInput, ObjectivesDraft, ObjectivesResult,
    ScenarioResult,
};

/// What a scripted call returns.
#[derive(Debug, Clone)]
pub enum Reply<T> {
    /// A well-formed payload.
    Value(T),
    /// Raw JSON, validated the same way a service response is.
    Raw(serde_json::Value),
    /// An API failure with this message.
    Fail(String),
}

impl<T> Reply<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    fn resolve(&self, label: &'static str) -> Result<T, GenerationError> {
        match self {
            Self::Value(value) => Ok(value.clone()),
            Self::Raw(raw) => Ok(TypedPayload::<T>::new(label).from_json(raw.clone())?),
            Self::Fail(message) => Err(GenerationError::Api {
                status: 500,
                message: message.clone(),
            }),
        }
    }
}

/// A client that answers every call from a script and records the calls.
///
/// By default every call succeeds with the sample fixtures.
#[derive(Debug)]
pub struct ScriptedGenerationClient {
    objectives_with_framework: Mutex<Reply<ObjectivesResult>>,
    objectives: Mutex<Reply<ObjectivesDraft>>,
    framework: Mutex<Reply<LearningFramework>>,
    scenario: Mutex<Reply<ScenarioResult>>,
    assessment: Mutex<Reply<AssessmentPackage>>,
    calls: Mutex<Vec<&'static str>>,
    scenario_requests: Mutex<Vec<ScenarioRequest>>,
    assessment_requests: Mutex<Vec<AssessmentRequest>>,
    gate: Option<Arc<Semaphore>>,
}

impl Default for ScriptedGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedGenerationClient {
    /// Creates a client answering with the sample fixtures.
    #[must_use]
    pub fn new() -> Self {
        Self {
            objectives_with_framework: Mutex::new(Reply::Value(fixtures::sample_objectives())),
            objectives: Mutex::new(Reply::Value(fixtures::sample_objectives_draft())),
            framework: Mutex::new(Reply::Value(fixtures::sample_framework())),
            scenario: Mutex::new(Reply::Value(fixtures::sample_scenario())),
            assessment: Mutex::new(Reply::Value(fixtures::sample_assessment())),
            calls: Mutex::new(Vec::new()),
            scenario_requests: Mutex::new(Vec::new()),
            assessment_requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Makes every call wait for one permit of `gate` before answering.
    #[must_use]
    pub fn with_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Scripts the combined objectives call.
    #[must_use]
    pub fn with_objectives(self, reply: Reply<ObjectivesResult>) -> Self {
        *self.objectives_with_framework.lock() = reply;
        self
    }

    /// Scripts the objectives-only call.
    #[must_use]
    pub fn with_objectives_draft(self, reply: Reply<ObjectivesDraft>) -> Self {
        *self.objectives.lock() = reply;
        self
    }

    /// Scripts the framework call.
    #[must_use]
    pub fn with_framework(self, reply: Reply<LearningFramework>) -> Self {
        *self.framework.lock() = reply;
        self
    }

    /// Scripts the scenario call.
    #[must_use]
    pub fn with_scenario(self, reply: Reply<ScenarioResult>) -> Self {
        *self.scenario.lock() = reply;
        self
    }

    /// Scripts the assessment call.
    #[must_use]
    pub fn with_assessment(self, reply: Reply<AssessmentPackage>) -> Self {
        *self.assessment.lock() = reply;
        self
    }

    /// Replaces the scenario reply after construction.
    pub fn set_scenario(&self, reply: Reply<ScenarioResult>) {
        *self.scenario.lock() = reply;
    }

    /// Replaces the assessment reply after construction.
    pub fn set_assessment(&self, reply: Reply<AssessmentPackage>) {
        *self.assessment.lock() = reply;
    }

    /// Operation names in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }

    /// Number of calls to `operation`.
    #[must_use]
    pub fn call_count(&self, operation: &str) -> usize {
        self.calls.lock().iter().filter(|c| **c == operation).count()
    }

    /// The most recent scenario request.
    #[must_use]
    pub fn last_scenario_request(&self) -> Option<ScenarioRequest> {
        self.scenario_requests.lock().last().cloned()
    }

    /// The most recent assessment request.
    #[must_use]
    pub fn last_assessment_request(&self) -> Option<AssessmentRequest> {
        self.assessment_requests.lock().last().cloned()
    }

    async fn answer<T>(
        &self,
        operation: &'static str,
        reply: &Mutex<Reply<T>>,
    ) -> Result<T, GenerationError>
    where
        T: Clone + Serialize + DeserializeOwned,
    {
        self.calls.lock().push(operation);
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        let reply = reply.lock().clone();
        reply.resolve(operation)
    }
}

#[async_trait]
impl GenerationClient for ScriptedGenerationClient {
    async fn objectives_with_framework(
        &self,
        _lesson: &LessonInput,
    ) -> Result<ObjectivesResult, GenerationError> {
        self.answer("objectives_with_framework", &self.objectives_with_framework)
            .await
    }

    async fn objectives(&self, _lesson: &LessonInput) -> Result<ObjectivesDraft, GenerationError> {
        self.answer("objectives", &self.objectives).await
    }

    async fn framework(
        &self,
        _request: &FrameworkRequest,
    ) -> Result<LearningFramework, GenerationError> {
        self.answer("framework", &self.framework).await
    }

    async fn scenario(&self, request: &ScenarioRequest) -> Result<ScenarioResult, GenerationError> {
        self.scenario_requests.lock().push(request.clone());
        self.answer("scenario", &self.scenario).await
    }

    async fn assessment(
        &self,
        request: &AssessmentRequest,
    ) -> Result<AssessmentPackage, GenerationError> {
        self.assessment_requests.lock().push(request.clone());
        self.answer("assessment", &self.assessment).await
    }
}
