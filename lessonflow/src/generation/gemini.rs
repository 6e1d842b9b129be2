//! Gemini `generateContent` client.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::{prompts, AssessmentRequest, FrameworkRequest, GenerationClient, ScenarioRequest};
use crate::config::GenerationConfig;
use crate::contracts::{self, TypedPayload};
use crate::errors::GenerationError;
use crate::model::{
    AssessmentPackage, LearningFramework, LessonInput, ObjectivesDraft, ObjectivesResult,
    ScenarioResult,
};

/// Gemini REST client.
pub struct GeminiClient {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
    timeout: Duration,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Creates a client from configuration, reading the API key from the
    /// configured environment variable.
    pub fn from_config(config: &GenerationConfig) -> Result<Self, GenerationError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| GenerationError::MissingCredential {
                env: config.api_key_env.clone(),
            })?;
        Self::with_api_key(config, api_key)
    }

    /// Creates a client with an explicit API key.
    pub fn with_api_key(
        config: &GenerationConfig,
        api_key: impl Into<String>,
    ) -> Result<Self, GenerationError> {
        let timeout = config.timeout();
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        Ok(Self {
            model: config.model.clone(),
            api_key: api_key.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            timeout,
        })
    }

    /// The model this client calls.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_request_body(prompt: &str, schema: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "systemInstruction": {
                "parts": [{ "text": prompts::SYSTEM_INSTRUCTION }],
            },
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }],
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema,
            },
        })
    }

    async fn generate<T>(
        &self,
        label: &'static str,
        prompt: String,
        schema: serde_json::Value,
    ) -> Result<T, GenerationError>
    where
        T: Serialize + DeserializeOwned,
    {
        debug!(model = %self.model, label, "generate: called");
        let body = Self::build_request_body(&prompt, schema);

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.transport_error(&e))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), label, "generate: API error");
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let envelope: GeminiResponse = serde_json::from_str(&text)?;
        let content = envelope.text().ok_or(GenerationError::EmptyResponse)?;
        debug!(label, bytes = content.len(), "generate: response received");

        Ok(TypedPayload::<T>::new(label).parse(&content)?)
    }

    fn transport_error(&self, error: &reqwest::Error) -> GenerationError {
        if error.is_timeout() {
            GenerationError::Timeout(self.timeout)
        } else {
            GenerationError::Network(error.to_string())
        }
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn objectives_with_framework(
        &self,
        lesson: &LessonInput,
    ) -> Result<ObjectivesResult, GenerationError> {
        self.generate(
            "objectives",
            prompts::objectives_with_framework(lesson)?,
            contracts::objectives_schema(),
        )
        .await
    }

    async fn objectives(&self, lesson: &LessonInput) -> Result<ObjectivesDraft, GenerationError> {
        self.generate(
            "objectives",
            prompts::objectives(lesson)?,
            contracts::objectives_draft_schema(),
        )
        .await
    }

    async fn framework(
        &self,
        request: &FrameworkRequest,
    ) -> Result<LearningFramework, GenerationError> {
        self.generate(
            "kerangka",
            prompts::framework(request)?,
            contracts::framework_schema(),
        )
        .await
    }

    async fn scenario(&self, request: &ScenarioRequest) -> Result<ScenarioResult, GenerationError> {
        self.generate(
            "scenario",
            prompts::scenario(request)?,
            contracts::scenario_schema(),
        )
        .await
    }

    async fn assessment(
        &self,
        request: &AssessmentRequest,
    ) -> Result<AssessmentPackage, GenerationError> {
        self.generate(
            "assessment",
            prompts::assessment(request)?,
            contracts::assessment_schema(),
        )
        .await
    }
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiResponse {
    /// Concatenated text parts of the first candidate, if non-blank.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content.parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}
