//! Configuration types and loading.
//!
//! Every field has a default, so a config file only needs the values it
//! changes. `LESSONFLOW_MODEL` overrides the model id after loading.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::ConfigError;
use crate::workflow::{AlignmentPolicy, ObjectivesStrategy};

/// Environment variable that overrides [`GenerationConfig::model`].
pub const MODEL_ENV: &str = "LESSONFLOW_MODEL";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonflowConfig {
    /// Generation service settings.
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Draft persistence settings.
    #[serde(default)]
    pub draft: DraftConfig,
    /// Workflow behaviour.
    #[serde(default)]
    pub workflow: WorkflowConfig,
}

impl LessonflowConfig {
    /// Loads configuration from `path`, or defaults when no path is given.
    ///
    /// The model override from the environment is applied in both cases.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => {
                tracing::debug!("No config file given, using defaults");
                Self::default()
            }
        };

        if let Ok(model) = std::env::var(MODEL_ENV) {
            if !model.trim().is_empty() {
                tracing::debug!(%model, "Model overridden from environment");
                config.generation.model = model;
            }
        }

        config.validate()?;
        Ok(config)
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        tracing::info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generation.model.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "generation.model",
                reason: "must not be empty".to_string(),
            });
        }
        if self.generation.timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "generation.timeout_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if !(self.generation.base_url.starts_with("http://")
            || self.generation.base_url.starts_with("https://"))
        {
            return Err(ConfigError::Invalid {
                key: "generation.base_url",
                reason: format!("'{}' is not an http(s) URL", self.generation.base_url),
            });
        }
        Ok(())
    }
}

/// Generation service settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// API base URL, without the version path.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_timeout_ms() -> u64 {
    120_000
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl GenerationConfig {
    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the API key environment variable.
    #[must_use]
    pub fn with_api_key_env(mut self, env: impl Into<String>) -> Self {
        self.api_key_env = env.into();
        self
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Gets the timeout as a Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Draft persistence settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftConfig {
    /// Directory holding the draft file. `None` means the platform data dir.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// Quiet period after the last edit before the draft is written.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    1500
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self {
            dir: None,
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl DraftConfig {
    /// Sets the draft directory.
    #[must_use]
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Sets the debounce window.
    #[must_use]
    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    /// Gets the debounce window as a Duration.
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Workflow behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// How stage 1 calls the service.
    #[serde(default)]
    pub objectives_strategy: ObjectivesStrategy,
    /// What to do with assessment items that reference unknown objectives.
    #[serde(default)]
    pub alignment: AlignmentPolicy,
}

impl WorkflowConfig {
    /// Sets the objectives strategy.
    #[must_use]
    pub fn with_objectives_strategy(mut self, strategy: ObjectivesStrategy) -> Self {
        self.objectives_strategy = strategy;
        self
    }

    /// Sets the alignment policy.
    #[must_use]
    pub fn with_alignment(mut self, alignment: AlignmentPolicy) -> Self {
        self.alignment = alignment;
        self
    }
}
