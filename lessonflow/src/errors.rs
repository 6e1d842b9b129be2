//! Error types for lessonflow.
//!
//! Each boundary of the workflow has its own error type; `LessonflowError`
//! gathers them for callers that only want to propagate.

use crate::contracts::SchemaError;
use crate::core::StageKind;
use std::time::Duration;
use thiserror::Error;

/// The main error type for lessonflow operations.
#[derive(Debug, Error)]
pub enum LessonflowError {
    /// A precondition of the workflow was not met.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The generation service failed or returned invalid content.
    #[error("{0}")]
    Generation(#[from] GenerationError),

    /// A draft could not be persisted.
    #[error("{0}")]
    Persist(#[from] PersistError),

    /// An edit targeted something that does not exist.
    #[error("{0}")]
    Edit(#[from] EditPreconditionError),

    /// The document could not be assembled.
    #[error("{0}")]
    Export(#[from] ExportError),

    /// The configuration could not be loaded.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A workflow precondition failure. Reported before any external call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A stage was triggered before the stages it depends on succeeded.
    #[error("Stage '{stage}' requires '{requires}' to succeed first")]
    StageBlocked {
        /// The stage that was triggered.
        stage: StageKind,
        /// The first prerequisite that has not succeeded.
        requires: StageKind,
    },

    /// The lesson input is not usable for generation.
    #[error("Invalid lesson input: field '{field}' {reason}")]
    InvalidLesson {
        /// The offending field, using its persisted name.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// Export was requested while some stage output is missing.
    #[error("Cannot export, missing: {}", missing.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "))]
    IncompleteExport {
        /// The stages that have no result.
        missing: Vec<StageKind>,
    },
}

impl ValidationError {
    /// The message shown to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::StageBlocked { stage, .. } => stage.blocked_message().to_string(),
            Self::InvalidLesson { field, reason } => {
                format!("Data pelajaran belum lengkap: '{field}' {reason}.")
            }
            Self::IncompleteExport { .. } => {
                "Harap hasilkan semua komponen RPP sebelum mengekspor.".to_string()
            }
        }
    }
}

/// Errors that can occur while calling the generation service.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The service credential is not available.
    #[error("Generation credential not found. Set the {env} environment variable.")]
    MissingCredential {
        /// The environment variable that was consulted.
        env: String,
    },

    /// The request could not reach the service.
    #[error("Network error: {0}")]
    Network(String),

    /// The service answered with an error status.
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Body or reason returned by the service.
        message: String,
    },

    /// The request did not complete in time.
    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    /// The service returned no content.
    #[error("Empty response from generation service")]
    EmptyResponse,

    /// The content does not match the stage schema.
    #[error("Schema violation: {0}")]
    Schema(#[from] SchemaError),

    /// The assessment references learning objectives that do not exist.
    #[error("Assessment references unknown objectives: {}", ids.join(", "))]
    Misaligned {
        /// The dangling objective ids.
        ids: Vec<String>,
    },

    /// Request serialization failed.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while writing a draft.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The storage backend refused the write.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// The draft could not be serialized.
    #[error("Draft serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error raised when an edit does not address an existing value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditPreconditionError {
    /// The stage has no stored result to edit.
    #[error("Stage '{0}' has no result to edit")]
    NoResult(StageKind),

    /// The path has no steps.
    #[error("Edit path is empty")]
    EmptyPath,

    /// A key along the path does not exist.
    #[error("Path '{path}' not found")]
    PathNotFound {
        /// The full path that was requested.
        path: String,
    },

    /// An index along the path is past the end of its list.
    #[error("Index {index} out of range (len {len}) in path '{path}'")]
    IndexOutOfRange {
        /// The full path that was requested.
        path: String,
        /// The offending index.
        index: usize,
        /// Length of the list at that point.
        len: usize,
    },

    /// The path ends on an object or list instead of a text value.
    #[error("Path '{path}' does not address a text value")]
    NotAScalar {
        /// The full path that was requested.
        path: String,
    },

    /// No learning objective carries the given id.
    #[error("Learning objective '{0}' not found")]
    UnknownObjective(String),

    /// The stored result was replaced while the edit was being prepared.
    #[error("Stage '{0}' changed before the edit was applied")]
    Superseded(StageKind),

    /// The edited value no longer matches the stage schema.
    #[error("Edited result is invalid: {0}")]
    Invalid(String),
}

/// Errors raised while building the exported document.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Packaging the document failed.
    #[error("Document packaging error: {0}")]
    Package(#[from] zip::result::ZipError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Read {
        /// Path of the config file.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid configuration.
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        /// Path of the config file.
        path: String,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// A value is out of range.
    #[error("Invalid config value '{key}': {reason}")]
    Invalid {
        /// Dotted key of the offending value.
        key: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}
