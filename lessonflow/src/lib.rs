//! # Lessonflow
//!
//! Staged generation of lesson plans (RPP) backed by a generative language model.
//!
//! Lessonflow drives an educator's lesson description through three dependent
//! generation stages and keeps everything needed to edit and export the result:
//!
//! - **Draft store**: debounced persistence of the lesson form
//! - **Workflow controller**: Objectives+Framework → Scenario → Assessment, with
//!   downstream invalidation and a single-running-stage rule
//! - **Edit overlay**: path-addressed edits that never mutate shared results
//! - **Generation client**: schema-validated JSON generation (Gemini over HTTP)
//! - **Export**: a five-section `.docx` document
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use lessonflow::prelude::*;
//!
//! let config = LessonflowConfig::default();
//! let client = GeminiClient::from_config(&config.generation)?;
//! let controller = WorkflowController::new(Arc::new(client), config.workflow);
//!
//! controller.generate_objectives().await?;
//! controller.generate_scenario().await?;
//! controller.generate_assessment().await?;
//!
//! let document = controller.export_with(&DocxExporter::new())?;
//! std::fs::write(&document.filename, &document.bytes)?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod contracts;
pub mod core;
pub mod draft;
pub mod errors;
pub mod events;
pub mod export;
pub mod generation;
pub mod model;
pub mod observability;
pub mod overlay;
pub mod testing;
pub mod workflow;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{DraftConfig, GenerationConfig, LessonflowConfig, WorkflowConfig};
    pub use crate::core::{SaveStatus, StageKind, StageStatus};
    pub use crate::draft::{DraftAutosaver, DraftStorage, DraftStore, FileStorage, MemoryStorage};
    pub use crate::errors::{
        ConfigError, EditPreconditionError, ExportError, GenerationError, LessonflowError,
        PersistError, ValidationError,
    };
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::export::{DocumentExporter, DocxExporter, ExportBundle, ExportedDocument};
    #[cfg(feature = "gemini")]
    pub use crate::generation::GeminiClient;
    pub use crate::generation::{
        AssessmentRequest, FrameworkRequest, GenerationClient, ScenarioRequest,
    };
    pub use crate::model::{
        AssessmentPackage, LearningFramework, LearningModel, LearningObjective, LessonInput,
        ObjectivesResult, ScenarioResult,
    };
    pub use crate::overlay::{FieldPath, PathStep};
    pub use crate::workflow::{
        AlignmentPolicy, AlignmentReport, ObjectivesStrategy, StageRun, WorkflowController,
        WorkflowEvent, WorkflowState,
    };
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn prelude_exposes_core_types() {
        assert_eq!(StageKind::ALL.len(), 3);
        assert_eq!(StageStatus::default(), StageStatus::NotStarted);
    }
}
