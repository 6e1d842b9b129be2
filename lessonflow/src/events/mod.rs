//! Event sink system for observability.
//!
//! The workflow controller and the draft autosaver report every transition
//! to an [`EventSink`]. Event types are dotted names such as `stage.started`.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink, RecordedEvent};

/// A stage run began.
pub const STAGE_STARTED: &str = "stage.started";
/// A stage run stored its result.
pub const STAGE_SUCCEEDED: &str = "stage.succeeded";
/// A stage run failed.
pub const STAGE_FAILED: &str = "stage.failed";
/// A trigger was refused before any call.
pub const STAGE_REJECTED: &str = "stage.rejected";
/// A stage result was edited.
pub const RESULT_EDITED: &str = "result.edited";
/// The draft was written.
pub const DRAFT_SAVED: &str = "draft.saved";
/// The draft could not be written.
pub const DRAFT_SAVE_FAILED: &str = "draft.save_failed";
