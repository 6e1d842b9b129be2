//! Typed access to the persisted lesson draft.

use std::sync::Arc;
use tracing::{debug, warn};

use super::DraftStorage;
use crate::errors::PersistError;
use crate::model::LessonInput;

/// Storage key of the lesson draft.
pub const DRAFT_KEY: &str = "rpp_lesson_draft";

/// Loads and saves the lesson draft as one JSON object.
#[derive(Clone)]
pub struct DraftStore {
    storage: Arc<dyn DraftStorage>,
}

impl std::fmt::Debug for DraftStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftStore").field("key", &DRAFT_KEY).finish_non_exhaustive()
    }
}

impl DraftStore {
    /// Creates a store over `storage`, keyed by [`DRAFT_KEY`].
    #[must_use]
    pub fn new(storage: Arc<dyn DraftStorage>) -> Self {
        Self { storage }
    }

    /// The persisted draft, or `None` when absent or unreadable.
    ///
    /// Corrupt content is logged and treated as absent.
    #[must_use]
    pub fn load_existing(&self) -> Option<LessonInput> {
        let raw = match self.storage.read(DRAFT_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = DRAFT_KEY, "No persisted draft");
                return None;
            }
            Err(e) => {
                warn!(key = DRAFT_KEY, error = %e, "Draft storage unreadable, using default");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(lesson) => Some(lesson),
            Err(e) => {
                warn!(key = DRAFT_KEY, error = %e, "Persisted draft is corrupt, using default");
                None
            }
        }
    }

    /// The persisted draft, or the default lesson.
    #[must_use]
    pub fn load(&self) -> LessonInput {
        self.load_existing().unwrap_or_default()
    }

    /// Serializes and writes the draft.
    pub fn save(&self, lesson: &LessonInput) -> Result<(), PersistError> {
        let encoded = Self::encode(lesson)?;
        self.write_encoded(&encoded)
    }

    /// Removes the persisted draft.
    pub fn clear(&self) -> Result<(), PersistError> {
        self.storage.remove(DRAFT_KEY)
    }

    pub(crate) fn encode(lesson: &LessonInput) -> Result<String, PersistError> {
        Ok(serde_json::to_string(lesson)?)
    }

    pub(crate) fn write_encoded(&self, encoded: &str) -> Result<(), PersistError> {
        self.storage.write(DRAFT_KEY, encoded)
    }
}
