//! Draft persistence for the lesson form.
//!
//! - [`DraftStorage`]: a durable key-value slot (file or memory)
//! - [`DraftStore`]: typed load/save/clear of the lesson draft
//! - [`DraftAutosaver`]: debounced background writer reporting [`SaveStatus`]
//!
//! [`SaveStatus`]: crate::core::SaveStatus

mod autosave;
mod storage;
mod store;

pub use autosave::DraftAutosaver;
pub use storage::{DraftStorage, FileStorage, MemoryStorage};
pub use store::{DraftStore, DRAFT_KEY};
