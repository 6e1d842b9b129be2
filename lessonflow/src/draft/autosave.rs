//! Debounced background writer for the lesson draft.
//!
//! Every [`DraftAutosaver::notify`] restarts the quiet-period timer; the draft
//! is written once the timer expires without a newer edit. Write failures only
//! flip the status back to [`SaveStatus::Unsaved`]; the next edit retries.

use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::DraftStore;
use crate::core::SaveStatus;
use crate::events::{EventSink, DRAFT_SAVED, DRAFT_SAVE_FAILED};
use crate::model::LessonInput;

enum Command {
    Update(LessonInput),
    Flush(oneshot::Sender<()>),
    Clear(oneshot::Sender<()>),
}

/// Handle to the autosave task.
///
/// Dropping the handle closes the channel; the task writes any pending draft
/// and exits.
pub struct DraftAutosaver {
    commands: mpsc::UnboundedSender<Command>,
    status: Arc<watch::Sender<SaveStatus>>,
    latest: Arc<Mutex<LessonInput>>,
    task: JoinHandle<()>,
}

impl std::fmt::Debug for DraftAutosaver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftAutosaver")
            .field("status", &*self.status.borrow())
            .finish_non_exhaustive()
    }
}

impl DraftAutosaver {
    /// Loads the draft from `store` and starts the autosave task.
    ///
    /// Returns the handle and the loaded lesson. Must be called inside a
    /// tokio runtime.
    pub fn start(
        store: DraftStore,
        delay: Duration,
        sink: Arc<dyn EventSink>,
    ) -> (Self, LessonInput) {
        let existing = store.load_existing();
        let loaded = existing.is_some();
        let lesson = existing.unwrap_or_default();

        let last_digest = if loaded {
            DraftStore::encode(&lesson).ok().map(|json| digest(&json))
        } else {
            None
        };
        let initial = if loaded { SaveStatus::Saved } else { SaveStatus::Unsaved };

        let (tx, rx) = mpsc::unbounded_channel();
        let status = Arc::new(watch::Sender::new(initial));
        let worker = Worker {
            store,
            delay,
            sink,
            status: Arc::clone(&status),
            last_digest,
        };
        let task = tokio::spawn(worker.run(rx));
        debug!(?delay, loaded, "Draft autosaver started");

        let saver = Self {
            commands: tx,
            status,
            latest: Arc::new(Mutex::new(lesson.clone())),
            task,
        };
        (saver, lesson)
    }

    /// Records a new lesson value and restarts the debounce window.
    pub fn notify(&self, lesson: &LessonInput) {
        *self.latest.lock() = lesson.clone();
        self.status.send_replace(SaveStatus::Unsaved);
        if self.commands.send(Command::Update(lesson.clone())).is_err() {
            warn!("Draft autosaver task has stopped, edit kept in memory only");
        }
    }

    /// Writes the pending draft now, if any.
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.commands.send(Command::Flush(tx)).is_ok() {
            let _ = rx.await;
        }
    }

    /// Drops the pending draft and removes the persisted one.
    pub async fn clear(&self) {
        *self.latest.lock() = LessonInput::default();
        let (tx, rx) = oneshot::channel();
        if self.commands.send(Command::Clear(tx)).is_ok() {
            let _ = rx.await;
        }
    }

    /// The current save status.
    #[must_use]
    pub fn status(&self) -> SaveStatus {
        *self.status.borrow()
    }

    /// Watches save status changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.status.subscribe()
    }

    /// The most recently notified lesson, saved or not.
    #[must_use]
    pub fn latest(&self) -> LessonInput {
        self.latest.lock().clone()
    }

    /// Flushes and waits for the task to exit.
    pub async fn shutdown(self) {
        self.flush().await;
        let Self { commands, task, .. } = self;
        drop(commands);
        if let Err(e) = task.await {
            warn!(error = %e, "Draft autosaver task ended abnormally");
        }
    }
}

fn digest(json: &str) -> String {
    hex::encode(Sha256::digest(json.as_bytes()))
}

struct Worker {
    store: DraftStore,
    delay: Duration,
    sink: Arc<dyn EventSink>,
    status: Arc<watch::Sender<SaveStatus>>,
    last_digest: Option<String>,
}

impl Worker {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command>) {
        let mut pending: Option<LessonInput> = None;
        let mut deadline = Instant::now();

        loop {
            tokio::select! {
                command = rx.recv() => match command {
                    Some(Command::Update(lesson)) => {
                        pending = Some(lesson);
                        deadline = Instant::now() + self.delay;
                    }
                    Some(Command::Flush(done)) => {
                        if let Some(lesson) = pending.take() {
                            self.persist(&lesson);
                        }
                        let _ = done.send(());
                    }
                    Some(Command::Clear(done)) => {
                        pending = None;
                        self.last_digest = None;
                        match self.store.clear() {
                            Ok(()) => debug!("Draft cleared"),
                            Err(e) => warn!(error = %e, "Failed to clear draft"),
                        }
                        self.status.send_replace(SaveStatus::Unsaved);
                        let _ = done.send(());
                    }
                    None => {
                        if let Some(lesson) = pending.take() {
                            self.persist(&lesson);
                        }
                        break;
                    }
                },
                () = tokio::time::sleep_until(deadline), if pending.is_some() => {
                    if let Some(lesson) = pending.take() {
                        self.persist(&lesson);
                    }
                }
            }
        }
        debug!("Draft autosaver stopped");
    }

    fn persist(&mut self, lesson: &LessonInput) {
        self.status.send_replace(SaveStatus::Saving);

        let encoded = match DraftStore::encode(lesson) {
            Ok(encoded) => encoded,
            Err(e) => {
                self.fail(&e.to_string());
                return;
            }
        };

        let hash = digest(&encoded);
        if self.last_digest.as_deref() == Some(hash.as_str()) {
            debug!("Draft unchanged, skipping write");
            self.status.send_replace(SaveStatus::Saved);
            return;
        }

        match self.store.write_encoded(&encoded) {
            Ok(()) => {
                info!(bytes = encoded.len(), "Draft saved");
                self.last_digest = Some(hash);
                self.status.send_replace(SaveStatus::Saved);
                self.sink.try_emit(
                    DRAFT_SAVED,
                    Some(serde_json::json!({ "bytes": encoded.len() })),
                );
            }
            Err(e) => self.fail(&e.to_string()),
        }
    }

    fn fail(&self, error: &str) {
        warn!(error = %error, "Draft save failed");
        self.status.send_replace(SaveStatus::Unsaved);
        self.sink
            .try_emit(DRAFT_SAVE_FAILED, Some(serde_json::json!({ "error": error })));
    }
}
