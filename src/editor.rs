use std::sync::Arc;

use tracing::{debug, info};

use crate::error::ValidationError;
use crate::model::{parse_time, Task, TaskStore};
use crate::notify::{Notifier, Toaster};

/// The text and time currently typed in, and the task they edit, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub text: String,
    pub time: String,
    pub editing: Option<u32>,
}

impl Draft {
    fn clear(&mut self) {
        *self = Draft::default();
    }
}

/// Whether a submit creates a task or overwrites one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Idle,
    Editing(u32),
}

/// The outcome of a successful submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Added(Task),
    Updated(u32),
}

/// Every change to the task list goes through here.
pub struct Editor {
    store: TaskStore,
    draft: Draft,
    last_submitted: Option<String>,
    toaster: Arc<dyn Toaster>,
    notifier: Notifier,
}

impl Editor {
    pub fn new(toaster: Arc<dyn Toaster>, notifier: Notifier) -> Self {
        Editor {
            store: TaskStore::new(),
            draft: Draft::default(),
            last_submitted: None,
            toaster,
            notifier,
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn mode(&self) -> EditMode {
        match self.draft.editing {
            Some(id) => EditMode::Editing(id),
            None => EditMode::Idle,
        }
    }

    /// "<text> at <time>" for the most recently added task.
    pub fn last_submitted(&self) -> Option<&str> {
        self.last_submitted.as_deref()
    }

    pub fn set_text(&mut self, text: &str) {
        self.draft.text = text.to_string();
    }

    pub fn set_time(&mut self, time: &str) {
        self.draft.time = time.to_string();
    }

    /// Validate the draft and either add it as a new task or write it over
    /// the task being edited. On failure the error is toasted and nothing
    /// changes.
    pub fn submit(&mut self) -> Result<Submission, ValidationError> {
        if let Err(err) = self.validate_draft() {
            self.toaster.error(&err.to_string());
            return Err(err);
        }

        let time = self.draft.time.trim().to_string();
        let submission = match self.draft.editing {
            Some(id) => {
                if self.store.update(id, &self.draft.text, &time) {
                    info!(id, "task updated");
                    self.toaster.success("Task updated successfully");
                } else {
                    debug!(id, "edited task vanished before submit");
                }
                Submission::Updated(id)
            }
            None => {
                let task = self.store.add(&self.draft.text, &time);
                info!(id = task.id, time = %task.time, "task added");
                let summary = format!("{} at {}", task.text, task.time);
                self.notifier.notify(&format!("Task submitted: {}", summary));
                self.last_submitted = Some(summary);
                Submission::Added(task)
            }
        };

        self.draft.clear();
        Ok(submission)
    }

    /// Load a task into the draft. Unknown ids leave the draft as it is.
    pub fn begin_edit(&mut self, id: u32) -> bool {
        match self.store.get(id) {
            Some(task) => {
                self.draft = Draft {
                    text: task.text.clone(),
                    time: task.time.clone(),
                    editing: Some(id),
                };
                debug!(id, "editing task");
                true
            }
            None => {
                debug!(id, "edit of unknown task ignored");
                false
            }
        }
    }

    /// Remove a task. Whatever was being edited is abandoned, even when it
    /// was another task.
    pub fn delete(&mut self, id: u32) -> Option<Task> {
        let removed = self.store.remove(id);
        if removed.is_some() {
            info!(id, "task deleted");
        }
        self.draft.clear();
        removed
    }

    fn validate_draft(&self) -> Result<(), ValidationError> {
        if self.draft.text.trim().is_empty() || self.draft.time.trim().is_empty() {
            return Err(ValidationError::MissingInput);
        }
        parse_time(&self.draft.time)?;
        Ok(())
    }
}
