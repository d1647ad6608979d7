use chrono::NaiveTime;
use tracing::debug;

use crate::error::ValidationError;

/// A single to-do entry, held in memory for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: u32,
    pub text: String,
    pub time: String, // wall-clock "HH:MM", no date
}

impl Task {
    /// A task can be confirmed only when both its description and its time
    /// are filled in.
    pub fn is_complete(&self) -> bool {
        !self.text.trim().is_empty() && !self.time.is_empty()
    }

    /// The scheduled time of day.
    pub fn scheduled_time(&self) -> Result<NaiveTime, ValidationError> {
        parse_time(&self.time)
    }
}

/// Parse a wall-clock time in the "HH:MM" format. Both fields need two
/// digits, so "9:5" is refused rather than stored as typed.
pub fn parse_time(time: &str) -> Result<NaiveTime, ValidationError> {
    let invalid = || ValidationError::InvalidTime(time.to_string());
    let bytes = time.trim().as_bytes();
    let well_formed = bytes.len() == 5
        && bytes[2] == b':'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 2 || b.is_ascii_digit());
    if !well_formed {
        return Err(invalid());
    }
    NaiveTime::parse_from_str(time.trim(), "%H:%M").map_err(|_| invalid())
}

/// The ordered list of tasks. Ids come from a counter that only moves
/// forward, so a deleted task's id is never handed out again.
#[derive(Debug)]
pub struct TaskStore {
    tasks: Vec<Task>,
    next_id: u32,
}

impl Default for TaskStore {
    fn default() -> Self {
        TaskStore {
            tasks: Vec::new(),
            next_id: 1,
        }
    }
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new task at the end of the list. No validation happens here,
    /// that is the editor's job.
    pub fn add(&mut self, text: &str, time: &str) -> Task {
        let task = Task {
            id: self.next_id,
            text: text.to_string(),
            time: time.to_string(),
        };
        self.next_id += 1;
        self.tasks.push(task.clone());
        task
    }

    /// Overwrite the text and time of a task, keeping its id and position.
    /// Returns false, and does nothing, if there is no such task.
    pub fn update(&mut self, id: u32, text: &str, time: &str) -> bool {
        match self.tasks.iter_mut().find(|task| task.id == id) {
            Some(task) => {
                task.text = text.to_string();
                task.time = time.to_string();
                true
            }
            None => {
                debug!(id, "update of unknown task ignored");
                false
            }
        }
    }

    /// Remove a task. Does nothing if there is no such task.
    pub fn remove(&mut self, id: u32) -> Option<Task> {
        let position = self.tasks.iter().position(|task| task.id == id);
        match position {
            Some(position) => Some(self.tasks.remove(position)),
            None => {
                debug!(id, "removal of unknown task ignored");
                None
            }
        }
    }

    /// All tasks, in insertion order.
    pub fn list(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: u32) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn first(&self) -> Option<&Task> {
        self.tasks.first()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
