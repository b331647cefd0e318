//! Task — one end-to-end question-answering session.
//!
//! A task owns its scratchpad exclusively; nothing is shared between
//! concurrent tasks except the bridge's pending-request table. Depth
//! counts completed actions and only ever moves forward; the loop bumps
//! it after each injected observation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Terminal state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Pending,
    Answered,
    Aborted,
}

/// One reasoning session: the original question plus everything emitted
/// so far (model output and injected observations).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub question: String,
    pub scratchpad: String,
    pub depth: u32,
    pub state: TaskState,
}

impl Task {
    pub fn new(id: TaskId, question: impl Into<String>) -> Self {
        Self {
            id,
            question: question.into(),
            scratchpad: String::new(),
            depth: 0,
            state: TaskState::Pending,
        }
    }

    /// Append a segment to the scratchpad. The scratchpad is append-only.
    pub fn append(&mut self, segment: &str) {
        self.scratchpad.push_str(segment);
    }
}
