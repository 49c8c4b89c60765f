// ABOUTME: Task payload and output types crossing the executor boundary
// ABOUTME: TaskOutput keeps the success/error contract statically checkable

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Failure raised by an executor's `execute`. The scheduler maps these to
/// execution records; they never abort a workflow run.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("task failed: {message}")]
    TaskFailed { message: String },

    #[error("unsupported action: {action}")]
    UnsupportedAction { action: String },

    #[error("invalid task payload: {message}")]
    InvalidPayload { message: String },

    #[error("mailbox full for executor {executor_id} (capacity {capacity})")]
    MailboxFull { executor_id: String, capacity: usize },
}

/// Terminal output of a workflow node, visible to its dependents.
///
/// Serializes untagged: a success is the raw result value, an error is
/// exactly `{"error": "..."}`. Dependents of a failed node receive the
/// error variant as their upstream input and must tolerate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskOutput {
    Error { error: String },
    Success(Value),
}

impl TaskOutput {
    pub fn success(value: Value) -> Self {
        TaskOutput::Success(value)
    }

    pub fn error(message: impl Into<String>) -> Self {
        TaskOutput::Error {
            error: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, TaskOutput::Error { .. })
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            TaskOutput::Success(value) => Some(value),
            TaskOutput::Error { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            TaskOutput::Error { error } => Some(error),
            TaskOutput::Success(_) => None,
        }
    }
}

/// Everything an executor sees for one dispatched node: the node's own
/// configuration, the workflow's initial inputs, and the outputs of every
/// upstream dependency in declaration order.
#[derive(Debug, Clone, Serialize)]
pub struct TaskPayload {
    pub config: Value,
    pub initial_inputs: Value,
    pub dependency_results: IndexMap<String, TaskOutput>,
}

impl TaskPayload {
    pub fn new(config: Value, initial_inputs: Value) -> Self {
        Self {
            config,
            initial_inputs,
            dependency_results: IndexMap::new(),
        }
    }

    pub fn with_dependency_results(
        mut self,
        results: IndexMap<String, TaskOutput>,
    ) -> Self {
        self.dependency_results = results;
        self
    }

    /// True iff any upstream dependency ended in an error outcome.
    pub fn has_failed_dependency(&self) -> bool {
        self.dependency_results.values().any(TaskOutput::is_error)
    }
}
