// ABOUTME: Executor availability state, bounded mailbox, and interaction history
// ABOUTME: Claiming an executor is an atomic compare-and-set relative to dispatch

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;

use super::message::TaskMessage;
use super::task::ExecutionError;
use super::ExecutorDescriptor;

pub const DEFAULT_MAILBOX_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Idle,
    Busy,
    Waiting,
    Completed,
    Failed,
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Availability::Idle => write!(f, "idle"),
            Availability::Busy => write!(f, "busy"),
            Availability::Waiting => write!(f, "waiting"),
            Availability::Completed => write!(f, "completed"),
            Availability::Failed => write!(f, "failed"),
        }
    }
}

/// One append-only entry in an executor's interaction history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEvent {
    pub event: String,
    pub detail: Option<String>,
    pub at: DateTime<Utc>,
}

impl HistoryEvent {
    fn new(event: &str, detail: Option<String>) -> Self {
        Self {
            event: event.to_string(),
            detail,
            at: Utc::now(),
        }
    }
}

/// Side-effect-free snapshot of an executor, as returned by `Executor::status`.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutorStatus {
    pub id: String,
    pub name: String,
    pub availability: Availability,
    pub capabilities: Vec<String>,
    pub queue_depth: usize,
    pub current_task: Option<String>,
}

#[derive(Debug)]
struct StateInner {
    availability: Availability,
    current_task: Option<String>,
    mailbox: VecDeque<TaskMessage>,
    history: Vec<HistoryEvent>,
}

/// Mutable executor state shared between the executor and the scheduler.
///
/// Availability is the only field mutated from both sides, so every
/// transition goes through this mutex. Critical sections are short and
/// never held across an await point.
#[derive(Debug)]
pub struct ExecutorState {
    inner: Mutex<StateInner>,
    mailbox_capacity: usize,
}

impl ExecutorState {
    pub fn new() -> Self {
        Self::with_mailbox_capacity(DEFAULT_MAILBOX_CAPACITY)
    }

    pub fn with_mailbox_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(StateInner {
                availability: Availability::Idle,
                current_task: None,
                mailbox: VecDeque::new(),
                history: Vec::new(),
            }),
            mailbox_capacity: capacity,
        }
    }

    pub fn availability(&self) -> Availability {
        self.inner.lock().expect("executor state poisoned").availability
    }

    pub fn current_task(&self) -> Option<String> {
        self.inner
            .lock()
            .expect("executor state poisoned")
            .current_task
            .clone()
    }

    /// Atomically claim this executor for a node. Succeeds only from `Idle`,
    /// transitioning to `Busy`; two scheduler passes can never both win.
    pub fn try_claim(&self, node_id: &str) -> bool {
        let mut inner = self.inner.lock().expect("executor state poisoned");
        if inner.availability != Availability::Idle {
            return false;
        }
        inner.availability = Availability::Busy;
        inner.current_task = Some(node_id.to_string());
        inner
            .history
            .push(HistoryEvent::new("claimed", Some(node_id.to_string())));
        true
    }

    /// Record the terminal outcome of the current task:
    /// `Busy -> Completed` on success, `Busy -> Failed` otherwise.
    pub fn settle(&self, success: bool) {
        let mut inner = self.inner.lock().expect("executor state poisoned");
        inner.availability = if success {
            Availability::Completed
        } else {
            Availability::Failed
        };
        let task = inner.current_task.take();
        let event = if success { "completed" } else { "failed" };
        inner.history.push(HistoryEvent::new(event, task));
    }

    /// Return to `Idle` so the executor can be dispatched again.
    pub fn reset(&self) {
        let mut inner = self.inner.lock().expect("executor state poisoned");
        inner.availability = Availability::Idle;
        inner.current_task = None;
    }

    /// Append a message to the bounded mailbox, recording a history event.
    pub(crate) fn enqueue(
        &self,
        executor_id: &str,
        message: TaskMessage,
    ) -> Result<(), ExecutionError> {
        let mut inner = self.inner.lock().expect("executor state poisoned");
        if inner.mailbox.len() >= self.mailbox_capacity {
            return Err(ExecutionError::MailboxFull {
                executor_id: executor_id.to_string(),
                capacity: self.mailbox_capacity,
            });
        }
        inner.history.push(HistoryEvent::new(
            "message_received",
            Some(format!(
                "{} from {}",
                message.message_id, message.sender_id
            )),
        ));
        inner.mailbox.push_back(message);
        Ok(())
    }

    /// Pop the oldest message from the mailbox, if any.
    pub fn next_message(&self) -> Option<TaskMessage> {
        self.inner
            .lock()
            .expect("executor state poisoned")
            .mailbox
            .pop_front()
    }

    pub fn queue_depth(&self) -> usize {
        self.inner.lock().expect("executor state poisoned").mailbox.len()
    }

    pub fn history(&self) -> Vec<HistoryEvent> {
        self.inner
            .lock()
            .expect("executor state poisoned")
            .history
            .clone()
    }

    pub(crate) fn snapshot(&self, descriptor: &ExecutorDescriptor) -> ExecutorStatus {
        let inner = self.inner.lock().expect("executor state poisoned");
        ExecutorStatus {
            id: descriptor.id.clone(),
            name: descriptor.name.clone(),
            availability: inner.availability,
            capabilities: descriptor.capabilities.clone(),
            queue_depth: inner.mailbox.len(),
            current_task: inner.current_task.clone(),
        }
    }
}

impl Default for ExecutorState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_claim_requires_idle() {
        let state = ExecutorState::new();
        assert_eq!(state.availability(), Availability::Idle);

        assert!(state.try_claim("node-1"));
        assert_eq!(state.availability(), Availability::Busy);
        assert_eq!(state.current_task(), Some("node-1".to_string()));

        // Already busy, a second claim must lose
        assert!(!state.try_claim("node-2"));
        assert_eq!(state.current_task(), Some("node-1".to_string()));
    }

    #[test]
    fn test_settle_and_reset_cycle() {
        let state = ExecutorState::new();

        assert!(state.try_claim("node-1"));
        state.settle(true);
        assert_eq!(state.availability(), Availability::Completed);
        assert_eq!(state.current_task(), None);

        state.reset();
        assert_eq!(state.availability(), Availability::Idle);
        assert!(state.try_claim("node-2"));

        state.settle(false);
        assert_eq!(state.availability(), Availability::Failed);

        state.reset();
        assert_eq!(state.availability(), Availability::Idle);
    }

    #[test]
    fn test_mailbox_bound() {
        let state = ExecutorState::with_mailbox_capacity(2);

        let msg = |n: u64| TaskMessage::task("a", "b", json!({ "n": n }));
        assert!(state.enqueue("worker", msg(1)).is_ok());
        assert!(state.enqueue("worker", msg(2)).is_ok());

        let err = state.enqueue("worker", msg(3)).unwrap_err();
        assert!(matches!(err, ExecutionError::MailboxFull { capacity: 2, .. }));

        // Draining frees capacity again
        assert!(state.next_message().is_some());
        assert!(state.enqueue("worker", msg(4)).is_ok());
        assert_eq!(state.queue_depth(), 2);
    }

    #[test]
    fn test_history_records_transitions() {
        let state = ExecutorState::new();
        assert!(state.try_claim("node-1"));
        state.settle(true);

        let history = state.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].event, "claimed");
        assert_eq!(history[1].event, "completed");
        assert_eq!(history[1].detail, Some("node-1".to_string()));
    }
}
