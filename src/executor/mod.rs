// ABOUTME: Capability contract for pluggable task executors
// ABOUTME: Defines the Executor trait, identity descriptor, and provided helpers

pub mod message;
pub mod state;
pub mod task;

pub use message::{MessageKind, TaskMessage};
pub use state::{Availability, ExecutorState, ExecutorStatus, HistoryEvent};
pub use task::{ExecutionError, TaskOutput, TaskPayload};

use async_trait::async_trait;
use serde_json::Value;

/// Immutable identity of an executor: who it is and what it can do.
#[derive(Debug, Clone)]
pub struct ExecutorDescriptor {
    pub id: String,
    pub name: String,
    pub capabilities: Vec<String>,
}

impl ExecutorDescriptor {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        capabilities: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            capabilities,
        }
    }
}

/// Contract every task executor satisfies.
///
/// Implementations provide their descriptor, a shared state handle, and the
/// actual unit of work in `execute`. Capability matching, message receipt,
/// and status snapshots come for free from the provided methods.
#[async_trait]
pub trait Executor: Send + Sync {
    fn descriptor(&self) -> &ExecutorDescriptor;

    fn state(&self) -> &ExecutorState;

    /// Perform the unit of work. May suspend on I/O. A failure is returned
    /// as an `ExecutionError` which the scheduler maps to a ledger record;
    /// executors never touch scheduler state directly.
    async fn execute(&self, payload: TaskPayload) -> std::result::Result<Value, ExecutionError>;

    /// True iff `capability` is in this executor's declared capability set.
    fn can_handle(&self, capability: &str) -> bool {
        self.descriptor()
            .capabilities
            .iter()
            .any(|c| c == capability)
    }

    /// Append a message to the inbound mailbox and record a history event.
    /// Does not process the message.
    fn receive(&self, message: TaskMessage) -> std::result::Result<(), ExecutionError> {
        self.state().enqueue(&self.descriptor().id, message)
    }

    /// Side-effect-free snapshot of the executor's current state.
    fn status(&self) -> ExecutorStatus {
        self.state().snapshot(self.descriptor())
    }
}

impl std::fmt::Debug for dyn Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("descriptor", self.descriptor())
            .finish()
    }
}
