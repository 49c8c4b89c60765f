// ABOUTME: Error types for workflow scheduling and orchestration
// ABOUTME: Configuration and stall failures are workflow-level, node failures are data

use indexmap::IndexMap;
use thiserror::Error;

use crate::executor::TaskOutput;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("workflow not found: {workflow_id}")]
    WorkflowNotFound { workflow_id: String },

    #[error("duplicate node id '{node_id}' in workflow {workflow_id}")]
    DuplicateNode {
        workflow_id: String,
        node_id: String,
    },

    #[error("node '{node_id}' depends on unknown node '{dependency}'")]
    UnknownDependency { node_id: String, dependency: String },

    #[error("node '{node_id}' depends on itself")]
    SelfDependency { node_id: String },

    #[error("circular dependency detected involving: {nodes:?}")]
    CircularDependency { nodes: Vec<String> },

    #[error("executor already registered: {executor_id}")]
    DuplicateExecutor { executor_id: String },

    #[error("executor not found: {executor_id}")]
    ExecutorNotFound { executor_id: String },

    #[error("message undeliverable to {executor_id}: {reason}")]
    MessageUndeliverable {
        executor_id: String,
        reason: String,
    },

    #[error("workflow {workflow_id} stalled with pending nodes {pending:?}")]
    Stalled {
        workflow_id: String,
        pending: Vec<String>,
        results: IndexMap<String, TaskOutput>,
    },
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
