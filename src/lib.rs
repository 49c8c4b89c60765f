// ABOUTME: Main library module for the shepherd workflow orchestrator
// ABOUTME: Exports all core modules and provides the public API

pub mod engine;
pub mod executor;
pub mod workers;

// Re-export commonly used types
pub use engine::{
    ExecutionLedger, ExecutionRecord, NodeOutcome, Orchestrator, RunStatus, SchedulerConfig,
    SchedulerError, WorkflowGraph, WorkflowNode, WorkflowRunResult,
};
pub use executor::{
    Availability, ExecutionError, Executor, ExecutorDescriptor, ExecutorStatus, MessageKind,
    TaskMessage, TaskOutput, TaskPayload,
};

// Error handling
pub type Result<T> = anyhow::Result<T>;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
