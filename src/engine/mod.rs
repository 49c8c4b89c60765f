// ABOUTME: Workflow scheduling engine module
// ABOUTME: Handles graph validation, dependency-driven dispatch, and run bookkeeping

pub mod error;
pub mod graph;
pub mod ledger;
pub mod orchestrator;
pub mod result;
pub mod scheduler;

pub use error::{Result, SchedulerError};
pub use graph::{WorkflowGraph, WorkflowNode};
pub use ledger::{ExecutionLedger, ExecutionRecord, SystemStatusReport, WorkflowStatusReport};
pub use orchestrator::Orchestrator;
pub use result::{NodeOutcome, RunStatus, RunSummary, WorkflowRunResult};
pub use scheduler::SchedulerConfig;
