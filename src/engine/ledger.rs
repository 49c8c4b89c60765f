// ABOUTME: Append-only ledger of per-node execution outcomes
// ABOUTME: Records are never mutated or removed, so reads are safe mid-run

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::RwLock;

use super::result::NodeOutcome;
use crate::executor::ExecutorStatus;

/// One outcome for one (workflow, node, attempt). Never mutated after append.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionRecord {
    pub workflow_id: String,
    pub run_id: String,
    pub node_id: String,
    pub executor_id: String,
    pub outcome: NodeOutcome,
    pub error: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl ExecutionRecord {
    pub fn new(
        workflow_id: impl Into<String>,
        run_id: impl Into<String>,
        node_id: impl Into<String>,
        executor_id: impl Into<String>,
        outcome: NodeOutcome,
        error: Option<String>,
    ) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            run_id: run_id.into(),
            node_id: node_id.into(),
            executor_id: executor_id.into(),
            outcome,
            error,
            recorded_at: Utc::now(),
        }
    }
}

/// Append-only record store. The only write is an atomic append, so readers
/// may query workflow or system status concurrently with an in-progress run.
#[derive(Debug, Default)]
pub struct ExecutionLedger {
    records: RwLock<Vec<ExecutionRecord>>,
}

impl ExecutionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, record: ExecutionRecord) {
        self.records
            .write()
            .expect("execution ledger poisoned")
            .push(record);
    }

    pub fn len(&self) -> usize {
        self.records.read().expect("execution ledger poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn records_for(&self, workflow_id: &str) -> Vec<ExecutionRecord> {
        self.records
            .read()
            .expect("execution ledger poisoned")
            .iter()
            .filter(|r| r.workflow_id == workflow_id)
            .cloned()
            .collect()
    }

    pub fn records_for_run(&self, run_id: &str) -> Vec<ExecutionRecord> {
        self.records
            .read()
            .expect("execution ledger poisoned")
            .iter()
            .filter(|r| r.run_id == run_id)
            .cloned()
            .collect()
    }

    pub fn snapshot(&self) -> Vec<ExecutionRecord> {
        self.records
            .read()
            .expect("execution ledger poisoned")
            .clone()
    }
}

/// Per-workflow view over the ledger, as returned by `get_workflow_status`.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowStatusReport {
    pub workflow_id: String,
    pub total_nodes: usize,
    pub completed_nodes: usize,
    pub records: Vec<ExecutionRecord>,
}

/// System-wide view, as returned by `get_system_status`.
#[derive(Debug, Clone, Serialize)]
pub struct SystemStatusReport {
    pub executor_count: usize,
    pub workflow_count: usize,
    pub executors: Vec<ExecutorStatus>,
    pub total_execution_records: usize,
}
