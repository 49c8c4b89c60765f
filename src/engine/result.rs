// ABOUTME: Aggregate result types for a single workflow run
// ABOUTME: A finished run is always Completed; per-node failures are data, not errors

use indexmap::IndexMap;
use serde::Serialize;

use super::ledger::ExecutionRecord;
use crate::executor::TaskOutput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeOutcome {
    Success,
    Timeout,
    Error,
}

impl std::fmt::Display for NodeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeOutcome::Success => write!(f, "success"),
            NodeOutcome::Timeout => write!(f, "timeout"),
            NodeOutcome::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Completed,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub total_nodes: usize,
    pub succeeded: usize,
    pub timed_out: usize,
    pub failed: usize,
}

/// Everything `execute_workflow` hands back for one run: per-node outputs in
/// declaration order, the execution records appended during the run, and a
/// summary. Present only when every node reached a terminal outcome.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowRunResult {
    pub workflow_id: String,
    pub run_id: String,
    pub status: RunStatus,
    pub results: IndexMap<String, TaskOutput>,
    pub records: Vec<ExecutionRecord>,
    pub summary: RunSummary,
}

impl WorkflowRunResult {
    pub(crate) fn new(
        workflow_id: String,
        run_id: String,
        results: IndexMap<String, TaskOutput>,
        records: Vec<ExecutionRecord>,
    ) -> Self {
        let summary = RunSummary {
            total_nodes: records.len(),
            succeeded: records
                .iter()
                .filter(|r| r.outcome == NodeOutcome::Success)
                .count(),
            timed_out: records
                .iter()
                .filter(|r| r.outcome == NodeOutcome::Timeout)
                .count(),
            failed: records
                .iter()
                .filter(|r| r.outcome == NodeOutcome::Error)
                .count(),
        };

        Self {
            workflow_id,
            run_id,
            status: RunStatus::Completed,
            results,
            records,
            summary,
        }
    }

    pub fn output_of(&self, node_id: &str) -> Option<&TaskOutput> {
        self.results.get(node_id)
    }

    pub fn has_failures(&self) -> bool {
        self.summary.timed_out + self.summary.failed > 0
    }
}
