// ABOUTME: Orchestrator facade tying together registry, workflows, and ledger
// ABOUTME: Public entry point for registration, submission, execution, and status

use indexmap::IndexMap;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use super::error::{Result, SchedulerError};
use super::graph::{WorkflowGraph, WorkflowNode};
use super::ledger::{ExecutionLedger, SystemStatusReport, WorkflowStatusReport};
use super::result::WorkflowRunResult;
use super::scheduler::{run_graph, SchedulerConfig};
use crate::executor::{Executor, ExecutorStatus, TaskMessage};

/// Coordinates a set of registered executors against submitted workflow
/// graphs. The registry is mutated only through registration calls, never
/// during a run; per-run completed/results state is owned exclusively by
/// the scheduling loop.
pub struct Orchestrator {
    executors: IndexMap<String, Arc<dyn Executor>>,
    workflows: HashMap<String, WorkflowGraph>,
    ledger: Arc<ExecutionLedger>,
    config: SchedulerConfig,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    pub fn with_config(config: SchedulerConfig) -> Self {
        Self {
            executors: IndexMap::new(),
            workflows: HashMap::new(),
            ledger: Arc::new(ExecutionLedger::new()),
            config,
        }
    }

    /// Add an executor to the registry. Registration order is the order
    /// candidates are considered when matching a node to an executor.
    pub fn register(&mut self, executor: Arc<dyn Executor>) -> Result<()> {
        let id = executor.descriptor().id.clone();
        if self.executors.contains_key(&id) {
            return Err(SchedulerError::DuplicateExecutor { executor_id: id });
        }
        info!(executor_id = %id, "registered executor");
        self.executors.insert(id, executor);
        Ok(())
    }

    /// Remove an executor from the registry.
    pub fn deregister(&mut self, executor_id: &str) -> Result<Arc<dyn Executor>> {
        self.executors
            .shift_remove(executor_id)
            .ok_or_else(|| SchedulerError::ExecutorNotFound {
                executor_id: executor_id.to_string(),
            })
    }

    /// Store a workflow definition. Validates node ids and dependency
    /// references; resubmitting an existing id replaces the definition.
    pub fn create_workflow(
        &mut self,
        workflow_id: impl Into<String>,
        nodes: Vec<WorkflowNode>,
    ) -> Result<()> {
        let workflow_id = workflow_id.into();
        let graph = WorkflowGraph::new(workflow_id.clone(), nodes)?;
        info!(workflow_id = %workflow_id, nodes = graph.len(), "created workflow");
        self.workflows.insert(workflow_id, graph);
        Ok(())
    }

    /// Run a previously created workflow to completion. Every node reaches a
    /// terminal outcome (success, timeout, or error) before this returns; a
    /// run that can make no further progress fails with `Stalled`, carrying
    /// the partial results accumulated so far.
    #[instrument(skip(self, initial_inputs))]
    pub async fn execute_workflow(
        &self,
        workflow_id: &str,
        initial_inputs: Value,
    ) -> Result<WorkflowRunResult> {
        let graph = self
            .workflows
            .get(workflow_id)
            .ok_or_else(|| SchedulerError::WorkflowNotFound {
                workflow_id: workflow_id.to_string(),
            })?;

        let run_id = Uuid::new_v4().to_string();
        run_graph(
            graph,
            &run_id,
            &initial_inputs,
            &self.executors,
            &self.ledger,
            &self.config,
        )
        .await
    }

    /// Deliver a message to the recipient executor's mailbox.
    pub fn route_message(&self, message: TaskMessage) -> Result<()> {
        let executor = self.executors.get(&message.recipient_id).ok_or_else(|| {
            SchedulerError::ExecutorNotFound {
                executor_id: message.recipient_id.clone(),
            }
        })?;

        executor
            .receive(message)
            .map_err(|err| SchedulerError::MessageUndeliverable {
                executor_id: executor.descriptor().id.clone(),
                reason: err.to_string(),
            })
    }

    /// Read-only status of one workflow, derived from the ledger. Safe to
    /// call concurrently with an in-progress run.
    pub fn get_workflow_status(&self, workflow_id: &str) -> Result<WorkflowStatusReport> {
        let graph = self
            .workflows
            .get(workflow_id)
            .ok_or_else(|| SchedulerError::WorkflowNotFound {
                workflow_id: workflow_id.to_string(),
            })?;

        let records = self.ledger.records_for(workflow_id);
        let completed_nodes = match records.last() {
            Some(latest) => {
                let run_id = latest.run_id.clone();
                records
                    .iter()
                    .filter(|r| r.run_id == run_id)
                    .map(|r| r.node_id.as_str())
                    .collect::<HashSet<_>>()
                    .len()
            }
            None => 0,
        };

        Ok(WorkflowStatusReport {
            workflow_id: workflow_id.to_string(),
            total_nodes: graph.len(),
            completed_nodes,
            records,
        })
    }

    /// Read-only snapshot of the whole system.
    pub fn get_system_status(&self) -> SystemStatusReport {
        SystemStatusReport {
            executor_count: self.executors.len(),
            workflow_count: self.workflows.len(),
            executors: self.executors.values().map(|e| e.status()).collect(),
            total_execution_records: self.ledger.len(),
        }
    }

    pub fn executor_status(&self, executor_id: &str) -> Result<ExecutorStatus> {
        self.executors
            .get(executor_id)
            .map(|e| e.status())
            .ok_or_else(|| SchedulerError::ExecutorNotFound {
                executor_id: executor_id.to_string(),
            })
    }

    pub fn ledger(&self) -> &ExecutionLedger {
        &self.ledger
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("executors", &self.executors.keys().collect::<Vec<_>>())
            .field("workflows", &self.workflows.keys().collect::<Vec<_>>())
            .field("ledger_records", &self.ledger.len())
            .finish()
    }
}
