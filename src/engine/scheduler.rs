// ABOUTME: Pass-based scheduling loop with bounded fan-out per pass
// ABOUTME: Readiness is recomputed each cycle; no explicit topological sort

use futures::future::join_all;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use super::error::{Result, SchedulerError};
use super::graph::{WorkflowGraph, WorkflowNode};
use super::ledger::{ExecutionLedger, ExecutionRecord};
use super::result::{NodeOutcome, WorkflowRunResult};
use crate::executor::{Executor, TaskOutput, TaskPayload};

/// Tuning knobs for the scheduling loop.
///
/// `stall_pass_limit` is how many consecutive passes may dispatch nothing
/// before the run is declared stalled; `pass_delay` is the sleep between
/// such passes so executor scarcity is not a tight busy-loop.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub pass_delay: Duration,
    pub stall_pass_limit: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            pass_delay: Duration::from_millis(100),
            stall_pass_limit: 2,
        }
    }
}

/// Execute every node of `graph` to a terminal outcome.
///
/// Each pass evaluates nodes in declaration order, claims the first idle
/// capability-matching executor per ready node, fans the claimed dispatches
/// out concurrently, and joins them before re-evaluating readiness. A node
/// with no available executor stays ready and is retried next pass. Timeout
/// and execution errors complete the node with an error output rather than
/// aborting the run.
pub(crate) async fn run_graph(
    graph: &WorkflowGraph,
    run_id: &str,
    initial_inputs: &Value,
    executors: &IndexMap<String, Arc<dyn Executor>>,
    ledger: &ExecutionLedger,
    config: &SchedulerConfig,
) -> Result<WorkflowRunResult> {
    graph.ensure_acyclic()?;

    let mut completed: HashSet<String> = HashSet::new();
    let mut results: IndexMap<String, TaskOutput> = IndexMap::new();
    let mut records: Vec<ExecutionRecord> = Vec::new();
    let mut idle_passes = 0u32;

    info!(
        workflow_id = %graph.workflow_id,
        run_id,
        nodes = graph.len(),
        "starting workflow run"
    );

    while completed.len() < graph.len() {
        let ready = graph.ready_nodes(&completed);
        if ready.is_empty() {
            // Cannot happen after validation, but never loop forever on it
            return Err(stalled(graph, &completed, results));
        }

        let mut dispatches = Vec::new();
        for node in ready {
            match claim_executor(executors, node) {
                Some(executor) => {
                    let payload = build_payload(node, initial_inputs, &results);
                    dispatches.push((node, executor, payload));
                }
                // Executor scarcity is backpressure, not an error; the node
                // stays ready and is retried next pass
                None => debug!(node_id = %node.node_id, "no idle executor, deferring"),
            }
        }

        if dispatches.is_empty() {
            idle_passes += 1;
            if idle_passes >= config.stall_pass_limit {
                warn!(
                    workflow_id = %graph.workflow_id,
                    run_id,
                    passes = idle_passes,
                    "no progress possible, declaring stall"
                );
                return Err(stalled(graph, &completed, results));
            }
            sleep(config.pass_delay).await;
            continue;
        }
        idle_passes = 0;

        debug!(
            workflow_id = %graph.workflow_id,
            run_id,
            dispatched = dispatches.len(),
            "executing pass"
        );

        let pass = dispatches.into_iter().map(|(node, executor, payload)| async move {
            let settled = dispatch_node(node, &*executor, payload).await;
            (node, executor, settled)
        });

        for (node, executor, settled) in join_all(pass).await {
            executor.state().settle(settled.outcome == NodeOutcome::Success);
            executor.state().reset();

            let record = ExecutionRecord::new(
                graph.workflow_id.clone(),
                run_id,
                node.node_id.clone(),
                executor.descriptor().id.clone(),
                settled.outcome,
                settled.error,
            );
            ledger.append(record.clone());
            records.push(record);

            results.insert(node.node_id.clone(), settled.output);
            completed.insert(node.node_id.clone());
        }

        // Cooperative scheduling point between passes
        tokio::task::yield_now().await;
    }

    info!(
        workflow_id = %graph.workflow_id,
        run_id,
        completed = completed.len(),
        "workflow run finished"
    );

    Ok(WorkflowRunResult::new(
        graph.workflow_id.clone(),
        run_id.to_string(),
        results,
        records,
    ))
}

struct SettledNode {
    output: TaskOutput,
    outcome: NodeOutcome,
    error: Option<String>,
}

/// Run one node on its claimed executor, bounded by the node's timeout.
async fn dispatch_node(
    node: &WorkflowNode,
    executor: &dyn Executor,
    payload: TaskPayload,
) -> SettledNode {
    match timeout(node.timeout, executor.execute(payload)).await {
        Ok(Ok(value)) => SettledNode {
            output: TaskOutput::success(value),
            outcome: NodeOutcome::Success,
            error: None,
        },
        Ok(Err(err)) => {
            let message = err.to_string();
            warn!(node_id = %node.node_id, error = %message, "node execution failed");
            SettledNode {
                output: TaskOutput::error(&message),
                outcome: NodeOutcome::Error,
                error: Some(message),
            }
        }
        Err(_) => {
            warn!(node_id = %node.node_id, timeout = ?node.timeout, "node timed out");
            SettledNode {
                output: TaskOutput::error("timeout"),
                outcome: NodeOutcome::Timeout,
                error: Some(format!("exceeded timeout of {:?}", node.timeout)),
            }
        }
    }
}

/// Find and atomically claim the first registered idle executor whose
/// capability set contains the node's required capability.
fn claim_executor(
    executors: &IndexMap<String, Arc<dyn Executor>>,
    node: &WorkflowNode,
) -> Option<Arc<dyn Executor>> {
    executors
        .values()
        .find(|executor| {
            executor.can_handle(&node.capability) && executor.state().try_claim(&node.node_id)
        })
        .cloned()
}

fn build_payload(
    node: &WorkflowNode,
    initial_inputs: &Value,
    results: &IndexMap<String, TaskOutput>,
) -> TaskPayload {
    let dependency_results = node
        .depends_on
        .iter()
        .filter_map(|dep| results.get(dep).map(|output| (dep.clone(), output.clone())))
        .collect();

    TaskPayload::new(node.task_config.clone(), initial_inputs.clone())
        .with_dependency_results(dependency_results)
}

fn stalled(
    graph: &WorkflowGraph,
    completed: &HashSet<String>,
    results: IndexMap<String, TaskOutput>,
) -> SchedulerError {
    SchedulerError::Stalled {
        workflow_id: graph.workflow_id.clone(),
        pending: graph.pending_nodes(completed),
        results,
    }
}
