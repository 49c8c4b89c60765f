// ABOUTME: Immutable workflow graph model with per-node capability and timeout
// ABOUTME: Construction validates references, acyclicity is checked at execution start

use indexmap::IndexMap;
use petgraph::algo::toposort;
use petgraph::graph::{Graph, NodeIndex};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use super::error::{Result, SchedulerError};

fn default_timeout() -> Duration {
    Duration::from_secs(300)
}

/// One unit of work in a workflow DAG. Immutable once the graph is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowNode {
    pub node_id: String,
    pub capability: String,
    #[serde(default)]
    pub task_config: Value,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(with = "humantime_serde", default = "default_timeout")]
    pub timeout: Duration,
}

impl WorkflowNode {
    pub fn new(node_id: impl Into<String>, capability: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            capability: capability.into(),
            task_config: Value::Null,
            depends_on: Vec::new(),
            timeout: default_timeout(),
        }
    }

    pub fn with_config(mut self, config: Value) -> Self {
        self.task_config = config;
        self
    }

    pub fn depends_on(mut self, dependencies: &[&str]) -> Self {
        self.depends_on = dependencies.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// An immutable workflow definition: an ordered collection of nodes whose
/// dependency relation must be acyclic. Declaration order is preserved and
/// is the per-pass evaluation order during scheduling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowGraph {
    pub workflow_id: String,
    nodes: IndexMap<String, WorkflowNode>,
}

impl WorkflowGraph {
    /// Build a graph, rejecting duplicate node ids, dangling dependency
    /// references, and self-dependencies. Acyclicity is verified separately
    /// via `ensure_acyclic` when execution starts, where the cost is
    /// naturally paid.
    pub fn new(workflow_id: impl Into<String>, nodes: Vec<WorkflowNode>) -> Result<Self> {
        let workflow_id = workflow_id.into();
        let mut indexed = IndexMap::with_capacity(nodes.len());

        for node in nodes {
            if indexed.contains_key(&node.node_id) {
                return Err(SchedulerError::DuplicateNode {
                    workflow_id,
                    node_id: node.node_id,
                });
            }
            indexed.insert(node.node_id.clone(), node);
        }

        for node in indexed.values() {
            for dependency in &node.depends_on {
                if dependency == &node.node_id {
                    return Err(SchedulerError::SelfDependency {
                        node_id: node.node_id.clone(),
                    });
                }
                if !indexed.contains_key(dependency) {
                    return Err(SchedulerError::UnknownDependency {
                        node_id: node.node_id.clone(),
                        dependency: dependency.clone(),
                    });
                }
            }
        }

        Ok(Self {
            workflow_id,
            nodes: indexed,
        })
    }

    /// Verify the dependency relation is acyclic via topological sort.
    pub fn ensure_acyclic(&self) -> Result<()> {
        let mut graph: Graph<&str, ()> = Graph::new();
        let mut indices: HashMap<&str, NodeIndex> = HashMap::new();

        for node_id in self.nodes.keys() {
            let index = graph.add_node(node_id.as_str());
            indices.insert(node_id.as_str(), index);
        }

        for node in self.nodes.values() {
            let target = indices[node.node_id.as_str()];
            for dependency in &node.depends_on {
                graph.add_edge(indices[dependency.as_str()], target, ());
            }
        }

        toposort(&graph, None)
            .map(|_| ())
            .map_err(|cycle| SchedulerError::CircularDependency {
                nodes: vec![graph[cycle.node_id()].to_string()],
            })
    }

    /// Nodes whose dependencies are all in `completed`, in declaration order.
    pub fn ready_nodes(&self, completed: &HashSet<String>) -> Vec<&WorkflowNode> {
        self.nodes
            .values()
            .filter(|node| !completed.contains(&node.node_id))
            .filter(|node| node.depends_on.iter().all(|dep| completed.contains(dep)))
            .collect()
    }

    /// Node ids not yet in `completed`, in declaration order.
    pub fn pending_nodes(&self, completed: &HashSet<String>) -> Vec<String> {
        self.nodes
            .keys()
            .filter(|id| !completed.contains(*id))
            .cloned()
            .collect()
    }

    pub fn get(&self, node_id: &str) -> Option<&WorkflowNode> {
        self.nodes.get(node_id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &WorkflowNode> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> Vec<WorkflowNode> {
        vec![
            WorkflowNode::new("fetch", "api_call"),
            WorkflowNode::new("clean", "data_processing").depends_on(&["fetch"]),
            WorkflowNode::new("enrich", "data_processing").depends_on(&["fetch"]),
            WorkflowNode::new("report", "data_analysis").depends_on(&["clean", "enrich"]),
        ]
    }

    #[test]
    fn test_graph_construction() {
        let graph = WorkflowGraph::new("pipeline", diamond()).unwrap();
        assert_eq!(graph.len(), 4);
        assert_eq!(graph.get("fetch").unwrap().capability, "api_call");
        assert_eq!(
            graph.get("report").unwrap().timeout,
            Duration::from_secs(300)
        );
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let nodes = vec![
            WorkflowNode::new("fetch", "api_call"),
            WorkflowNode::new("fetch", "data_processing"),
        ];
        let err = WorkflowGraph::new("pipeline", nodes).unwrap_err();
        assert!(matches!(err, SchedulerError::DuplicateNode { .. }));
    }

    #[test]
    fn test_dangling_dependency_rejected() {
        let nodes = vec![WorkflowNode::new("clean", "data_processing").depends_on(&["missing"])];
        let err = WorkflowGraph::new("pipeline", nodes).unwrap_err();
        assert!(matches!(
            err,
            SchedulerError::UnknownDependency { ref dependency, .. } if dependency == "missing"
        ));
    }

    #[test]
    fn test_self_dependency_rejected() {
        let nodes = vec![WorkflowNode::new("loop", "api_call").depends_on(&["loop"])];
        let err = WorkflowGraph::new("pipeline", nodes).unwrap_err();
        assert!(matches!(err, SchedulerError::SelfDependency { .. }));
    }

    #[test]
    fn test_cycle_detected() {
        let nodes = vec![
            WorkflowNode::new("a", "step_a").depends_on(&["b"]),
            WorkflowNode::new("b", "step_b").depends_on(&["a"]),
        ];
        let graph = WorkflowGraph::new("cyclic", nodes).unwrap();
        let err = graph.ensure_acyclic().unwrap_err();
        assert!(matches!(err, SchedulerError::CircularDependency { .. }));

        let acyclic = WorkflowGraph::new("pipeline", diamond()).unwrap();
        assert!(acyclic.ensure_acyclic().is_ok());
    }

    #[test]
    fn test_ready_nodes_in_declaration_order() {
        let graph = WorkflowGraph::new("pipeline", diamond()).unwrap();

        let mut completed = HashSet::new();
        let ready: Vec<_> = graph
            .ready_nodes(&completed)
            .iter()
            .map(|n| n.node_id.clone())
            .collect();
        assert_eq!(ready, vec!["fetch"]);

        completed.insert("fetch".to_string());
        let ready: Vec<_> = graph
            .ready_nodes(&completed)
            .iter()
            .map(|n| n.node_id.clone())
            .collect();
        assert_eq!(ready, vec!["clean", "enrich"]);

        completed.insert("clean".to_string());
        completed.insert("enrich".to_string());
        let ready: Vec<_> = graph
            .ready_nodes(&completed)
            .iter()
            .map(|n| n.node_id.clone())
            .collect();
        assert_eq!(ready, vec!["report"]);
    }
}
