use crate::dispatcher::NodeDispatcher;
use crate::order::order;
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;
use studiocore::{
    EventBus, ExecutionEvent, ExecutionId, FlowError, NodeId, NodeKind, NodeResult, Workflow,
};

/// Settings for a single workflow run
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Fail the run when a cycle leaves nodes unordered. When false, those
    /// nodes are skipped and the rest of the graph still runs.
    pub reject_cycles: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            reject_cycles: true,
        }
    }
}

/// Executes workflows one node at a time in topological order
pub struct WorkflowExecutor {
    config: ExecutorConfig,
}

impl WorkflowExecutor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    /// Execute a workflow and return results
    pub async fn execute(
        &self,
        workflow: &Workflow,
        dispatcher: &NodeDispatcher,
        event_bus: &EventBus,
    ) -> Result<ExecutionResult, FlowError> {
        let execution_id = ExecutionId::new_v4();
        let start_time = Instant::now();

        event_bus.emit(ExecutionEvent::WorkflowStarted {
            execution_id,
            workflow_name: workflow.metadata.name.clone(),
            node_count: workflow.nodes.len(),
            timestamp: Utc::now(),
        });

        tracing::info!(
            "Starting workflow execution {} ({} nodes, {} edges)",
            execution_id,
            workflow.nodes.len(),
            workflow.edges.len()
        );

        let result = self
            .run_nodes(workflow, dispatcher, event_bus, execution_id)
            .await;

        let duration_ms = start_time.elapsed().as_millis() as u64;

        event_bus.emit(ExecutionEvent::WorkflowCompleted {
            execution_id,
            success: result.is_ok(),
            duration_ms,
            timestamp: Utc::now(),
        });

        match &result {
            Ok(_) => tracing::info!(
                "Workflow execution {} finished in {}ms",
                execution_id,
                duration_ms
            ),
            Err(e) => tracing::error!("Workflow execution {} failed: {}", execution_id, e),
        }

        result
    }

    async fn run_nodes(
        &self,
        workflow: &Workflow,
        dispatcher: &NodeDispatcher,
        event_bus: &EventBus,
        execution_id: ExecutionId,
    ) -> Result<ExecutionResult, FlowError> {
        let ordering = order(&workflow.nodes, &workflow.edges)?;
        let sorted = if self.config.reject_cycles {
            ordering.into_checked()?
        } else {
            ordering.sorted
        };

        let mut results: HashMap<NodeId, NodeResult> = HashMap::with_capacity(sorted.len());

        for node in &sorted {
            let upstream = workflow
                .incoming_edge(&node.id)
                .and_then(|edge| results.get(&edge.source));

            event_bus.emit(ExecutionEvent::NodeStarted {
                execution_id,
                node_id: node.id.clone(),
                node_type: node.data.kind.to_string(),
                timestamp: Utc::now(),
            });

            let start = Instant::now();
            let events = event_bus.create_emitter(execution_id, node.id.clone());

            match dispatcher.dispatch(node, upstream, events).await {
                Ok(result) => {
                    let duration_ms = start.elapsed().as_millis() as u64;
                    tracing::info!("Node {} completed in {}ms", node.id, duration_ms);

                    event_bus.emit(ExecutionEvent::NodeCompleted {
                        execution_id,
                        node_id: node.id.clone(),
                        result: result.clone(),
                        duration_ms,
                        timestamp: Utc::now(),
                    });

                    results.insert(node.id.clone(), result);
                }
                Err(e) => {
                    tracing::error!("Node {} failed: {}", node.id, e);

                    event_bus.emit(ExecutionEvent::NodeFailed {
                        execution_id,
                        node_id: node.id.clone(),
                        error: e.to_string(),
                        timestamp: Utc::now(),
                    });

                    return Err(FlowError::node(node.id.clone(), e));
                }
            }
        }

        let output = sorted
            .iter()
            .find(|n| n.data.kind == NodeKind::Output)
            .and_then(|n| results.get(&n.id))
            .cloned();

        Ok(ExecutionResult {
            execution_id,
            output,
            results,
        })
    }
}

impl Default for WorkflowExecutor {
    fn default() -> Self {
        Self::new(ExecutorConfig::default())
    }
}

/// Result of workflow execution
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    #[serde(skip)]
    pub execution_id: ExecutionId,
    /// Result of the first output node, `None` when the workflow has none
    pub output: Option<NodeResult>,
    pub results: HashMap<NodeId, NodeResult>,
}

impl ExecutionResult {
    pub fn result(&self, node_id: &str) -> Option<&NodeResult> {
        self.results.get(node_id)
    }
}
