use crate::registry::NodeRegistry;
use std::sync::Arc;
use studiocore::{EventEmitter, NodeContext, NodeError, NodeResult, WorkflowNode};

/// Routes a node to the implementation registered for its semantic kind.
#[derive(Clone)]
pub struct NodeDispatcher {
    registry: Arc<NodeRegistry>,
}

impl NodeDispatcher {
    pub fn new(registry: Arc<NodeRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<NodeRegistry> {
        &self.registry
    }

    /// Run `node` with the result of its upstream node.
    ///
    /// Kinds without a registered implementation yield an empty output.
    pub async fn dispatch(
        &self,
        node: &WorkflowNode,
        upstream: Option<&NodeResult>,
        events: EventEmitter,
    ) -> Result<NodeResult, NodeError> {
        let instance = match self.registry.create_node(&node.data) {
            Some(created) => created?,
            None => {
                tracing::debug!(
                    "No implementation for node {} ({}), skipping",
                    node.id,
                    node.data.kind
                );
                return Ok(NodeResult::empty());
            }
        };

        let ctx = NodeContext::new(node.id.clone(), node.data.clone(), events)
            .with_input(upstream.cloned());

        instance.execute(ctx).await
    }
}
