use async_trait::async_trait;
use studiocore::{Node, NodeContext, NodeData, NodeError, NodeKind, NodeResult};
use studioruntime::{NodeFactory, NodeMetadata};

/// Sink node: forwards the upstream output text unchanged
pub struct OutputNode;

#[async_trait]
impl Node for OutputNode {
    fn node_type(&self) -> &str {
        "output"
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeResult, NodeError> {
        Ok(NodeResult::text(ctx.input_text()))
    }
}

pub struct OutputNodeFactory;

impl NodeFactory for OutputNodeFactory {
    fn create(&self, _data: &NodeData) -> Result<Box<dyn Node>, NodeError> {
        Ok(Box::new(OutputNode))
    }

    fn node_kind(&self) -> NodeKind {
        NodeKind::Output
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata {
            description: "Workflow result".to_string(),
            category: "output".to_string(),
        }
    }
}
