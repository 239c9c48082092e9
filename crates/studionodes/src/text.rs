use async_trait::async_trait;
use std::sync::Arc;
use studiocore::{Node, NodeContext, NodeData, NodeError, NodeKind, NodeResult, TextGenerator};
use studioruntime::{NodeFactory, NodeMetadata};

/// Sends the node's prompt to a text generator
pub struct TextGenerationNode {
    generator: Arc<dyn TextGenerator>,
}

impl TextGenerationNode {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl Node for TextGenerationNode {
    fn node_type(&self) -> &str {
        "text-generation"
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeResult, NodeError> {
        let prompt = ctx.data.prompt_or_empty();

        ctx.events.info(format!("Generating text ({} chars of prompt)", prompt.len()));

        let text = self.generator.generate_text(prompt).await?;

        Ok(NodeResult::text(text))
    }
}

pub struct TextGenerationNodeFactory {
    generator: Arc<dyn TextGenerator>,
}

impl TextGenerationNodeFactory {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

impl NodeFactory for TextGenerationNodeFactory {
    fn create(&self, _data: &NodeData) -> Result<Box<dyn Node>, NodeError> {
        Ok(Box::new(TextGenerationNode::new(self.generator.clone())))
    }

    fn node_kind(&self) -> NodeKind {
        NodeKind::TextGeneration
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata {
            description: "Generate text from a prompt".to_string(),
            category: "generation".to_string(),
        }
    }
}
