use async_trait::async_trait;
use std::sync::Arc;
use studiocore::{ImageGenerator, Node, NodeContext, NodeData, NodeError, NodeKind, NodeResult};
use studioruntime::{NodeFactory, NodeMetadata};

/// Generates an image from the node's prompt and outputs its URL
pub struct ImageGenerationNode {
    generator: Arc<dyn ImageGenerator>,
}

impl ImageGenerationNode {
    pub fn new(generator: Arc<dyn ImageGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl Node for ImageGenerationNode {
    fn node_type(&self) -> &str {
        "image-generation"
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeResult, NodeError> {
        ctx.events.info("Submitting image generation job");

        let url = self
            .generator
            .generate_image(ctx.data.prompt_or_empty())
            .await?;

        ctx.events.info("Image ready");

        Ok(NodeResult::image(url))
    }
}

pub struct ImageGenerationNodeFactory {
    generator: Arc<dyn ImageGenerator>,
}

impl ImageGenerationNodeFactory {
    pub fn new(generator: Arc<dyn ImageGenerator>) -> Self {
        Self { generator }
    }
}

impl NodeFactory for ImageGenerationNodeFactory {
    fn create(&self, _data: &NodeData) -> Result<Box<dyn Node>, NodeError> {
        Ok(Box::new(ImageGenerationNode::new(self.generator.clone())))
    }

    fn node_kind(&self) -> NodeKind {
        NodeKind::ImageGeneration
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata {
            description: "Generate an image from a prompt".to_string(),
            category: "generation".to_string(),
        }
    }
}
