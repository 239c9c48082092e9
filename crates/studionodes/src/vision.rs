use async_trait::async_trait;
use std::sync::Arc;
use studiocore::{Node, NodeContext, NodeData, NodeError, NodeKind, NodeResult, TextRecognizer};
use studioruntime::{NodeFactory, NodeMetadata};

pub const NO_IMAGE: &str = "No image provided";

/// Runs OCR over the node's uploaded image
pub struct ImageToTextNode {
    recognizer: Arc<dyn TextRecognizer>,
}

impl ImageToTextNode {
    pub fn new(recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self { recognizer }
    }
}

#[async_trait]
impl Node for ImageToTextNode {
    fn node_type(&self) -> &str {
        "image-to-text"
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeResult, NodeError> {
        let image = ctx
            .data
            .file
            .as_ref()
            .map(|f| f.data.as_str())
            .filter(|data| !data.is_empty());

        match image {
            Some(image) => {
                ctx.events.info("Extracting text from image");
                let text = self.recognizer.recognize_text(image).await?;
                Ok(NodeResult::text(text))
            }
            None => Ok(NodeResult::text(NO_IMAGE)),
        }
    }
}

pub struct ImageToTextNodeFactory {
    recognizer: Arc<dyn TextRecognizer>,
}

impl ImageToTextNodeFactory {
    pub fn new(recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self { recognizer }
    }
}

impl NodeFactory for ImageToTextNodeFactory {
    fn create(&self, _data: &NodeData) -> Result<Box<dyn Node>, NodeError> {
        Ok(Box::new(ImageToTextNode::new(self.recognizer.clone())))
    }

    fn node_kind(&self) -> NodeKind {
        NodeKind::ImageToText
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata {
            description: "Extract text from an uploaded image".to_string(),
            category: "vision".to_string(),
        }
    }
}
