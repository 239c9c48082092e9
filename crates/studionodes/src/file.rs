use async_trait::async_trait;
use studiocore::{Node, NodeContext, NodeData, NodeError, NodeKind, NodeResult};
use studioruntime::{NodeFactory, NodeMetadata};

/// Emits the content of an uploaded plain-text file
pub struct FileToTextNode;

#[async_trait]
impl Node for FileToTextNode {
    fn node_type(&self) -> &str {
        "file-to-text"
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeResult, NodeError> {
        match &ctx.data.file {
            Some(file) if file.is_plain_text() => Ok(NodeResult::text(file.data.clone())),
            other => {
                let mime_type = other
                    .as_ref()
                    .map(|f| f.mime_type.as_str())
                    .unwrap_or("undefined");
                ctx.events.warn(format!("Unsupported file type: {}", mime_type));
                Ok(NodeResult::text(format!(
                    "File-to-text not supported for type: {}",
                    mime_type
                )))
            }
        }
    }
}

pub struct FileToTextNodeFactory;

impl NodeFactory for FileToTextNodeFactory {
    fn create(&self, _data: &NodeData) -> Result<Box<dyn Node>, NodeError> {
        Ok(Box::new(FileToTextNode))
    }

    fn node_kind(&self) -> NodeKind {
        NodeKind::FileToText
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata {
            description: "Read the text content of an uploaded file".to_string(),
            category: "input".to_string(),
        }
    }
}
