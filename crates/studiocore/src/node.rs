use crate::{events::EventEmitter, NodeData, NodeError, NodeId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Core trait that all executable nodes implement
#[async_trait]
pub trait Node: Send + Sync {
    /// Semantic type identifier (e.g. "text-generation")
    fn node_type(&self) -> &str;

    /// Execute the node with given context
    async fn execute(&self, ctx: NodeContext) -> Result<NodeResult, NodeError>;
}

/// Execution context passed to each node
#[derive(Clone)]
pub struct NodeContext {
    pub node_id: NodeId,

    /// Payload of the node being executed
    pub data: NodeData,

    /// Result of the node feeding this one, if any
    pub input: Option<NodeResult>,

    /// Event emitter for real-time updates
    pub events: EventEmitter,
}

impl NodeContext {
    pub fn new(node_id: impl Into<NodeId>, data: NodeData, events: EventEmitter) -> Self {
        Self {
            node_id: node_id.into(),
            data,
            input: None,
            events,
        }
    }

    pub fn with_input(mut self, input: Option<NodeResult>) -> Self {
        self.input = input;
        self
    }

    /// Upstream output text, empty when nothing is connected
    pub fn input_text(&self) -> &str {
        self.input.as_ref().map(|r| r.output.as_str()).unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputType {
    Text,
    Image,
}

/// Output from node execution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeResult {
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_type: Option<OutputType>,
}

impl NodeResult {
    pub fn text(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            output_type: None,
        }
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self {
            output: url.into(),
            output_type: Some(OutputType::Image),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}
