use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub type NodeId = String;

/// Complete workflow document as produced by the editor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    #[serde(default)]
    pub nodes: Vec<WorkflowNode>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub metadata: WorkflowMetadata,
}

impl Workflow {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            metadata: WorkflowMetadata {
                name: name.into(),
                ..WorkflowMetadata::default()
            },
            ..Self::default()
        }
    }

    pub fn add_node(&mut self, node: WorkflowNode) -> NodeId {
        let id = node.id.clone();
        self.nodes.push(node);
        id
    }

    /// Adds a `source -> target` edge with a generated id.
    pub fn connect(&mut self, source: impl Into<NodeId>, target: impl Into<NodeId>) {
        let source = source.into();
        let target = target.into();
        self.edges.push(Edge {
            id: format!("e{}-{}", source, target),
            source,
            target,
            edge_type: None,
        });
    }

    /// First declared edge ending at `id`. Only this edge feeds the node.
    pub fn incoming_edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.target == id)
    }
}

/// Editor metadata, opaque to the executor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowMetadata {
    pub name: String,
    pub description: String,
    pub created: String,
    pub updated: String,
}

/// Node in a workflow graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowNode {
    pub id: NodeId,
    /// Rendering type used by the editor; dispatch uses `data.kind`
    #[serde(rename = "type", default)]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default)]
    pub data: NodeData,
}

impl WorkflowNode {
    pub fn new(id: impl Into<NodeId>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            node_type: "custom".to_string(),
            position: None,
            data: NodeData::new(kind),
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.data.prompt = Some(prompt.into());
        self
    }

    pub fn with_file(mut self, file: FileAttachment) -> Self {
        self.data.file = Some(file);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.data.label = Some(label.into());
        self
    }

    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = Some(Position { x, y });
        self
    }

    pub fn kind(&self) -> &NodeKind {
        &self.data.kind
    }
}

/// Node position in visual editor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

/// Semantic node type used for dispatch
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    TextGeneration,
    ImageGeneration,
    FileToText,
    ImageToText,
    Output,
    #[default]
    #[serde(other)]
    Unknown,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::TextGeneration => "text-generation",
            NodeKind::ImageGeneration => "image-generation",
            NodeKind::FileToText => "file-to-text",
            NodeKind::ImageToText => "image-to-text",
            NodeKind::Output => "output",
            NodeKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Node payload edited in the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    /// Missing or malformed kinds become `Unknown` and run as no-ops
    #[serde(rename = "type", default, deserialize_with = "kind_or_unknown")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileAttachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_type: Option<crate::OutputType>,
}

impl NodeData {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            label: None,
            description: None,
            prompt: None,
            file: None,
            content: None,
            ai_model: None,
            input_type: None,
            output: None,
            output_type: None,
        }
    }

    pub fn prompt_or_empty(&self) -> &str {
        self.prompt.as_deref().unwrap_or("")
    }
}

impl Default for NodeData {
    fn default() -> Self {
        Self::new(NodeKind::Unknown)
    }
}

fn kind_or_unknown<'de, D>(deserializer: D) -> Result<NodeKind, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(NodeKind::deserialize(value).unwrap_or_default())
}

fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// File uploaded onto a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAttachment {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "string_or_empty")]
    pub mime_type: String,
    /// Inline text, or a base64 / data-URL payload for binary files. `null`
    /// reads as empty.
    #[serde(default, deserialize_with = "string_or_empty")]
    pub data: String,
}

impl FileAttachment {
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn is_plain_text(&self) -> bool {
        self.mime_type == "text/plain"
    }
}

/// Directed data-flow connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    #[serde(default)]
    pub id: String,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub edge_type: Option<String>,
}
