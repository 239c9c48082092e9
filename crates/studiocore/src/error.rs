use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Node {node_id} failed: {source}")]
    Node {
        node_id: String,
        #[source]
        source: NodeError,
    },

    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),
}

impl FlowError {
    pub fn node(node_id: impl Into<String>, source: NodeError) -> Self {
        FlowError::Node {
            node_id: node_id.into(),
            source,
        }
    }

    /// Message surfaced to callers of the request layer.
    ///
    /// Node failures report the adapter's own message so that a missing key
    /// reads the same whether or not it went through the executor.
    pub fn user_message(&self) -> String {
        match self {
            FlowError::Node { source, .. } => source.to_string(),
            other => other.to_string(),
        }
    }
}

/// Failures raised while a single node runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NodeError {
    /// A provider credential is missing.
    #[error("{0}")]
    Configuration(String),

    /// The provider reported that the job failed.
    #[error("{0}")]
    Generation(String),

    #[error("Gave up waiting after {attempts} polls ({waited_ms}ms)")]
    Timeout { attempts: u32, waited_ms: u64 },

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkflowError {
    #[error("Cyclic dependency detected, unresolved nodes: {}", unresolved.join(", "))]
    CycleDetected { unresolved: Vec<String> },

    #[error("Edge {edge} references unknown node: {node}")]
    UnknownEdgeEndpoint { edge: String, node: String },

    #[error("Duplicate node id: {0}")]
    DuplicateNode(String),
}
