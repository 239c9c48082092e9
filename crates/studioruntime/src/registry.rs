use std::collections::HashMap;
use std::sync::Arc;
use studiocore::{Node, NodeData, NodeError, NodeKind};

/// Factory trait for creating node instances
pub trait NodeFactory: Send + Sync {
    /// Create a node instance for the given payload
    fn create(&self, data: &NodeData) -> Result<Box<dyn Node>, NodeError>;

    /// Semantic node kind this factory handles
    fn node_kind(&self) -> NodeKind;

    /// Optional: Get node metadata (description, category)
    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::default()
    }
}

/// Metadata about a node type
#[derive(Debug, Clone)]
pub struct NodeMetadata {
    pub description: String,
    pub category: String,
}

impl Default for NodeMetadata {
    fn default() -> Self {
        Self {
            description: String::new(),
            category: "general".to_string(),
        }
    }
}

/// Registry of available node types
pub struct NodeRegistry {
    factories: HashMap<NodeKind, Arc<dyn NodeFactory>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a node factory, replacing any previous one for the same kind
    pub fn register(&mut self, factory: Arc<dyn NodeFactory>) {
        let kind = factory.node_kind();
        tracing::info!("Registering node type: {}", kind);
        self.factories.insert(kind, factory);
    }

    /// Create a node instance, `None` when no factory handles `data.kind`
    pub fn create_node(&self, data: &NodeData) -> Option<Result<Box<dyn Node>, NodeError>> {
        self.factories.get(&data.kind).map(|f| f.create(data))
    }

    pub fn contains(&self, kind: &NodeKind) -> bool {
        self.factories.contains_key(kind)
    }

    /// Get all registered node types, sorted by name
    pub fn list_node_types(&self) -> Vec<NodeKind> {
        let mut kinds: Vec<NodeKind> = self.factories.keys().cloned().collect();
        kinds.sort_by_key(|k| k.as_str());
        kinds
    }

    /// Get metadata for a node type
    pub fn get_metadata(&self, kind: &NodeKind) -> Option<NodeMetadata> {
        self.factories.get(kind).map(|f| f.metadata())
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
