//! Core abstractions for the studio workflow engine
//!
//! This crate provides the workflow document model, the node and capability
//! traits, and the error and event types every other crate depends on.

pub mod capability;
mod error;
pub mod events;
mod node;
mod workflow;

pub use capability::{ImageGenerator, TextGenerator, TextRecognizer};
pub use error::{FlowError, NodeError, WorkflowError};
pub use events::*;
pub use node::{Node, NodeContext, NodeResult, OutputType};
pub use workflow::{
    Edge, FileAttachment, NodeData, NodeId, NodeKind, Position, Workflow, WorkflowMetadata,
    WorkflowNode,
};

/// Result type for flow operations
pub type Result<T> = std::result::Result<T, FlowError>;
