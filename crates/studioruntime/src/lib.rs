//! Workflow execution runtime
//!
//! This crate orders workflow graphs, dispatches each node to its registered
//! implementation and drives a run from first node to output.

mod dispatcher;
mod executor;
pub mod order;
mod registry;
mod runtime;
pub mod store;

pub use dispatcher::NodeDispatcher;
pub use executor::{ExecutionResult, ExecutorConfig, WorkflowExecutor};
pub use order::{order, Ordering};
pub use registry::{NodeFactory, NodeMetadata, NodeRegistry};
pub use runtime::{RuntimeConfig, StudioRuntime};
pub use store::{MemoryWorkflowStore, SavedWorkflow, StoreError, WorkflowStore};
