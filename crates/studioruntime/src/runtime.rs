use crate::{
    dispatcher::NodeDispatcher, registry::NodeRegistry, ExecutionResult, ExecutorConfig,
    WorkflowExecutor,
};
use std::sync::Arc;
use studiocore::{EventBus, FlowError, Workflow};

/// Main runtime for executing workflows
pub struct StudioRuntime {
    dispatcher: NodeDispatcher,
    executor: Arc<WorkflowExecutor>,
    event_bus: Arc<EventBus>,
}

impl StudioRuntime {
    /// Create a runtime with an empty registry; every node yields empty output
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        Self::with_registry(Arc::new(NodeRegistry::new()), config)
    }

    /// Create a new runtime with a pre-configured registry
    pub fn with_registry(registry: Arc<NodeRegistry>, config: RuntimeConfig) -> Self {
        let executor = Arc::new(WorkflowExecutor::new(config.executor));
        let event_bus = Arc::new(EventBus::new(config.event_buffer_size));

        Self {
            dispatcher: NodeDispatcher::new(registry),
            executor,
            event_bus,
        }
    }

    pub fn registry(&self) -> &Arc<NodeRegistry> {
        self.dispatcher.registry()
    }

    /// Execute a workflow document
    pub async fn execute(&self, workflow: &Workflow) -> Result<ExecutionResult, FlowError> {
        self.executor
            .execute(workflow, &self.dispatcher, &self.event_bus)
            .await
    }

    /// Subscribe to execution events
    pub fn subscribe_events(&self) -> tokio::sync::broadcast::Receiver<studiocore::ExecutionEvent> {
        self.event_bus.subscribe()
    }
}

impl Default for StudioRuntime {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for the runtime
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub executor: ExecutorConfig,
    pub event_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            executor: ExecutorConfig::default(),
            event_buffer_size: 1000,
        }
    }
}
