// crates/studionodes/tests/workflow_test.rs

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use studiocore::{
    FileAttachment, FlowError, ImageGenerator, NodeError, NodeKind, NodeResult, OutputType,
    TextGenerator, TextRecognizer, Workflow, WorkflowNode,
};
use studionodes::{
    ocr_space, register_all, Capabilities, OcrSpaceRecognizer, OpenAiTextGenerator,
    ProviderConfig, NO_IMAGE,
};
use studioruntime::{NodeRegistry, RuntimeConfig, StudioRuntime};

/// Canned provider answers, recording every call
#[derive(Default)]
struct StubProviders {
    text: HashMap<String, String>,
    calls: AtomicUsize,
    seen_images: Mutex<Vec<String>>,
}

impl StubProviders {
    fn with_text(mut self, prompt: &str, answer: &str) -> Self {
        self.text.insert(prompt.to_string(), answer.to_string());
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for StubProviders {
    async fn generate_text(&self, prompt: &str) -> Result<String, NodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.get(prompt).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl ImageGenerator for StubProviders {
    async fn generate_image(&self, prompt: &str) -> Result<String, NodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("https://images.test/{}.png", prompt.replace(' ', "-")))
    }
}

#[async_trait]
impl TextRecognizer for StubProviders {
    async fn recognize_text(&self, image: &str) -> Result<String, NodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_images.lock().unwrap().push(image.to_string());
        Ok("recognized".to_string())
    }
}

fn create_runtime(stub: Arc<StubProviders>) -> StudioRuntime {
    let capabilities = Capabilities {
        text: stub.clone(),
        image: stub.clone(),
        ocr: stub,
    };
    runtime_with(capabilities)
}

fn runtime_with(capabilities: Capabilities) -> StudioRuntime {
    let mut registry = NodeRegistry::new();
    register_all(&mut registry, &capabilities);
    StudioRuntime::with_registry(Arc::new(registry), RuntimeConfig::default())
}

fn single(node: WorkflowNode) -> Workflow {
    let mut workflow = Workflow::new("single");
    workflow.add_node(node);
    workflow
}

#[tokio::test]
async fn test_text_generation_flows_into_output() {
    let stub = Arc::new(StubProviders::default().with_text("hi", "HELLO"));
    let runtime = create_runtime(stub.clone());

    let mut workflow = Workflow::new("greeting");
    workflow.add_node(WorkflowNode::new("a", NodeKind::TextGeneration).with_prompt("hi"));
    workflow.add_node(WorkflowNode::new("out", NodeKind::Output));
    workflow.connect("a", "out");

    let result = runtime.execute(&workflow).await.unwrap();

    assert_eq!(result.result("a").unwrap().output, "HELLO");
    assert_eq!(result.result("out").unwrap().output, "HELLO");
    assert_eq!(result.output, Some(NodeResult::text("HELLO")));
    assert_eq!(stub.calls(), 1);
}

#[tokio::test]
async fn test_lone_output_node_is_empty() {
    let runtime = create_runtime(Arc::new(StubProviders::default()));

    let result = runtime
        .execute(&single(WorkflowNode::new("out", NodeKind::Output)))
        .await
        .unwrap();

    assert_eq!(result.output, Some(NodeResult::text("")));
}

#[tokio::test]
async fn test_plain_text_file_passes_through_without_provider_call() {
    let stub = Arc::new(StubProviders::default());
    let runtime = create_runtime(stub.clone());

    let node = WorkflowNode::new("f", NodeKind::FileToText)
        .with_file(FileAttachment::new("notes.txt", "text/plain", "abc"));
    let result = runtime.execute(&single(node)).await.unwrap();

    assert_eq!(result.result("f").unwrap().output, "abc");
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn test_unsupported_file_type_is_reported_in_output() {
    let runtime = create_runtime(Arc::new(StubProviders::default()));

    let node = WorkflowNode::new("f", NodeKind::FileToText)
        .with_file(FileAttachment::new("doc.pdf", "application/pdf", "JVBERi0x"));
    let result = runtime.execute(&single(node)).await.unwrap();

    assert_eq!(
        result.result("f").unwrap().output,
        "File-to-text not supported for type: application/pdf"
    );

    let result = runtime
        .execute(&single(WorkflowNode::new("f", NodeKind::FileToText)))
        .await
        .unwrap();
    assert_eq!(
        result.result("f").unwrap().output,
        "File-to-text not supported for type: undefined"
    );
}

#[tokio::test]
async fn test_image_to_text_without_file() {
    let stub = Arc::new(StubProviders::default());
    let runtime = create_runtime(stub.clone());

    let result = runtime
        .execute(&single(WorkflowNode::new("ocr", NodeKind::ImageToText)))
        .await
        .unwrap();

    assert_eq!(result.result("ocr").unwrap().output, NO_IMAGE);
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn test_image_to_text_sends_file_data() {
    let stub = Arc::new(StubProviders::default());
    let runtime = create_runtime(stub.clone());

    let mut workflow = Workflow::new("ocr");
    workflow.add_node(WorkflowNode::new("ocr", NodeKind::ImageToText).with_file(
        FileAttachment::new("scan.png", "image/png", "data:image/png;base64,iVBORw0KGgo="),
    ));
    workflow.add_node(WorkflowNode::new("out", NodeKind::Output));
    workflow.connect("ocr", "out");

    let result = runtime.execute(&workflow).await.unwrap();

    assert_eq!(result.output, Some(NodeResult::text("recognized")));
    assert_eq!(
        *stub.seen_images.lock().unwrap(),
        vec!["data:image/png;base64,iVBORw0KGgo=".to_string()]
    );
}

#[tokio::test]
async fn test_image_generation_marks_output_type() {
    let runtime = create_runtime(Arc::new(StubProviders::default()));

    let mut workflow = Workflow::new("art");
    workflow.add_node(WorkflowNode::new("img", NodeKind::ImageGeneration).with_prompt("red fox"));
    workflow.add_node(WorkflowNode::new("out", NodeKind::Output));
    workflow.connect("img", "out");

    let result = runtime.execute(&workflow).await.unwrap();

    let image = result.result("img").unwrap();
    assert_eq!(image.output, "https://images.test/red-fox.png");
    assert_eq!(image.output_type, Some(OutputType::Image));
    // The sink forwards only the text
    assert_eq!(result.output, Some(NodeResult::text("https://images.test/red-fox.png")));
}

#[tokio::test]
async fn test_missing_openai_key_fails_the_whole_run() {
    let stub = Arc::new(StubProviders::default());
    let runtime = runtime_with(Capabilities {
        text: Arc::new(OpenAiTextGenerator::new(None)),
        image: stub.clone(),
        ocr: stub,
    });

    let mut workflow = Workflow::new("no key");
    workflow.add_node(
        WorkflowNode::new("f", NodeKind::FileToText)
            .with_file(FileAttachment::new("a.txt", "text/plain", "ok")),
    );
    workflow.add_node(WorkflowNode::new("gen", NodeKind::TextGeneration).with_prompt("hi"));

    let err = runtime.execute(&workflow).await.unwrap_err();

    assert!(matches!(
        &err,
        FlowError::Node { node_id, source: NodeError::Configuration(_) } if node_id == "gen"
    ));
    assert_eq!(err.user_message(), "Missing OpenAI API key");
}

#[tokio::test]
async fn test_missing_ocr_key_degrades_to_placeholder() {
    let stub = Arc::new(StubProviders::default());
    let runtime = runtime_with(Capabilities {
        text: stub.clone(),
        image: stub,
        ocr: Arc::new(OcrSpaceRecognizer::new(None)),
    });

    let node = WorkflowNode::new("ocr", NodeKind::ImageToText)
        .with_file(FileAttachment::new("scan.png", "image/png", "iVBORw0KGgo="));
    let result = runtime.execute(&single(node)).await.unwrap();

    assert_eq!(result.result("ocr").unwrap().output, ocr_space::PLACEHOLDER_TEXT);
}

#[tokio::test]
async fn test_default_capabilities_without_keys() {
    let runtime = runtime_with(Capabilities::from_config(&ProviderConfig::default()));

    let node = WorkflowNode::new("img", NodeKind::ImageGeneration).with_prompt("x");
    let err = runtime.execute(&single(node)).await.unwrap_err();

    assert_eq!(err.user_message(), "Missing Replicate API key");
}

#[tokio::test]
async fn test_editor_document_round_trip_execution() {
    let stub = Arc::new(StubProviders::default().with_text("summarise", "short"));
    let runtime = create_runtime(stub);

    let workflow: Workflow = serde_json::from_str(
        r#"{
            "nodes": [
                {"id": "out", "type": "output", "position": {"x": 400, "y": 0},
                 "data": {"label": "Result", "type": "output"}},
                {"id": "gen", "type": "textGeneration", "position": {"x": 0, "y": 0},
                 "data": {"label": "LLM", "type": "text-generation", "prompt": "summarise"}},
                {"id": "todo", "type": "fileToImage", "data": {"type": "file-to-image"}}
            ],
            "edges": [{"id": "e1", "source": "gen", "target": "out"}],
            "metadata": {"name": "doc", "description": "", "created": "", "updated": ""}
        }"#,
    )
    .unwrap();

    let first = runtime.execute(&workflow).await.unwrap();
    let second = runtime.execute(&workflow).await.unwrap();

    assert_eq!(first.output, Some(NodeResult::text("short")));
    assert_eq!(first.result("todo"), Some(&NodeResult::empty()));
    assert_eq!(first.results, second.results);
    assert_eq!(first.output, second.output);

    let json = serde_json::to_value(&first).unwrap();
    assert_eq!(json["output"], serde_json::json!({"output": "short"}));
    assert_eq!(json["results"]["gen"]["output"], "short");
}

#[tokio::test]
async fn test_malformed_nodes_run_without_failing_the_document() {
    let stub = Arc::new(StubProviders::default());
    let runtime = create_runtime(stub.clone());

    let workflow: Workflow = serde_json::from_str(
        r#"{
            "nodes": [
                {"id": "n", "type": "x", "data": {"label": "no kind"}},
                {"id": "ocr", "type": "imageToText",
                 "data": {"type": "image-to-text",
                          "file": {"name": "a", "type": "image/png", "data": null}}},
                {"id": "f", "type": "fileToText",
                 "data": {"type": "file-to-text",
                          "file": {"name": "b", "type": null, "data": null}}},
                {"id": "out", "type": "output", "data": {"type": "output"}}
            ],
            "edges": [{"id": "e1", "source": "ocr", "target": "out"}]
        }"#,
    )
    .unwrap();

    let result = runtime.execute(&workflow).await.unwrap();

    assert_eq!(result.result("n"), Some(&NodeResult::empty()));
    assert_eq!(result.result("ocr").unwrap().output, NO_IMAGE);
    assert_eq!(
        result.result("f").unwrap().output,
        "File-to-text not supported for type: "
    );
    assert_eq!(result.output, Some(NodeResult::text(NO_IMAGE)));
    assert_eq!(stub.calls(), 0);
}
