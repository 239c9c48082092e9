// crates/studiocli/src/main.rs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use studiocore::{ExecutionEvent, FileAttachment, NodeKind, Workflow, WorkflowNode};
use studionodes::{Capabilities, PollPolicy, ProviderConfig};
use studioruntime::{order, ExecutorConfig, NodeRegistry, RuntimeConfig, StudioRuntime};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "studio")]
#[command(about = "Studio workflow CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a workflow file
    Run {
        /// Path to workflow JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Skip nodes caught in cycles instead of failing
        #[arg(long)]
        allow_cycles: bool,

        /// Milliseconds between image generation status checks
        #[arg(long, env = "REPLICATE_POLL_INTERVAL_MS")]
        poll_interval_ms: Option<u64>,

        /// Status checks before image generation gives up
        #[arg(long, env = "REPLICATE_MAX_POLLS")]
        max_polls: Option<u32>,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate a workflow file
    Validate {
        /// Path to workflow JSON file
        file: PathBuf,
    },

    /// List available node types
    Nodes,

    /// Create a new example workflow
    Init {
        /// Output file path
        #[arg(short, long, default_value = "workflow.json")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            file,
            allow_cycles,
            poll_interval_ms,
            max_polls,
            verbose,
        } => {
            let default_level = if verbose { "debug" } else { "info" };
            tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new(default_level)),
                )
                .init();

            let mut providers = ProviderConfig::from_env();
            providers.poll = PollPolicy {
                interval_ms: poll_interval_ms.unwrap_or(providers.poll.interval_ms),
                max_attempts: max_polls.unwrap_or(providers.poll.max_attempts),
            };
            let config = RuntimeConfig {
                executor: ExecutorConfig {
                    reject_cycles: !allow_cycles,
                },
                ..RuntimeConfig::default()
            };

            run_workflow(&file, providers, config).await?;
        }

        Commands::Validate { file } => {
            validate_workflow(&file)?;
        }

        Commands::Nodes => {
            list_nodes();
        }

        Commands::Init { output } => {
            create_example_workflow(&output)?;
        }
    }

    Ok(())
}

fn load_workflow(file: &Path) -> Result<Workflow> {
    let workflow_json = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let workflow: Workflow = serde_json::from_str(&workflow_json)
        .with_context(|| format!("parsing {}", file.display()))?;
    Ok(workflow)
}

fn build_registry(providers: &ProviderConfig) -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    studionodes::register_all(&mut registry, &Capabilities::from_config(providers));
    registry
}

async fn run_workflow(file: &Path, providers: ProviderConfig, config: RuntimeConfig) -> Result<()> {
    println!("🚀 Loading workflow from: {}", file.display());

    let workflow = load_workflow(file)?;

    println!("📋 Workflow: {}", workflow.metadata.name);
    println!("   Nodes: {}", workflow.nodes.len());
    println!("   Edges: {}", workflow.edges.len());
    println!();

    let runtime = StudioRuntime::with_registry(Arc::new(build_registry(&providers)), config);

    let mut events = runtime.subscribe_events();

    let event_task = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                ExecutionEvent::WorkflowStarted { .. } => {
                    println!("▶️  Workflow started");
                }
                ExecutionEvent::NodeStarted { node_id, node_type, .. } => {
                    println!("  ⚡ Starting node: {} ({})", node_id, node_type);
                }
                ExecutionEvent::NodeCompleted { node_id, duration_ms, .. } => {
                    println!("  ✅ Node {} completed in {}ms", node_id, duration_ms);
                }
                ExecutionEvent::NodeFailed { node_id, error, .. } => {
                    println!("  ❌ Node {} failed: {}", node_id, error);
                }
                ExecutionEvent::NodeEvent { node_id, event, .. } => match event {
                    studiocore::NodeEvent::Info { message } => {
                        println!("     ℹ️  [{}] {}", node_id, message);
                    }
                    studiocore::NodeEvent::Warning { message } => {
                        println!("     ⚠️  [{}] {}", node_id, message);
                    }
                },
                ExecutionEvent::WorkflowCompleted { success, duration_ms, .. } => {
                    if success {
                        println!("✨ Workflow completed successfully in {}ms", duration_ms);
                    } else {
                        println!("💥 Workflow failed after {}ms", duration_ms);
                    }
                }
            }
        }
    });

    let result = runtime.execute(&workflow).await;

    // Wait for events to finish printing
    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    event_task.abort();

    let result = result?;

    println!();
    println!("📊 Execution Summary:");
    println!("   Execution ID: {}", result.execution_id);
    println!("   Completed: {}/{} nodes", result.results.len(), workflow.nodes.len());

    println!();
    println!("📤 Results:");
    for node in &workflow.nodes {
        if let Some(node_result) = result.result(&node.id) {
            println!("   {} ({}): {}", node.id, node.data.kind, node_result.output);
        }
    }

    println!();
    match &result.output {
        Some(output) => println!("🏁 Output: {}", output.output),
        None => println!("🏁 Output: (no output node)"),
    }

    Ok(())
}

fn validate_workflow(file: &Path) -> Result<()> {
    println!("🔍 Validating workflow: {}", file.display());

    let workflow = load_workflow(file)?;
    let sorted = order(&workflow.nodes, &workflow.edges)?.into_checked()?;

    let registry = build_registry(&ProviderConfig::default());
    let unsupported: Vec<&str> = workflow
        .nodes
        .iter()
        .filter(|n| !registry.contains(n.kind()))
        .map(|n| n.id.as_str())
        .collect();

    println!("✅ Workflow is valid:");
    println!("   Name: {}", workflow.metadata.name);
    println!("   Nodes: {}", workflow.nodes.len());
    println!("   Edges: {}", workflow.edges.len());
    println!(
        "   Order: {}",
        sorted.iter().map(|n| n.id.as_str()).collect::<Vec<_>>().join(" → ")
    );
    if !workflow.nodes.iter().any(|n| n.data.kind == NodeKind::Output) {
        println!("   ⚠️  No output node, the run will report no output");
    }
    if !unsupported.is_empty() {
        println!(
            "   ⚠️  Nodes with unsupported types produce empty output: {}",
            unsupported.join(", ")
        );
    }

    Ok(())
}

fn list_nodes() {
    println!("📦 Available Node Types:");
    println!();

    let registry = build_registry(&ProviderConfig::default());

    for kind in registry.list_node_types() {
        if let Some(metadata) = registry.get_metadata(&kind) {
            println!("  • {} ({})", kind, metadata.category);
            println!("    {}", metadata.description);
        } else {
            println!("  • {}", kind);
        }
    }
}

/// Haiku generator with a notes file shown beside it
fn example_workflow() -> Workflow {
    let mut workflow = Workflow::new("Example Workflow");
    workflow.metadata.description =
        "Writes a haiku and shows a notes file next to it".to_string();

    let file_node = WorkflowNode::new("notes", NodeKind::FileToText)
        .with_label("Notes")
        .with_file(FileAttachment::new(
            "notes.txt",
            "text/plain",
            "Rust workflows, one node at a time.",
        ))
        .with_position(100.0, 100.0);

    let notes_view = WorkflowNode::new("notes-view", NodeKind::Output)
        .with_label("Notes")
        .with_position(400.0, 100.0);

    let haiku_node = WorkflowNode::new("haiku", NodeKind::TextGeneration)
        .with_label("Haiku")
        .with_prompt("Write a one-line haiku about workflow engines.")
        .with_position(100.0, 300.0);

    let output_node = WorkflowNode::new("result", NodeKind::Output)
        .with_label("Result")
        .with_position(400.0, 300.0);

    let haiku_id = workflow.add_node(haiku_node);
    let output_id = workflow.add_node(output_node);
    let notes_id = workflow.add_node(file_node);
    let notes_view_id = workflow.add_node(notes_view);

    workflow.connect(haiku_id, output_id);
    workflow.connect(notes_id, notes_view_id);

    workflow
}

fn create_example_workflow(output: &Path) -> Result<()> {
    let workflow = example_workflow();
    let json = serde_json::to_string_pretty(&workflow)?;
    std::fs::write(output, json)?;

    println!("✨ Created example workflow: {}", output.display());
    println!();
    println!("Run it with:");
    println!("  OPENAI_API_KEY=... studio run --file {}", output.display());

    Ok(())
}
