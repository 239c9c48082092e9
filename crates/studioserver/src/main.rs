use actix_cors::Cors;
use actix_web::{
    get, post, web, App, HttpRequest, HttpResponse, HttpServer, Responder, Result as ActixResult,
};
use actix_ws::Message;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use studiocore::Workflow;
use studionodes::{Capabilities, ProviderConfig};
use studioruntime::{
    MemoryWorkflowStore, NodeRegistry, RuntimeConfig, SavedWorkflow, StudioRuntime, WorkflowStore,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Header carrying the authenticated user's email, set by the auth proxy
const USER_HEADER: &str = "X-User-Email";

/// Workflows carry uploaded files inline
const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Application state shared across handlers
struct AppState {
    runtime: Arc<StudioRuntime>,
    store: Arc<dyn WorkflowStore>,
}

/// Request body for saving a workflow
#[derive(Debug, Deserialize)]
struct SaveRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

/// Response for a successful execution
#[derive(Debug, Serialize)]
struct ExecutionResponse {
    success: bool,
    output: Option<studiocore::NodeResult>,
    results: std::collections::HashMap<String, studiocore::NodeResult>,
}

#[derive(Debug, Serialize)]
struct SaveResponse {
    success: bool,
    workflow: SavedWorkflow,
}

#[derive(Debug, Serialize)]
struct LoadResponse {
    success: bool,
    workflows: Vec<SavedWorkflow>,
}

/// Error response
#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

fn current_user(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(ErrorResponse::new("Unauthorized"))
}

fn missing_name_or_data() -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse::new("Missing name or data"))
}

/// Health check endpoint
#[get("/health")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "studioserver"
    }))
}

/// Execute a workflow document
#[post("/api/workflow/execute")]
async fn execute_workflow(
    data: web::Data<AppState>,
    body: web::Bytes,
) -> ActixResult<impl Responder> {
    let workflow: Workflow = match serde_json::from_slice(&body) {
        Ok(workflow) => workflow,
        Err(e) => {
            warn!("Rejected workflow document: {}", e);
            return Ok(HttpResponse::BadRequest().json(ErrorResponse::new(e.to_string())));
        }
    };

    info!(
        "Executing workflow '{}' ({} nodes)",
        workflow.metadata.name,
        workflow.nodes.len()
    );

    match data.runtime.execute(&workflow).await {
        Ok(result) => Ok(HttpResponse::Ok().json(ExecutionResponse {
            success: true,
            output: result.output,
            results: result.results,
        })),
        Err(e) => {
            error!("Workflow execution failed: {}", e);
            Ok(HttpResponse::BadRequest().json(ErrorResponse::new(e.user_message())))
        }
    }
}

/// Save a named workflow for the current user
#[post("/api/workflow/save")]
async fn save_workflow(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Bytes,
) -> ActixResult<impl Responder> {
    let Some(user) = current_user(&req) else {
        return Ok(unauthorized());
    };

    let request: SaveRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Rejected save request: {}", e);
            return Ok(HttpResponse::BadRequest().json(ErrorResponse::new(e.to_string())));
        }
    };

    let (Some(name), Some(document)) = (request.name, request.data) else {
        return Ok(missing_name_or_data());
    };

    match data.store.save(&user, &name, document).await {
        Ok(workflow) => Ok(HttpResponse::Ok().json(SaveResponse {
            success: true,
            workflow,
        })),
        Err(e) => {
            warn!("Saving workflow for {} rejected: {}", user, e);
            Ok(missing_name_or_data())
        }
    }
}

/// List the current user's workflows, most recently updated first
#[get("/api/workflow/load")]
async fn load_workflows(
    req: HttpRequest,
    data: web::Data<AppState>,
) -> ActixResult<impl Responder> {
    let Some(user) = current_user(&req) else {
        return Ok(unauthorized());
    };

    match data.store.list(&user).await {
        Ok(workflows) => Ok(HttpResponse::Ok().json(LoadResponse {
            success: true,
            workflows,
        })),
        Err(e) => {
            error!("Loading workflows for {} failed: {}", user, e);
            Ok(HttpResponse::InternalServerError().json(ErrorResponse::new(e.to_string())))
        }
    }
}

/// WebSocket endpoint for real-time events
#[get("/api/events")]
async fn websocket_events(
    req: HttpRequest,
    stream: web::Payload,
    data: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let (res, mut session, mut msg_stream) = actix_ws::handle(&req, stream)?;

    info!("WebSocket client connected");

    let mut events = data.runtime.subscribe_events();

    actix_web::rt::spawn(async move {
        loop {
            tokio::select! {
                event = events.recv() => {
                    match event {
                        Ok(event) => {
                            if let Ok(json) = serde_json::to_string(&event) {
                                if session.text(json).await.is_err() {
                                    break;
                                }
                            }
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!("WebSocket client lagged, {} events dropped", skipped);
                        }
                        Err(_) => break,
                    }
                }

                Some(Ok(msg)) = msg_stream.recv() => {
                    match msg {
                        Message::Ping(bytes) => {
                            if session.pong(&bytes).await.is_err() {
                                break;
                            }
                        }
                        Message::Close(_) => break,
                        _ => {}
                    }
                }

                else => break,
            }
        }

        info!("WebSocket client disconnected");
        let _ = session.close(None).await;
    });

    Ok(res)
}

/// List available node types
#[get("/api/nodes")]
async fn list_node_types(data: web::Data<AppState>) -> ActixResult<impl Responder> {
    let registry = data.runtime.registry();

    let nodes: Vec<_> = registry
        .list_node_types()
        .iter()
        .map(|kind| {
            let metadata = registry.get_metadata(kind).unwrap_or_default();
            serde_json::json!({
                "type": kind.as_str(),
                "description": metadata.description,
                "category": metadata.category,
            })
        })
        .collect();

    Ok(HttpResponse::Ok().json(nodes))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting studio server");

    let providers = ProviderConfig::from_env();
    for (name, key) in [
        ("OPENAI_API_KEY", &providers.openai_api_key),
        ("REPLICATE_API_KEY", &providers.replicate_api_key),
        ("OCR_SPACE_API_KEY", &providers.ocr_space_api_key),
    ] {
        if key.is_none() {
            warn!("{} is not set", name);
        }
    }

    let mut registry = NodeRegistry::new();
    studionodes::register_all(&mut registry, &Capabilities::from_config(&providers));

    let runtime = StudioRuntime::with_registry(Arc::new(registry), RuntimeConfig::default());

    let app_state = web::Data::new(AppState {
        runtime: Arc::new(runtime),
        store: Arc::new(MemoryWorkflowStore::new()),
    });

    let bind_address =
        std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

    info!("Server starting on http://{}", bind_address);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(app_state.clone())
            .app_data(web::PayloadConfig::new(MAX_BODY_BYTES))
            .wrap(cors)
            .wrap(actix_web::middleware::Logger::default())
            .service(health_check)
            .service(execute_workflow)
            .service(save_workflow)
            .service(load_workflows)
            .service(websocket_events)
            .service(list_node_types)
    })
    .bind(&bind_address)?
    .run()
    .await?;

    Ok(())
}
