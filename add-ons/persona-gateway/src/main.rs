//! Axum-based gateway: HTTP entry point for the persona chatbot.
//! Config-driven via PersonaConfig; everything the agent needs is built once
//! at startup and shared through AppState.

use axum::extract::{Json, State};
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use persona_core::{build_system_prompt, ChatAgent, PersonaConfig, Profile, ToolRegistry};
use persona_tools::{MockRuntime, OpenAiRuntime, PushoverClient, RecordUnknownQuestion, RecordUserDetails};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Example prompts surfaced by the chat widget.
const EXAMPLE_PROMPTS: [&str; 8] = [
    "Tell me about yourself",
    "What is your work experience?",
    "What is your education?",
    "What are your skills?",
    "What are your projects?",
    "what are your expertise?",
    "what are the certifications you have?",
    "I would like to get in touch with you",
];

const WIDGET_DESCRIPTION: &str = "👋 Welcome! Ask me anything about my career, skills, or \
experience. Please share your Name and email address or phone number to get connected. Thank you!";

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env::var calls)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[persona-gateway] .env not loaded: {} (using system environment)", e);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(PersonaConfig::load().expect("load PersonaConfig"));

    let profile = Profile::load(&config.profile_dir);
    if profile.is_empty() {
        tracing::warn!(
            target: "persona::gateway",
            dir = %config.profile_dir,
            "no biography documents found; answering without profile context"
        );
    }
    let instructions = build_system_prompt(&config.owner_name, &profile.summary, &profile.linkedin);

    let agent = Arc::new(build_agent(&config, instructions));
    tracing::info!(
        target: "persona::gateway",
        llm_mode = %config.llm_mode,
        "chat agent ready"
    );

    let app = build_app(AppState {
        config: Arc::clone(&config),
        agent,
    });

    let port = config.port;
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));
    tracing::info!("{} chatbot listening on {}", config.owner_name, addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await.unwrap(), app)
        .await
        .unwrap();
}

/// Builds the chat agent: tool registry + runtime chosen by llm_mode.
fn build_agent(config: &PersonaConfig, instructions: String) -> ChatAgent {
    let pushover = PushoverClient::new(&config.pushover_token, &config.pushover_user);
    if !pushover.is_configured() {
        tracing::warn!(
            target: "persona::gateway",
            "pushover credentials missing; notifications will be logged and dropped"
        );
    }

    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(RecordUserDetails::new(pushover.clone())));
    registry.register(Arc::new(RecordUnknownQuestion::new(pushover)));

    let runtime: Arc<dyn persona_core::AgentRuntime> = if config.is_live() {
        Arc::new(OpenAiRuntime::new(
            &config.api_url,
            &config.api_key,
            &config.model,
            config.max_tool_rounds,
        ))
    } else {
        Arc::new(MockRuntime::new())
    };

    ChatAgent::new(instructions, Arc::new(registry), runtime)
}

fn frontend_root_dir() -> std::path::PathBuf {
    // Prefer a working-directory relative path for local development (run from
    // workspace root); fall back to the manifest-relative path.
    let cwd = std::env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from("."));
    let from_cwd = cwd.join("persona-frontend");
    if from_cwd.exists() {
        return from_cwd;
    }

    std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("persona-frontend")
}

fn build_app(state: AppState) -> Router {
    let frontend_enabled = state.config.frontend_enabled;

    // CORS: allow the local dev port ranges the widget is served from.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(|origin: &axum::http::HeaderValue, _| {
            let s = origin.to_str().unwrap_or("");
            let port = s
                .split(':')
                .last()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(0);
            (3001..=3099).contains(&port) || (8001..=8099).contains(&port)
        }))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any);

    let mut app = Router::new()
        .route("/v1/status", get(status))
        .route("/api/v1/health", get(health))
        .route("/api/v1/examples", get(examples))
        .route("/api/v1/chat", post(chat))
        .with_state(state);

    if frontend_enabled {
        let frontend_dir = frontend_root_dir();
        let index_file = frontend_dir.join("index.html");

        app = app.route_service("/", ServeFile::new(index_file));
        app = app.nest_service("/ui", ServeDir::new(frontend_dir));
    }

    app.layer(cors)
}

#[derive(Clone)]
struct AppState {
    config: Arc<PersonaConfig>,
    agent: Arc<ChatAgent>,
}

/// GET /api/v1/health – liveness check for the widget and scripts.
async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

/// GET /v1/status – app identity and runtime mode from config.
async fn status(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "owner_name": state.config.owner_name,
        "port": state.config.port,
        "llm_mode": state.config.llm_mode,
        "model": state.config.model,
        "frontend_enabled": state.config.frontend_enabled,
    }))
}

/// GET /api/v1/examples – widget header text and the fixed example prompts.
async fn examples(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "title": format!("Ask {}", state.config.owner_name),
        "description": WIDGET_DESCRIPTION,
        "examples": EXAMPLE_PROMPTS,
    }))
}

/// Chat request from the widget: newest message plus its accumulated history.
/// History entries may be role/content mappings or `[role, content]` pairs.
#[derive(serde::Deserialize)]
struct ChatRequest {
    message: String,
    #[serde(default)]
    history: Vec<serde_json::Value>,
}

/// POST /api/v1/chat – runs one conversational turn.
async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> axum::response::Response {
    if req.message.trim().is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            axum::Json(serde_json::json!({
                "status": "error",
                "error": "message must not be empty",
            })),
        )
            .into_response();
    }

    tracing::info!(
        target: "persona::gateway",
        chars = req.message.len(),
        history = req.history.len(),
        "chat request received"
    );

    let reply = state.agent.chat(&req.message, &req.history).await;
    axum::Json(serde_json::json!({
        "status": "ok",
        "reply": reply,
    }))
    .into_response()
}
