//! HTTP API: the chat endpoint, the focus capture endpoints and the static
//! frontend.

mod chat;
mod focus;
pub mod types;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Json, Router,
};
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::agent::{Agent, AgentError};
use crate::config::Config;
use crate::focus::{BoundaryPolicy, FocusStore};
use crate::llm::{GeminiClient, TextModel};

use types::{ApiInfo, HealthResponse};

/// Shared application state.
pub struct AppState {
    pub config: Config,

    /// `None` when the chat credential is missing
    pub agent: Option<Agent>,

    /// Classification / analysis model, `None` when its credential is missing
    pub text_model: Option<Arc<dyn TextModel>>,

    pub store: FocusStore,

    pub boundary: BoundaryPolicy,

    /// Guards the session read and the capture write of each capture request
    pub capture_lock: Mutex<()>,
}

impl AppState {
    pub fn new(
        config: Config,
        agent: Option<Agent>,
        text_model: Option<Arc<dyn TextModel>>,
        store: FocusStore,
    ) -> Self {
        Self {
            config,
            agent,
            text_model,
            store,
            boundary: BoundaryPolicy::default(),
            capture_lock: Mutex::new(()),
        }
    }
}

async fn api_info() -> Json<ApiInfo> {
    Json(ApiInfo {
        message: "Focus Catcher API is running".to_string(),
    })
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Build the router. The frontend directory is served for every unmatched
/// path when it exists.
pub fn router(state: Arc<AppState>) -> Router {
    let frontend_dir = state.config.frontend_dir.clone();

    let mut app = Router::new()
        .route("/api", get(api_info))
        .route("/api/health", get(health))
        .route("/chat", post(chat::chat))
        .route("/api/focus/capture", post(focus::capture))
        .route("/api/focus/sessions", get(focus::list_sessions))
        .route("/api/focus/sessions/:session_id", delete(focus::delete_session))
        .route("/api/focus/captures/:session_id", get(focus::list_captures))
        .route("/api/focus/analyze/:session_id", post(focus::analyze))
        .with_state(state);

    if frontend_dir.is_dir() {
        app = app.fallback_service(ServeDir::new(frontend_dir));
    } else {
        tracing::warn!(
            "Frontend directory {} not found, static files disabled",
            frontend_dir.display()
        );
    }

    app.layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Build every collaborator from `config` and serve until shutdown.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let store = FocusStore::open(&config.database_path)?;
    tracing::info!("Database: {}", config.database_path.display());

    let agent = match Agent::from_config(&config) {
        Ok(agent) => {
            tracing::info!(
                "Chat agent ready (model: {}, tools: {})",
                config.llm.chat_model,
                agent
                    .tools()
                    .list_tools()
                    .iter()
                    .map(|t| t.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            Some(agent)
        }
        Err(AgentError::Config(e)) => {
            tracing::warn!("Chat endpoint disabled: {}", e);
            None
        }
        Err(e) => return Err(e.into()),
    };

    let text_model: Option<Arc<dyn TextModel>> = match config.require_analysis_api_key() {
        Ok(key) => Some(Arc::new(GeminiClient::new(
            &config.analysis.base_url,
            &config.analysis.model,
            key,
        )?)),
        Err(e) => {
            tracing::warn!("Topic detection and analysis disabled: {}", e);
            None
        }
    };

    let addr = format!("{}:{}", config.host, config.port);
    let state = Arc::new(AppState::new(config, agent, text_model, store));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
