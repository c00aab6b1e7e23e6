//! Main Gateway implementation
//!
//! Routes, shared state, and the server loop.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use codestudio_core::llm::prompt;
use codestudio_core::{
    normalize, AiChatRequest, AiChatResponse, ExecuteRequest, ExecuteResponse, File, FileStore,
    LlmProvider, NewFile, Project,
};

use crate::config::GatewayConfig;
use crate::{GatewayError, Result};

/// Text returned by the execute stub
pub const EXECUTE_STUB_OUTPUT: &str = "Code execution is handled in the browser preview";

/// Gateway state shared across handlers
#[derive(Clone)]
pub struct GatewayState {
    pub config: GatewayConfig,
    pub store: Arc<FileStore>,
    pub llm: Arc<dyn LlmProvider>,
    pub shutdown_tx: broadcast::Sender<()>,
}

impl GatewayState {
    pub fn new(config: GatewayConfig, llm: Arc<dyn LlmProvider>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let store = if config.seed_files {
            FileStore::seeded()
        } else {
            FileStore::new()
        };

        Self {
            config,
            store: Arc::new(store),
            llm,
            shutdown_tx,
        }
    }
}

#[derive(Debug, Deserialize)]
struct UpdateFileBody {
    content: String,
}

/// Main Gateway
pub struct Gateway {
    state: Arc<GatewayState>,
}

impl Gateway {
    /// Create a gateway, building the provider from the configuration
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let llm = config.llm.build_provider()?;
        Ok(Self::with_provider(config, llm))
    }

    /// Create a gateway around an existing provider
    pub fn with_provider(config: GatewayConfig, llm: Arc<dyn LlmProvider>) -> Self {
        let state = Arc::new(GatewayState::new(config, llm));
        Self { state }
    }

    /// Get gateway state
    pub fn state(&self) -> Arc<GatewayState> {
        self.state.clone()
    }

    /// Build the Axum router
    pub fn build_router(&self) -> Router {
        Router::new()
            .route("/health", get(Self::handle_health))
            .route("/status", get(Self::handle_status))
            .route("/api/ai/chat", post(Self::handle_chat))
            .route("/api/workspace/projects/:project_id", get(Self::handle_get_project))
            .route("/api/workspace/files", post(Self::handle_create_file))
            // One path segment: a project id for GET, a file id otherwise
            .route(
                "/api/workspace/files/:id",
                get(Self::handle_list_files)
                    .patch(Self::handle_update_file)
                    .delete(Self::handle_delete_file),
            )
            .route("/api/workspace/execute", post(Self::handle_execute))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Start the gateway server
    pub async fn start(&self) -> Result<()> {
        let addr = self.state.config.socket_addr()?;
        let router = self.build_router();

        tracing::info!("CodeStudio gateway starting on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        let mut shutdown_rx = self.state.shutdown_tx.subscribe();

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown_rx.recv() => {}
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Ctrl+C received");
                    }
                }
            })
            .await
            .map_err(|e| GatewayError::Internal(e.to_string()))?;

        tracing::info!("Gateway stopped");
        Ok(())
    }

    /// Shutdown the gateway
    pub fn shutdown(&self) {
        let _ = self.state.shutdown_tx.send(());
        tracing::info!("Gateway shutdown initiated");
    }

    // HTTP handlers

    async fn handle_health() -> impl IntoResponse {
        Json(serde_json::json!({
            "status": "healthy",
            "version": crate::VERSION
        }))
    }

    async fn handle_status(State(state): State<Arc<GatewayState>>) -> impl IntoResponse {
        Json(serde_json::json!({
            "version": crate::VERSION,
            "projects": state.store.project_count(),
            "files": state.store.file_count(),
            "llm": {
                "provider": state.llm.name(),
                "model": state.config.llm.model,
            }
        }))
    }

    async fn handle_chat(
        State(state): State<Arc<GatewayState>>,
        payload: std::result::Result<Json<AiChatRequest>, JsonRejection>,
    ) -> Result<Json<AiChatResponse>> {
        let Json(request) = payload.map_err(|e| GatewayError::Chat(e.body_text()))?;
        if request.message.is_empty() {
            return Err(GatewayError::Chat("Message must not be empty".to_string()));
        }

        tracing::info!(
            "AI chat for project {} ({} history turns)",
            request.project_id,
            request.conversation_history.as_ref().map_or(0, Vec::len)
        );

        let completion = state
            .llm
            .complete(prompt::build_request(&request))
            .await
            .map_err(|e| GatewayError::Chat(format!("{:#}", e)))?;

        tracing::debug!(
            "Model {} answered in {} ms ({} output tokens)",
            completion.model,
            completion.response_time_ms,
            completion.output_tokens
        );
        tracing::trace!("Raw model response: {}", completion.content);

        Ok(Json(normalize(&completion.content)))
    }

    async fn handle_get_project(
        State(state): State<Arc<GatewayState>>,
        Path(project_id): Path<String>,
    ) -> Result<Json<Project>> {
        state
            .store
            .get_project(&project_id)
            .map(Json)
            .ok_or(GatewayError::ProjectNotFound(project_id))
    }

    async fn handle_list_files(
        State(state): State<Arc<GatewayState>>,
        Path(project_id): Path<String>,
    ) -> Json<Vec<File>> {
        Json(state.store.list(&project_id))
    }

    async fn handle_create_file(
        State(state): State<Arc<GatewayState>>,
        payload: std::result::Result<Json<NewFile>, JsonRejection>,
    ) -> Result<Json<File>> {
        let Json(record) = payload.map_err(|e| GatewayError::BadRequest(e.body_text()))?;
        Ok(Json(state.store.create(record)))
    }

    async fn handle_update_file(
        State(state): State<Arc<GatewayState>>,
        Path(id): Path<String>,
        payload: std::result::Result<Json<UpdateFileBody>, JsonRejection>,
    ) -> Result<Json<File>> {
        let Json(body) = payload.map_err(|e| GatewayError::BadRequest(e.body_text()))?;
        state
            .store
            .update(&id, body.content)
            .map(Json)
            .ok_or(GatewayError::FileNotFound(id))
    }

    async fn handle_delete_file(
        State(state): State<Arc<GatewayState>>,
        Path(id): Path<String>,
    ) -> Result<Json<serde_json::Value>> {
        if state.store.delete(&id) {
            Ok(Json(serde_json::json!({ "success": true })))
        } else {
            Err(GatewayError::FileNotFound(id))
        }
    }

    async fn handle_execute(
        payload: std::result::Result<Json<ExecuteRequest>, JsonRejection>,
    ) -> Result<Json<ExecuteResponse>> {
        let Json(request) = payload.map_err(|e| GatewayError::BadRequest(e.body_text()))?;
        tracing::debug!("Execute stub called for {} code", request.language);

        Ok(Json(ExecuteResponse {
            success: true,
            output: EXECUTE_STUB_OUTPUT.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codestudio_core::llm::UnconfiguredProvider;

    #[test]
    fn test_gateway_creation() {
        let gateway = Gateway::new(GatewayConfig::default()).unwrap();
        assert!(gateway.state().config.port > 0);
        assert_eq!(gateway.state().llm.name(), "unconfigured");
    }

    #[test]
    fn test_gateway_state_seeding() {
        let state = GatewayState::new(GatewayConfig::default(), Arc::new(UnconfiguredProvider));
        assert_eq!(state.store.file_count(), 3);

        let mut config = GatewayConfig::default();
        config.seed_files = false;
        let state = GatewayState::new(config, Arc::new(UnconfiguredProvider));
        assert_eq!(state.store.file_count(), 0);
    }
}
