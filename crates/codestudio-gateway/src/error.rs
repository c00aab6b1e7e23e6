//! Error types for the Gateway

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use codestudio_core::AiChatResponse;

/// Gateway error type
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Chat failures keep the chat response shape
    #[error("{0}")]
    Chat(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        GatewayError::Serialization(e.to_string())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self {
            GatewayError::Chat(message) => {
                tracing::error!("AI chat error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(AiChatResponse::explanation_only(message)),
                )
                    .into_response()
            }
            GatewayError::FileNotFound(_) => error_body(StatusCode::NOT_FOUND, "File not found"),
            GatewayError::ProjectNotFound(_) => {
                error_body(StatusCode::NOT_FOUND, "Project not found")
            }
            GatewayError::BadRequest(message) => error_body(StatusCode::BAD_REQUEST, &message),
            other => {
                tracing::error!("Request failed: {}", other);
                error_body(StatusCode::INTERNAL_SERVER_ERROR, &other.to_string())
            }
        }
    }
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// Result type for Gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;
