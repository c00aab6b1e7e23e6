//! Typed REST client for a running gateway
//!
//! Implements [`FileSink`] so the reconciler can drive a remote workspace the
//! same way the browser does: one HTTP call per mutation.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use codestudio_core::{
    AiChatRequest, AiChatResponse, ExecuteRequest, ExecuteResponse, File, FileSink, NewFile,
    Project, Result, WorkspaceError,
};

/// Client for connecting to a CodeStudio gateway
#[derive(Debug, Clone)]
pub struct WorkspaceClient {
    base_url: String,
    http: reqwest::Client,
}

impl WorkspaceClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn health(&self) -> Result<serde_json::Value> {
        let response = self.http.get(self.url("/health")).send().await?;
        decode(response).await
    }

    pub async fn get_project(&self, project_id: &str) -> Result<Option<Project>> {
        let response = self
            .http
            .get(self.url(&format!("/api/workspace/projects/{}", project_id)))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        decode(response).await.map(Some)
    }

    pub async fn list_files(&self, project_id: &str) -> Result<Vec<File>> {
        let response = self
            .http
            .get(self.url(&format!("/api/workspace/files/{}", project_id)))
            .send()
            .await?;
        decode(response).await
    }

    /// Send a chat turn; a failed model call comes back as `Remote` with the
    /// gateway's explanation as the message
    pub async fn chat(&self, request: &AiChatRequest) -> Result<AiChatResponse> {
        let response = self
            .http
            .post(self.url("/api/ai/chat"))
            .json(request)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn execute(&self, request: &ExecuteRequest) -> Result<ExecuteResponse> {
        let response = self
            .http
            .post(self.url("/api/workspace/execute"))
            .json(request)
            .send()
            .await?;
        decode(response).await
    }
}

#[async_trait]
impl FileSink for WorkspaceClient {
    async fn create_file(&self, file: NewFile) -> Result<File> {
        let response = self
            .http
            .post(self.url("/api/workspace/files"))
            .json(&file)
            .send()
            .await?;
        decode(response).await
    }

    async fn update_file(&self, id: &str, content: &str) -> Result<Option<File>> {
        let response = self
            .http
            .patch(self.url(&format!("/api/workspace/files/{}", id)))
            .json(&serde_json::json!({ "content": content }))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        decode(response).await.map(Some)
    }

    async fn delete_file(&self, id: &str) -> Result<bool> {
        let response = self
            .http
            .delete(self.url(&format!("/api/workspace/files/{}", id)))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        decode::<serde_json::Value>(response).await?;
        Ok(true)
    }
}

/// Decode a success body, or turn the error body into `Remote`
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let text = response.text().await?;
    decode_body(status, &text)
}

fn decode_body<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T> {
    if status.is_success() {
        return Ok(serde_json::from_str(body)?);
    }

    Err(WorkspaceError::Remote {
        status: status.as_u16(),
        message: error_message(body),
    })
}

/// Pull the human-readable part out of either error body shape
fn error_message(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => value
            .get("error")
            .or_else(|| value.get("explanation"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string()),
        Err(_) => body.to_string(),
    }
}
