//! Chat Session - append-only transcript replayed to the model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::llm::ModelMessage;
use crate::types::{AiChatResponse, ChangeRecord, HistoryTurn, Role};

/// One turn of the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_changes: Option<Vec<ChangeRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::User,
            content: content.into(),
            code_changes: None,
            suggestion: None,
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(response: &AiChatResponse) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::Assistant,
            content: response.explanation.clone(),
            code_changes: Some(response.code_changes.clone()),
            suggestion: response.suggestion.clone(),
            timestamp: Utc::now(),
        }
    }

    pub fn to_history(&self) -> HistoryTurn {
        HistoryTurn {
            role: self.role,
            content: self.content.clone(),
            code_changes: self.code_changes.clone(),
            suggestion: self.suggestion.clone(),
        }
    }
}

/// Ordered transcript of one user's conversation
///
/// Never pruned: sessions are short enough that the whole history is sent
/// on every call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session opened by an assistant greeting
    pub fn with_greeting(text: impl Into<String>) -> Self {
        let mut session = Self::new();
        session.push_assistant(&AiChatResponse::explanation_only(text));
        session
    }

    pub fn push_user(&mut self, content: impl Into<String>) -> &ChatMessage {
        self.push(ChatMessage::user(content))
    }

    pub fn push_assistant(&mut self, response: &AiChatResponse) -> &ChatMessage {
        self.push(ChatMessage::assistant(response))
    }

    fn push(&mut self, message: ChatMessage) -> &ChatMessage {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Turns in the shape sent as `conversationHistory`
    pub fn to_history(&self) -> Vec<HistoryTurn> {
        self.messages.iter().map(ChatMessage::to_history).collect()
    }

    /// Turns in the shape the model receives
    pub fn to_model_context(&self) -> Vec<ModelMessage> {
        model_context(&self.to_history())
    }
}

/// Project history turns into model messages
///
/// Assistant turns are re-serialized with their change list and suggestion
/// so the model can refer back to its own structured output.
pub fn model_context(history: &[HistoryTurn]) -> Vec<ModelMessage> {
    history
        .iter()
        .map(|turn| match turn.role {
            Role::User => ModelMessage::user(turn.content.clone()),
            Role::Assistant => {
                let replay = serde_json::json!({
                    "explanation": turn.content,
                    "codeChanges": turn.code_changes.clone().unwrap_or_default(),
                    "suggestion": turn.suggestion.clone().unwrap_or_default(),
                });
                ModelMessage::assistant(replay.to_string())
            }
        })
        .collect()
}
