//! Data model shared by the store, the gateway and the CLI
//!
//! Wire names are camelCase to stay compatible with the browser client.

use serde::{Deserialize, Serialize};

/// Identifier of the project seeded at startup
pub const DEFAULT_PROJECT_ID: &str = "default";

/// Logical grouping of files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A file held by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub path: String,
    pub content: String,
    /// Only used for syntax highlighting and preview routing
    pub language: String,
}

/// File-creation record; the store assigns the identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFile {
    pub project_id: String,
    pub name: String,
    /// Empty means `/<name>`
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub content: String,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "javascript".to_string()
}

impl NewFile {
    pub fn new(project_id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            project_id: project_id.into(),
            path: format!("/{}", name),
            language: crate::language::language_for(&name).to_string(),
            name,
            content: String::new(),
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }
}

/// What a change record asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Create,
    Update,
    Delete,
}

impl ChangeAction {
    /// Lenient parse used by the normalizer; unknown tags read as `None`
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "create" => Some(Self::Create),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }
}

impl Default for ChangeAction {
    fn default() -> Self {
        Self::Create
    }
}

impl std::fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// One file instruction produced by the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    pub file_name: String,
    #[serde(default)]
    pub new_content: String,
    #[serde(default)]
    pub action: ChangeAction,
}

impl ChangeRecord {
    pub fn new(
        file_name: impl Into<String>,
        new_content: impl Into<String>,
        action: ChangeAction,
    ) -> Self {
        Self {
            file_id: None,
            file_name: file_name.into(),
            new_content: new_content.into(),
            action,
        }
    }

    pub fn create(file_name: impl Into<String>, new_content: impl Into<String>) -> Self {
        Self::new(file_name, new_content, ChangeAction::Create)
    }

    pub fn update(file_name: impl Into<String>, new_content: impl Into<String>) -> Self {
        Self::new(file_name, new_content, ChangeAction::Update)
    }

    pub fn delete(file_name: impl Into<String>) -> Self {
        Self::new(file_name, "", ChangeAction::Delete)
    }

    pub fn with_file_id(mut self, file_id: impl Into<String>) -> Self {
        self.file_id = Some(file_id.into());
        self
    }
}

/// Normalized model answer, also the `/api/ai/chat` response body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiChatResponse {
    pub explanation: String,
    #[serde(default)]
    pub code_changes: Vec<ChangeRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl AiChatResponse {
    /// Response carrying only text, used for degraded parses and errors
    pub fn explanation_only(explanation: impl Into<String>) -> Self {
        Self {
            explanation: explanation.into(),
            code_changes: Vec::new(),
            suggestion: None,
        }
    }
}

/// Speaker of a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// The file open in the editor when the message was sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentFile {
    pub id: String,
    pub name: String,
    pub content: String,
    pub language: String,
}

/// File snapshot sent as model context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSnapshot {
    pub id: String,
    pub name: String,
    pub path: String,
    pub content: String,
    pub language: String,
}

impl From<&File> for FileSnapshot {
    fn from(file: &File) -> Self {
        Self {
            id: file.id.clone(),
            name: file.name.clone(),
            path: file.path.clone(),
            content: file.content.clone(),
            language: file.language.clone(),
        }
    }
}

/// A prior turn as carried in `conversationHistory`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryTurn {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_changes: Option<Vec<ChangeRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// `/api/ai/chat` request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiChatRequest {
    pub message: String,
    pub project_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_file: Option<CurrentFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_files: Option<Vec<FileSnapshot>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_history: Option<Vec<HistoryTurn>>,
}

impl AiChatRequest {
    pub fn new(message: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            project_id: project_id.into(),
            current_file: None,
            all_files: None,
            conversation_history: None,
        }
    }
}

/// `/api/workspace/execute` request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteRequest {
    pub code: String,
    pub language: String,
}

/// `/api/workspace/execute` response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteResponse {
    pub success: bool,
    pub output: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_file_defaults_from_wire() {
        let parsed: NewFile =
            serde_json::from_str(r#"{"projectId":"default","name":"a.txt"}"#).unwrap();
        assert_eq!(parsed.content, "");
        assert_eq!(parsed.language, "javascript");
        assert_eq!(parsed.path, "");
    }

    #[test]
    fn test_change_record_wire_names() {
        let change = ChangeRecord::create("index.html", "<p></p>").with_file_id("f1");
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["fileId"], "f1");
        assert_eq!(json["fileName"], "index.html");
        assert_eq!(json["newContent"], "<p></p>");
        assert_eq!(json["action"], "create");
    }

    #[test]
    fn test_change_action_parse() {
        assert_eq!(ChangeAction::parse("Update"), Some(ChangeAction::Update));
        assert_eq!(ChangeAction::parse(" delete "), Some(ChangeAction::Delete));
        assert_eq!(ChangeAction::parse("modify"), None);
    }

    #[test]
    fn test_chat_response_omits_missing_suggestion() {
        let json = serde_json::to_value(AiChatResponse::explanation_only("hi")).unwrap();
        assert_eq!(json["explanation"], "hi");
        assert_eq!(json["codeChanges"], serde_json::json!([]));
        assert!(json.get("suggestion").is_none());
    }
}
