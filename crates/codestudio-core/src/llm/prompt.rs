//! Prompt text sent with every chat call

use crate::chat::model_context;
use crate::types::AiChatRequest;

use super::{LlmRequest, ModelMessage};

pub const SYSTEM_PROMPT: &str = r#"You are a web development assistant. Your only job is to WRITE HTML/CSS/JS CODE.

REQUIRED BEHAVIOUR:
- Always produce at least three files: index.html, style.css, script.js
- Never propose a plan; write the code directly
- Every file must be complete and working

STRICT JSON FORMAT (NO MARKDOWN):
{
  "explanation": "Short description",
  "codeChanges": [
    {"fileName":"index.html","newContent":"ESCAPED CODE","action":"create"},
    {"fileName":"style.css","newContent":"ESCAPED CODE","action":"create"},
    {"fileName":"script.js","newContent":"ESCAPED CODE","action":"create"}
  ],
  "suggestion":"Possible improvement"
}

Use "action":"delete" to remove a file. codeChanges MUST list every file you touch."#;

const ESCAPING_RULES: &str = r#"Answer with PURE JSON (no markdown).

ESCAPING RULES:
- In JavaScript prefer single quotes ' over "
- Escape newlines inside newContent as \n
- Escape double quotes inside newContent as \"

Answer in JSON now:"#;

/// Describe the project state and the request for the model
pub fn build_user_message(request: &AiChatRequest) -> String {
    let mut message = String::from("CURRENT PROJECT STATE:\n");

    match &request.all_files {
        Some(files) if !files.is_empty() => {
            message.push_str("Existing files:\n");
            for file in files {
                message.push_str(&format!(
                    "- {} ({}, {} characters)\n",
                    file.name,
                    file.language,
                    file.content.chars().count()
                ));
            }
        }
        _ => message.push_str("New project - no files yet.\n"),
    }

    if let Some(current) = &request.current_file {
        message.push_str(&format!(
            "\nCurrently open file: {}\n```{}\n{}\n```\n",
            current.name, current.language, current.content
        ));
    }

    message.push_str(&format!("\n\nREQUEST: {}\n\n", request.message));
    message.push_str(ESCAPING_RULES);
    message
}

/// Full completion request: system prompt, replayed history, then this turn
pub fn build_request(request: &AiChatRequest) -> LlmRequest {
    let mut messages = request
        .conversation_history
        .as_deref()
        .map(model_context)
        .unwrap_or_default();
    messages.push(ModelMessage::user(build_user_message(request)));

    LlmRequest::new(messages).with_system(SYSTEM_PROMPT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CurrentFile, FileSnapshot, HistoryTurn, Role};

    fn snapshot(name: &str, language: &str, content: &str) -> FileSnapshot {
        FileSnapshot {
            id: name.to_string(),
            name: name.to_string(),
            path: format!("/{}", name),
            content: content.to_string(),
            language: language.to_string(),
        }
    }

    #[test]
    fn test_new_project_message() {
        let request = AiChatRequest::new("a bakery site", "default");
        let message = build_user_message(&request);
        assert!(message.contains("New project - no files yet."));
        assert!(message.contains("REQUEST: a bakery site"));
    }

    #[test]
    fn test_lists_files_and_open_file() {
        let mut request = AiChatRequest::new("make it red", "default");
        request.all_files = Some(vec![snapshot("style.css", "css", "body{}")]);
        request.current_file = Some(CurrentFile {
            id: "1".to_string(),
            name: "style.css".to_string(),
            content: "body{}".to_string(),
            language: "css".to_string(),
        });

        let message = build_user_message(&request);
        assert!(message.contains("- style.css (css, 6 characters)"));
        assert!(message.contains("```css\nbody{}\n```"));
    }

    #[test]
    fn test_request_replays_history_before_turn() {
        let mut request = AiChatRequest::new("again", "default");
        request.conversation_history = Some(vec![
            HistoryTurn {
                role: Role::User,
                content: "first".to_string(),
                code_changes: None,
                suggestion: None,
            },
            HistoryTurn {
                role: Role::Assistant,
                content: "done".to_string(),
                code_changes: None,
                suggestion: None,
            },
        ]);

        let llm_request = build_request(&request);
        assert_eq!(llm_request.system.as_deref(), Some(SYSTEM_PROMPT));
        assert_eq!(llm_request.messages.len(), 3);
        assert_eq!(llm_request.messages[0], ModelMessage::user("first"));
        assert_eq!(llm_request.messages[1].role, Role::Assistant);
        assert!(llm_request.messages[2].content.contains("REQUEST: again"));
    }
}
