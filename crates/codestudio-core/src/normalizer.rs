//! Response Normalizer
//!
//! Models are asked for bare JSON but often wrap it in a fenced block, drop
//! fields, or answer in prose. [`normalize`] never fails: anything it cannot
//! read becomes a plain explanation with no changes. [`normalize_strict`]
//! reports the parse problem instead and leaves the decision to the caller.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::NormalizeError;
use crate::types::{AiChatResponse, ChangeAction, ChangeRecord};

/// Name given to changes that arrive without one
pub const PLACEHOLDER_FILE_NAME: &str = "untitled.txt";

lazy_static! {
    static ref JSON_FENCE: Regex = Regex::new(r"(?s)```json\s*(.*?)\s*```").unwrap();
    static ref WHOLE_FENCE: Regex = Regex::new(r"(?s)\A```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)\s*```\z").unwrap();
}

/// Strip one level of fenced-code wrapping
///
/// A fence spanning the whole text wins; otherwise the first ```` ```json ````
/// block inside surrounding prose is taken. Text without a fence is only
/// trimmed.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    if let Some(body) = WHOLE_FENCE.captures(trimmed).and_then(|c| c.get(1)) {
        return body.as_str().trim();
    }

    match JSON_FENCE.captures(raw).and_then(|c| c.get(1)) {
        Some(body) => body.as_str().trim(),
        None => trimmed,
    }
}

/// Coerce raw model text into a response, degrading to plain text
///
/// On a degraded parse the explanation is `raw` exactly as received.
pub fn normalize(raw: &str) -> AiChatResponse {
    match parse_response(raw) {
        Ok(object) => {
            let response = from_object(object);
            tracing::debug!(
                "Normalized model response with {} code changes",
                response.code_changes.len()
            );
            response
        }
        Err(e) => {
            tracing::warn!("Model response is not structured ({}), using it as text", e);
            AiChatResponse::explanation_only(raw)
        }
    }
}

/// Like [`normalize`] but returns the parse error instead of degrading
pub fn normalize_strict(raw: &str) -> Result<AiChatResponse, NormalizeError> {
    parse_response(raw).map(from_object)
}

/// Bare JSON first, so fences inside string values are never unwrapped;
/// then the fenced candidates
fn parse_response(raw: &str) -> Result<Map<String, Value>, NormalizeError> {
    let trimmed = raw.trim();
    if let Ok(object) = parse_object(trimmed) {
        return Ok(object);
    }

    let stripped = strip_code_fence(raw);
    let result = parse_object(stripped);
    if result.is_ok() {
        return result;
    }

    // Prose around a json block whose wrapper fence did not hold JSON
    match JSON_FENCE.captures(raw).and_then(|c| c.get(1)) {
        Some(body) if body.as_str().trim() != stripped => {
            parse_object(body.as_str().trim()).or(result)
        }
        _ => result,
    }
}

fn parse_object(body: &str) -> Result<Map<String, Value>, NormalizeError> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err(NormalizeError::NotAnObject),
        Err(e) => Err(NormalizeError::InvalidJson(e.to_string())),
    }
}

fn from_object(object: Map<String, Value>) -> AiChatResponse {
    let explanation = object
        .get("explanation")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let code_changes = match object.get("codeChanges") {
        Some(Value::Array(entries)) => entries.iter().map(change_from_value).collect(),
        _ => Vec::new(),
    };

    let suggestion = object
        .get("suggestion")
        .and_then(Value::as_str)
        .map(str::to_string);

    AiChatResponse {
        explanation,
        code_changes,
        suggestion,
    }
}

/// Entries that are not objects are read as if every field were absent
fn change_from_value(entry: &Value) -> ChangeRecord {
    let field = |key: &str| entry.get(key).and_then(Value::as_str);

    ChangeRecord {
        file_id: field("fileId")
            .filter(|id| !id.is_empty())
            .map(str::to_string),
        file_name: field("fileName")
            .filter(|name| !name.is_empty())
            .unwrap_or(PLACEHOLDER_FILE_NAME)
            .to_string(),
        new_content: field("newContent").unwrap_or_default().to_string(),
        action: field("action")
            .and_then(ChangeAction::parse)
            .unwrap_or_default(),
    }
}
