//! CodeStudio Core - workspace files driven by a language model
//!
//! This crate holds everything the CodeStudio gateway and CLI share:
//!
//! - **File Store**: in-memory projects and files, one instance per deployment
//! - **Response Normalizer**: coerces loosely-structured model output into an
//!   [`AiChatResponse`]
//! - **Reconciler**: turns change records into create/update/delete mutations
//!   against any [`FileSink`]
//! - **Chat Session**: append-only transcript replayed to the model
//! - **LLM**: the provider seam and the prompt builder
//!
//! # Data flow
//!
//! ```text
//! user message ─▶ ChatSession ─▶ LlmProvider ─▶ normalize() ─▶ Reconciler ─▶ FileSink
//! ```

pub mod chat;
pub mod error;
pub mod language;
pub mod llm;
pub mod normalizer;
pub mod reconciler;
pub mod store;
pub mod types;

pub use chat::{model_context, ChatMessage, ChatSession};
pub use error::{NormalizeError, Result, WorkspaceError};
pub use language::language_for;
pub use llm::{
    AnthropicProvider, LlmProvider, LlmRequest, LlmResponse, ModelMessage, ProviderConfig,
    UnconfiguredProvider,
};
pub use normalizer::{normalize, normalize_strict, strip_code_fence};
pub use reconciler::{FileSink, Mutation, MutationOutcome, ReconcileReport, Reconciler, Target};
pub use store::FileStore;
pub use types::{
    AiChatRequest, AiChatResponse, ChangeAction, ChangeRecord, CurrentFile, ExecuteRequest,
    ExecuteResponse, File, FileSnapshot, HistoryTurn, NewFile, Project, Role, DEFAULT_PROJECT_ID,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
