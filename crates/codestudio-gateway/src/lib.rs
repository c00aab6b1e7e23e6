//! CodeStudio Gateway - HTTP surface of the workspace
//!
//! Serves the file endpoints backed by the in-memory [`FileStore`] and the
//! AI chat endpoint that forwards a request to the configured language model
//! and returns its normalized answer.
//!
//! # Architecture
//!
//! ```text
//!   browser / codestudio CLI
//!              │  JSON over HTTP
//!   ┌──────────▼──────────┐
//!   │    axum Router      │── /api/ai/chat ──▶ LlmProvider ──▶ normalize()
//!   └──────────┬──────────┘
//!              │ /api/workspace/*
//!   ┌──────────▼──────────┐
//!   │     FileStore       │  (one per process, re-seeded on start)
//!   └─────────────────────┘
//! ```
//!
//! Reconciliation of the returned changes happens on the client side,
//! through [`WorkspaceClient`] or the browser.
//!
//! [`FileStore`]: codestudio_core::FileStore

pub mod client;
pub mod config;
pub mod error;
pub mod gateway;

pub use client::WorkspaceClient;
pub use config::{GatewayConfig, LlmSettings};
pub use error::{GatewayError, Result};
pub use gateway::{Gateway, GatewayState};

/// Gateway version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5000;

/// Default host
pub const DEFAULT_HOST: &str = "127.0.0.1";
