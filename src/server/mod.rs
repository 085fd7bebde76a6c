//! Axum HTTP listener — the inbound half of the relay.
//!
//! `run()` drives the axum event loop; a [`CancellationToken`] is wired to
//! axum's graceful shutdown so Ctrl-C drains in-flight requests.
//!
//! ## URL layout
//!
//! ```text
//! GET  /             → liveness one-liner
//! POST /trade-alert  → decision relay
//! ```

mod api;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, routing::{get, post}};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::Config;
use crate::error::AppError;
use crate::llm::LlmProvider;

// ── Shared request state ──────────────────────────────────────────────────────

/// Router state injected into every handler via [`axum::extract::State`].
///
/// Cheap to clone — the provider's HTTP client is reference-counted and the
/// prompts directory is an `Arc`. Nothing here is mutated per request.
#[derive(Clone)]
pub struct RelayState {
    /// Active LLM backend.
    pub provider: LlmProvider,
    /// Directory holding prompt template files.
    pub prompts_dir: Arc<PathBuf>,
    /// Hard ceiling on one decision round-trip, above the provider timeout.
    pub handler_timeout: Duration,
}

impl RelayState {
    pub fn new(provider: LlmProvider, prompts_dir: PathBuf, handler_timeout: Duration) -> Self {
        Self {
            provider,
            prompts_dir: Arc::new(prompts_dir),
            handler_timeout,
        }
    }

    /// State derived from a resolved [`Config`] and a built provider.
    pub fn from_config(config: &Config, provider: LlmProvider) -> Self {
        Self::new(
            provider,
            config.service.prompts_dir.clone(),
            Duration::from_secs(config.service.handler_timeout_seconds),
        )
    }
}

// ── Router / server loop ──────────────────────────────────────────────────────

/// Build the relay router. Exposed so tests can drive it in-process.
pub fn build_router(state: RelayState) -> Router {
    Router::new()
        .route("/", get(api::alive))
        .route("/trade-alert", post(api::trade_alert))
        .with_state(state)
}

/// Bind `bind_addr` and serve until `shutdown` is cancelled.
pub async fn run(bind_addr: &str, state: RelayState, shutdown: CancellationToken) -> Result<(), AppError> {
    let router = build_router(state);

    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| AppError::Server(format!("bind failed on {bind_addr}: {e}")))?;

    info!(%bind_addr, "webhook listener up");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AppError::Server(format!("server error: {e}")))?;

    info!("webhook listener shut down");
    Ok(())
}
