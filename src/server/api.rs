//! Handlers for the relay routes.
//!
//! `trade_alert` is the whole pipeline: alert → prompt → one LLM round-trip →
//! one-line decision back to the caller. The outbound call is wrapped in
//! [`tokio::time::timeout`] as a hard ceiling over the provider's own HTTP
//! timeout; every failure path produces the `WAIT` error envelope rather
//! than a bare status.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::alert::TradeAlert;
use crate::llm::ProviderError;
use crate::prompt;

use super::RelayState;

/// Decision relayed when the model gave no usable reply (still a 200 —
/// the upstream call itself succeeded).
const NO_RESPONSE_DECISION: &str = "WAIT | reason: no response";

/// Decision relayed with every 500.
const INTERNAL_ERROR_DECISION: &str = "WAIT | reason: internal error";

/// GET / — liveness probe.
pub(super) async fn alive() -> &'static str {
    "strategy webhook alive"
}

/// POST /trade-alert
pub(super) async fn trade_alert(
    State(state): State<RelayState>,
    Json(alert): Json<TradeAlert>,
) -> Response {
    let request_id = Uuid::new_v4();
    let symbol = alert.symbol().unwrap_or("?").to_string();

    let user_prompt = prompt::decision_prompt(state.prompts_dir.as_ref(), &alert);
    let system = prompt::system_prompt(state.prompts_dir.as_ref());

    let outcome = tokio::time::timeout(
        state.handler_timeout,
        state.provider.complete(&user_prompt, Some(&system)),
    )
    .await;

    match outcome {
        Ok(Ok(reply)) => {
            let decision = decision_line(&reply);
            info!(%request_id, %symbol, %decision, "trade decision");
            ok_body(decision, &alert)
        }
        Ok(Err(ProviderError::EmptyReply)) => {
            warn!(%request_id, %symbol, "model returned no content — defaulting to WAIT");
            ok_body(NO_RESPONSE_DECISION.to_string(), &alert)
        }
        Ok(Err(e)) => {
            warn!(%request_id, %symbol, error = %e, "decision request failed");
            error_body(e)
        }
        Err(_) => {
            warn!(%request_id, %symbol, "decision request timed out");
            error_body("LLM request timed out")
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn ok_body(decision: String, alert: &TradeAlert) -> Response {
    (StatusCode::OK, Json(json!({ "decision": decision, "raw": alert }))).into_response()
}

fn error_body(err: impl std::fmt::Display) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "decision": INTERNAL_ERROR_DECISION, "error": format!("{err}") })),
    )
        .into_response()
}

/// The contract is one line: relay the first non-empty line of the model
/// reply, trimmed, so multi-line chatter never leaks to the caller.
fn decision_line(reply: &str) -> String {
    reply
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or(NO_RESPONSE_DECISION)
        .to_string()
}
