//! LLM provider abstraction.
//!
//! `LlmProvider` is an enum over concrete provider implementations.
//! Add a new variant + module in `providers/` for each additional backend.
//!
//! Provider instances are shared immutable capabilities — clone them freely
//! (the HTTP client inside the OpenAI provider is reference-counted).
//! Enum dispatch avoids `dyn` trait objects and the `async-trait` dependency.

pub mod providers;

use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("provider request failed: {0}")]
    Request(String),
    /// The call succeeded but the model returned no usable text.
    /// Callers map this to the `WAIT | reason: no response` fallback rather
    /// than a hard failure.
    #[error("provider returned an empty reply")]
    EmptyReply,
}

// ── Provider enum ─────────────────────────────────────────────────────────────

/// All available provider backends.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    Dummy(providers::dummy::DummyProvider),
    OpenAi(providers::openai_compatible::OpenAiCompatibleProvider),
}

impl LlmProvider {
    /// One completion round-trip: `prompt` as the user message, `system`
    /// as the optional system message. Returns the model's text reply.
    pub async fn complete(&self, prompt: &str, system: Option<&str>) -> Result<String, ProviderError> {
        match self {
            LlmProvider::Dummy(p) => p.complete(prompt, system).await,
            LlmProvider::OpenAi(p) => p.complete(prompt, system).await,
        }
    }
}
