//! Concrete provider backends and config-driven selection.

pub mod dummy;
pub mod openai_compatible;

use crate::config::LlmConfig;
use crate::llm::{LlmProvider, ProviderError};

/// Build the provider named by `config.provider`.
///
/// `api_key` comes from the `LLM_API_KEY` env var — never TOML. It is
/// ignored by the dummy backend.
pub fn build(config: &LlmConfig, api_key: Option<String>) -> Result<LlmProvider, ProviderError> {
    match config.provider.as_str() {
        "dummy" => Ok(LlmProvider::Dummy(dummy::DummyProvider::default())),
        "openai" => {
            let p = openai_compatible::OpenAiCompatibleProvider::new(
                config.openai.api_base_url.clone(),
                config.openai.model.clone(),
                config.openai.temperature,
                config.openai.timeout_seconds,
                api_key,
            )?;
            Ok(LlmProvider::OpenAi(p))
        }
        other => Err(ProviderError::UnknownProvider(other.to_string())),
    }
}
