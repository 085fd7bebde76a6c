//! Dummy LLM provider — returns a canned decision line.
//! Used for testing the full webhook round-trip without a real API key.

use crate::llm::ProviderError;

#[derive(Debug, Clone)]
pub struct DummyProvider {
    reply: String,
}

impl Default for DummyProvider {
    fn default() -> Self {
        Self { reply: "WAIT | reason: dummy provider".to_string() }
    }
}

impl DummyProvider {
    /// A dummy that replies with `reply` instead of the canned line.
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self { reply: reply.into() }
    }

    pub async fn complete(&self, _prompt: &str, _system: Option<&str>) -> Result<String, ProviderError> {
        Ok(self.reply.clone())
    }
}
