//! Dummy LLM provider — echoes the prompt back prefixed with `[echo]`.
//! Used for exercising the full chat path without a real API token.

use crate::llm::ProviderError;

#[derive(Debug, Clone)]
pub struct DummyProvider;

impl DummyProvider {
    pub async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        Ok(format!("[echo] {prompt}"))
    }
}
