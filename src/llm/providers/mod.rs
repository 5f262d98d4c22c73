//! LLM provider implementations.
//!
//! `build(config, hf_token)` is the factory — called at startup. It returns
//! `None` when the service should run template-only ("rule_based", or a
//! remote provider selected without a token). Adding a new backend = new
//! module + new match arm.

pub mod dummy;
pub mod hf_api;

use tracing::warn;

use crate::config::LlmConfig;
use crate::llm::{LlmProvider, ProviderError};

/// Construct a provider from config and an optional API token.
///
/// `hf_token` is sourced from the `HF_TOKEN` env var (never TOML).
pub fn build(
    config: &LlmConfig,
    hf_token: Option<String>,
) -> Result<Option<LlmProvider>, ProviderError> {
    match config.provider.as_str() {
        "rule_based" => Ok(None),
        "dummy" => Ok(Some(LlmProvider::Dummy(dummy::DummyProvider))),
        "huggingface" | "hf_api" => {
            let Some(token) = hf_token else {
                warn!("HF_TOKEN not set; falling back to template responses");
                return Ok(None);
            };
            let hf = &config.huggingface;
            let p = hf_api::HfApiProvider::new(
                hf.api_base_url.clone(),
                hf.model.clone(),
                hf.timeout_seconds,
                hf.max_retries,
                token,
            )?;
            Ok(Some(LlmProvider::HfApi(p)))
        }
        _ => Err(ProviderError::UnknownProvider(config.provider.clone())),
    }
}
