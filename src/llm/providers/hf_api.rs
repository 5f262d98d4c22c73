//! Hugging Face Inference API text-generation provider.
//!
//! POSTs `{ "inputs": ..., "parameters": ... }` to
//! `<api_base_url>/<model>` with a bearer token. A 503 means the model is
//! still loading on the hub side, so the call is retried with exponential
//! backoff; 429 and 401 are surfaced to the caller as distinct errors so
//! the HTTP layer can map them, and anything else fails the request (the
//! agent then falls back to templates).

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{Value, json};
use tracing::{error, warn};

use crate::llm::ProviderError;

#[derive(Debug, Clone)]
pub struct HfApiProvider {
    client: reqwest::Client,
    url: String,
    max_retries: u32,
}

impl HfApiProvider {
    pub fn new(
        api_base_url: String,
        model: String,
        timeout_seconds: u64,
        max_retries: u32,
        token: String,
    ) -> Result<Self, ProviderError> {
        let mut headers = reqwest::header::HeaderMap::new();
        let mut auth = reqwest::header::HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| ProviderError::Request(format!("invalid token: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .default_headers(headers)
            .build()
            .map_err(|e| ProviderError::Request(format!("http client build failed: {e}")))?;

        let url = format!("{}/{}", api_base_url.trim_end_matches('/'), model);
        Ok(Self { client, url, max_retries })
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let body = json!({
            "inputs": prompt,
            "parameters": {
                "max_new_tokens": 256,
                "temperature": 0.7,
                "top_p": 0.9,
                "return_full_text": false,
            }
        });

        let mut attempt = 0u32;
        loop {
            match self.client.post(&self.url).json(&body).send().await {
                Ok(resp) => match resp.status() {
                    status if status.is_success() => {
                        let value: Value = resp
                            .json()
                            .await
                            .map_err(|e| ProviderError::Request(format!("bad response body: {e}")))?;
                        return Ok(extract_generated_text(&value));
                    }
                    StatusCode::SERVICE_UNAVAILABLE => {
                        // Model still loading on the hub.
                        attempt += 1;
                        if attempt >= self.max_retries {
                            return Err(ProviderError::Request(
                                "model not ready after retries".to_string(),
                            ));
                        }
                        let wait = Duration::from_secs(1 << (attempt - 1).min(6));
                        warn!(attempt, wait_secs = wait.as_secs(), "model loading, retrying");
                        tokio::time::sleep(wait).await;
                    }
                    StatusCode::TOO_MANY_REQUESTS => {
                        return Err(ProviderError::RateLimited(
                            "inference api rate limit exceeded".to_string(),
                        ));
                    }
                    StatusCode::UNAUTHORIZED => {
                        return Err(ProviderError::Unavailable(
                            "inference api rejected the token".to_string(),
                        ));
                    }
                    status => {
                        error!(%status, "inference api error");
                        return Err(ProviderError::Request(format!(
                            "inference api returned {status}"
                        )));
                    }
                },
                Err(e) => {
                    attempt += 1;
                    if attempt >= self.max_retries {
                        return Err(ProviderError::Request(format!("network error: {e}")));
                    }
                    let wait = Duration::from_secs(1 << (attempt - 1).min(6));
                    error!(attempt, "network error: {e}; retrying");
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }
}

/// The API returns either `[{"generated_text": ...}]` or
/// `{"generated_text": ...}` depending on the pipeline. Anything else
/// yields an empty string, which callers treat as "no output".
fn extract_generated_text(value: &Value) -> String {
    let text = match value {
        Value::Array(items) => items
            .first()
            .and_then(|v| v.get("generated_text"))
            .and_then(Value::as_str)
            .unwrap_or_default(),
        Value::Object(map) => map.get("generated_text").and_then(Value::as_str).unwrap_or_default(),
        _ => "",
    };
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructs_provider() {
        let provider = HfApiProvider::new(
            "https://api-inference.huggingface.co/models".to_string(),
            "Qwen/Qwen2.5-0.5B-Instruct".to_string(),
            30,
            3,
            "hf_test".to_string(),
        );
        assert!(provider.is_ok());
    }

    #[test]
    fn url_joins_base_and_model() {
        let provider = HfApiProvider::new(
            "https://api-inference.huggingface.co/models/".to_string(),
            "org/model".to_string(),
            30,
            3,
            "hf_test".to_string(),
        )
        .unwrap();
        assert_eq!(provider.url, "https://api-inference.huggingface.co/models/org/model");
    }

    #[test]
    fn extracts_text_from_list_shape() {
        let v = json!([{"generated_text": "  hello  "}]);
        assert_eq!(extract_generated_text(&v), "hello");
    }

    #[test]
    fn extracts_text_from_dict_shape() {
        let v = json!({"generated_text": "hi"});
        assert_eq!(extract_generated_text(&v), "hi");
    }

    #[test]
    fn unexpected_shape_yields_empty() {
        assert_eq!(extract_generated_text(&json!(42)), "");
        assert_eq!(extract_generated_text(&json!([])), "");
    }
}
