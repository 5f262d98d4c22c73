//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory,
//! then applies `TASKDOST_BIND`, `TASKDOST_LOG_LEVEL` and `TASKDOST_DB_PATH`
//! env overrides. The HuggingFace API token is sourced from the `HF_TOKEN`
//! env var only — never from TOML.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::AppError;

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address to bind the API server to.
    pub bind: String,
    pub log_level: String,
}

/// SQLite database configuration.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database file path (already expanded, no `~`).
    pub path: PathBuf,
}

/// Chat orchestration knobs.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Maximum messages returned by the history endpoint.
    pub history_limit: usize,
}

/// HuggingFace Inference API provider configuration.
/// Populated from `[llm.huggingface]` in the TOML.
#[derive(Debug, Clone)]
pub struct HuggingFaceConfig {
    /// Base URL; the model id is appended as a path segment.
    pub api_base_url: String,
    /// Model id passed in the request path (e.g. `Qwen/Qwen2.5-0.5B-Instruct`).
    pub model: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Retry ceiling for transient (HTTP 503 "still loading") failures.
    pub max_retries: u32,
}

/// Response-generation configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which strategy is active (`"rule_based"`, `"huggingface"`, `"dummy"`).
    /// Maps to `default` in `[llm]` TOML — named `default` there to signal
    /// that other provider sections can coexist without being loaded.
    pub provider: String,
    /// Config for the HuggingFace provider (`[llm.huggingface]`).
    pub huggingface: HuggingFaceConfig,
}

/// Fully-resolved application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub chat: ChatConfig,
    pub llm: LlmConfig,
    /// API token from `HF_TOKEN` env — `None` disables the remote provider.
    pub hf_token: Option<String>,
}

// ── Raw TOML shape — serde target before resolution ──────────────────────────

#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    server: RawServer,
    #[serde(default)]
    database: RawDatabase,
    #[serde(default)]
    chat: RawChat,
    #[serde(default)]
    llm: RawLlm,
}

#[derive(Deserialize)]
struct RawServer {
    #[serde(default = "default_bind")]
    bind: String,
    #[serde(default = "default_log_level")]
    log_level: String,
}

impl Default for RawServer {
    fn default() -> Self {
        Self { bind: default_bind(), log_level: default_log_level() }
    }
}

#[derive(Deserialize)]
struct RawDatabase {
    #[serde(default = "default_db_path")]
    path: String,
}

impl Default for RawDatabase {
    fn default() -> Self {
        Self { path: default_db_path() }
    }
}

#[derive(Deserialize)]
struct RawChat {
    #[serde(default = "default_history_limit")]
    history_limit: usize,
}

impl Default for RawChat {
    fn default() -> Self {
        Self { history_limit: default_history_limit() }
    }
}

#[derive(Deserialize)]
struct RawLlm {
    /// Maps to `default = "..."` in `[llm]`.
    #[serde(rename = "default", default = "default_llm_provider")]
    provider: String,
    #[serde(default)]
    huggingface: RawHuggingFace,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self { provider: default_llm_provider(), huggingface: RawHuggingFace::default() }
    }
}

#[derive(Deserialize)]
struct RawHuggingFace {
    #[serde(default = "default_hf_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_hf_model")]
    model: String,
    #[serde(default = "default_hf_timeout_seconds")]
    timeout_seconds: u64,
    #[serde(default = "default_hf_max_retries")]
    max_retries: u32,
}

impl Default for RawHuggingFace {
    fn default() -> Self {
        Self {
            api_base_url: default_hf_api_base_url(),
            model: default_hf_model(),
            timeout_seconds: default_hf_timeout_seconds(),
            max_retries: default_hf_max_retries(),
        }
    }
}

fn default_bind() -> String { "127.0.0.1:8000".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_db_path() -> String { "taskdost.db".to_string() }
fn default_history_limit() -> usize { 50 }
fn default_llm_provider() -> String { "rule_based".to_string() }
fn default_hf_api_base_url() -> String { "https://api-inference.huggingface.co/models".to_string() }
fn default_hf_model() -> String { "Qwen/Qwen2.5-0.5B-Instruct".to_string() }
fn default_hf_timeout_seconds() -> u64 { 30 }
fn default_hf_max_retries() -> u32 { 3 }

/// Load config from `config/default.toml`, then apply env-var overrides.
pub fn load() -> Result<Config, AppError> {
    let bind_override = env::var("TASKDOST_BIND").ok();
    let log_level_override = env::var("TASKDOST_LOG_LEVEL").ok();
    let db_path_override = env::var("TASKDOST_DB_PATH").ok();
    load_from(
        Path::new("config/default.toml"),
        bind_override.as_deref(),
        log_level_override.as_deref(),
        db_path_override.as_deref(),
    )
}

/// Internal loader — accepts an explicit path and optional overrides.
/// Tests pass overrides directly instead of mutating env vars.
pub fn load_from(
    path: &Path,
    bind_override: Option<&str>,
    log_level_override: Option<&str>,
    db_path_override: Option<&str>,
) -> Result<Config, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let parsed: RawConfig = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    let bind = bind_override.unwrap_or(&parsed.server.bind).to_string();
    let log_level = log_level_override.unwrap_or(&parsed.server.log_level).to_string();
    let db_path_str = db_path_override.unwrap_or(&parsed.database.path);
    let db_path = expand_home(db_path_str);

    Ok(Config {
        server: ServerConfig { bind, log_level },
        database: DatabaseConfig { path: db_path },
        chat: ChatConfig { history_limit: parsed.chat.history_limit },
        llm: LlmConfig {
            provider: parsed.llm.provider,
            huggingface: HuggingFaceConfig {
                api_base_url: parsed.llm.huggingface.api_base_url,
                model: parsed.llm.huggingface.model,
                timeout_seconds: parsed.llm.huggingface.timeout_seconds,
                max_retries: parsed.llm.huggingface.max_retries,
            },
        },
        hf_token: env::var("HF_TOKEN").ok().filter(|t| !t.is_empty()),
    })
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

// ── test helpers ──────────────────────────────────────────────────────────────

/// Safe `Config` for unit tests — rule-based responses, no API keys,
/// no external calls.
#[cfg(test)]
impl Config {
    pub fn test_default(db_path: &Path) -> Self {
        Self {
            server: ServerConfig {
                bind: "127.0.0.1:0".into(),
                log_level: "info".into(),
            },
            database: DatabaseConfig { path: db_path.to_path_buf() },
            chat: ChatConfig { history_limit: 50 },
            llm: LlmConfig {
                provider: "rule_based".into(),
                huggingface: HuggingFaceConfig {
                    api_base_url: "http://localhost:0/models".into(),
                    model: "test-model".into(),
                    timeout_seconds: 1,
                    max_retries: 0,
                },
            },
            hf_token: None,
        }
    }
}
