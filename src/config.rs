//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory
//! (or the path given with `-f/--config`), then applies `PORT` and
//! `RELAY_LOG_LEVEL` env overrides. The LLM API key only ever comes from
//! the `LLM_API_KEY` env var, never from TOML.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::AppError;

/// HTTP service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Socket address the webhook listener binds to.
    pub bind: String,
    /// Directory holding prompt template files (already expanded, no `~`).
    pub prompts_dir: PathBuf,
    /// Extra headroom the handler allows on top of the provider timeout.
    pub handler_timeout_seconds: u64,
}

/// OpenAI / OpenAI-compatible provider configuration.
/// Populated from `[llm.openai]` in the TOML.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Full chat completions endpoint URL.
    pub api_base_url: String,
    /// Model name passed in the request body.
    pub model: String,
    /// Sampling temperature (omitted for models that forbid it).
    pub temperature: f32,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

/// LLM configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which provider is active (`"dummy"`, `"openai"`).
    /// Maps to `default` in `[llm]` TOML — named `default` there to signal
    /// that other provider sections can coexist without being loaded.
    pub provider: String,
    /// Config for the OpenAI / OpenAI-compatible provider (`[llm.openai]`).
    pub openai: OpenAiConfig,
}

/// Fully-resolved service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub service: ServiceConfig,
    pub llm: LlmConfig,
    /// API key from `LLM_API_KEY` env — `None` for keyless local models.
    pub llm_api_key: Option<String>,
}

// ── Raw TOML shape ────────────────────────────────────────────────────────────

/// `serde` target before resolution.
#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    service: RawService,
    #[serde(default)]
    llm: RawLlm,
}

#[derive(Deserialize)]
struct RawService {
    #[serde(default = "default_bind")]
    bind: String,
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default = "default_prompts_dir")]
    prompts_dir: String,
    #[serde(default = "default_handler_timeout_seconds")]
    handler_timeout_seconds: u64,
}

impl Default for RawService {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            log_level: default_log_level(),
            prompts_dir: default_prompts_dir(),
            handler_timeout_seconds: default_handler_timeout_seconds(),
        }
    }
}

#[derive(Deserialize)]
struct RawLlm {
    /// Maps to `default = "..."` in `[llm]`.
    #[serde(rename = "default", default = "default_llm_provider")]
    provider: String,
    #[serde(default)]
    openai: RawOpenAiConfig,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self { provider: default_llm_provider(), openai: RawOpenAiConfig::default() }
    }
}

#[derive(Deserialize)]
struct RawOpenAiConfig {
    #[serde(default = "default_openai_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_openai_model")]
    model: String,
    #[serde(default = "default_openai_temperature")]
    temperature: f32,
    #[serde(default = "default_openai_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawOpenAiConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_openai_api_base_url(),
            model: default_openai_model(),
            temperature: default_openai_temperature(),
            timeout_seconds: default_openai_timeout_seconds(),
        }
    }
}

fn default_bind() -> String { "0.0.0.0:3000".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_prompts_dir() -> String { "config/prompts".to_string() }
fn default_handler_timeout_seconds() -> u64 { 90 }
fn default_llm_provider() -> String { "openai".to_string() }
fn default_openai_api_base_url() -> String { "https://api.openai.com/v1/chat/completions".to_string() }
fn default_openai_model() -> String { "gpt-5-reasoning".to_string() }
fn default_openai_temperature() -> f32 { 0.0 }
fn default_openai_timeout_seconds() -> u64 { 60 }

// ── Loading ───────────────────────────────────────────────────────────────────

/// Load config from `path` (or `config/default.toml`), then apply env overrides.
pub fn load(path: Option<&str>) -> Result<Config, AppError> {
    let port_override = env::var("PORT").ok();
    let log_level_override = env::var("RELAY_LOG_LEVEL").ok();
    load_from(
        Path::new(path.unwrap_or("config/default.toml")),
        port_override.as_deref(),
        log_level_override.as_deref(),
    )
}

/// Internal loader — accepts an explicit path and optional overrides.
/// Tests pass overrides directly instead of mutating env vars.
pub fn load_from(
    path: &Path,
    port_override: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<Config, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let parsed: RawConfig = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    let bind = match port_override {
        Some(port) => override_port(&parsed.service.bind, port)?,
        None => parsed.service.bind,
    };
    let log_level = log_level_override
        .unwrap_or(&parsed.service.log_level)
        .to_string();

    Ok(Config {
        log_level,
        service: ServiceConfig {
            bind,
            prompts_dir: expand_home(&parsed.service.prompts_dir),
            handler_timeout_seconds: parsed.service.handler_timeout_seconds,
        },
        llm: LlmConfig {
            provider: parsed.llm.provider,
            openai: OpenAiConfig {
                api_base_url: parsed.llm.openai.api_base_url,
                model: parsed.llm.openai.model,
                temperature: parsed.llm.openai.temperature,
                timeout_seconds: parsed.llm.openai.timeout_seconds,
            },
        },
        llm_api_key: env::var("LLM_API_KEY").ok(),
    })
}

/// Replace the port portion of a `host:port` bind address.
/// Hosting platforms (Render, Fly) inject `PORT`; the host part stays as configured.
fn override_port(bind: &str, port: &str) -> Result<String, AppError> {
    let port: u16 = port
        .parse()
        .map_err(|_| AppError::Config(format!("PORT env var is not a valid port: '{port}'")))?;
    let host = bind
        .rsplit_once(':')
        .map(|(host, _)| host)
        .ok_or_else(|| AppError::Config(format!("bind address has no port: '{bind}'")))?;
    Ok(format!("{host}:{port}"))
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
