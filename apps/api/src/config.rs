use std::str::FromStr;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub max_upload_mb: usize,
    pub llm: LlmSettings,
}

/// Remote assessment service settings.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    /// Documents longer than this are truncated (never summarized) in the prompt.
    pub max_excerpt_chars: usize,
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "mistral".to_string(),
            temperature: 0.2,
            max_excerpt_chars: 4000,
            timeout_secs: 120,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            max_upload_mb: 25,
            llm: LlmSettings::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        let llm = defaults.llm;

        Ok(Config {
            port: parse_env("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            max_upload_mb: parse_env("MAX_UPLOAD_MB", defaults.max_upload_mb)?,
            llm: LlmSettings {
                base_url: std::env::var("OLLAMA_BASE_URL").unwrap_or(llm.base_url),
                model: std::env::var("OLLAMA_MODEL").unwrap_or(llm.model),
                temperature: parse_env("OLLAMA_TEMPERATURE", llm.temperature)?,
                max_excerpt_chars: parse_env("LLM_MAX_EXCERPT_CHARS", llm.max_excerpt_chars)?,
                timeout_secs: parse_env("LLM_TIMEOUT_SECS", llm.timeout_secs)?,
            },
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}
