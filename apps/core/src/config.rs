//! Runtime configuration, read from the environment (and `.env` via `dotenv`).

use crate::error::AppError;
use crate::fs_manager::PortablePathManager;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use tracing::warn;
use url::Url;
use validator::Validate;

/// Default hosted model.
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Default OpenAI-compatible endpoint (Groq).
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Models offered by the intake form.
pub const SUPPORTED_MODELS: [&str; 3] = [
    "llama-3.3-70b-versatile",
    "llama-3.1-70b-versatile",
    "mixtral-8x7b-32768",
];

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8501;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Settings for the remote LLM API.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LlmConfig {
    /// Bearer key for the API.
    #[serde(skip_serializing)]
    #[validate(length(min = 1))]
    pub api_key: String,
    /// Base URL of the chat-completions API, without the trailing endpoint.
    #[validate(url)]
    pub base_url: String,
    /// Model identifier sent with every request.
    #[validate(length(min = 1))]
    pub model: String,
    /// Sampling temperature. Classification wants 0.
    #[validate(range(min = 0.0, max = 2.0))]
    pub temperature: f32,
    /// Per-request transport timeout.
    #[validate(range(min = 1, max = 600))]
    pub request_timeout_secs: u64,
}

impl LlmConfig {
    /// Builds a config for `api_key` with every other setting at its default.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Full URL of the chat-completions endpoint.
    pub fn completions_url(&self) -> Result<Url, AppError> {
        let base = format!("{}/", self.base_url.trim_end_matches('/'));
        Ok(Url::parse(&base)?.join("chat/completions")?)
    }
}

/// Settings for the HTTP surface.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    #[validate(length(min = 1))]
    pub host: String,
    #[validate(range(min = 1))]
    pub port: u16,
    /// Upper bound on request bodies (multipart uploads).
    #[validate(range(min = 1024))]
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_upload_size: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    #[validate(nested)]
    pub llm: LlmConfig,
    #[validate(nested)]
    pub server: ServerConfig,
    /// SQLite connection string for the memory log.
    #[validate(length(min = 1))]
    pub database_url: String,
}

impl AppConfig {
    /// Loads the configuration from the process environment.
    ///
    /// `GROQ_API_KEY` is required; everything else has a default.
    pub fn from_env() -> Result<Self, AppError> {
        let api_key = env::var("GROQ_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AppError::Config("GROQ_API_KEY is required".to_string()))?;

        let llm = LlmConfig {
            api_key,
            base_url: env_or("GROQ_BASE_URL", DEFAULT_BASE_URL),
            model: env_or("GROQ_MODEL", DEFAULT_MODEL),
            temperature: parse_env("LLM_TEMPERATURE", 0.0)?,
            request_timeout_secs: parse_env("LLM_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
        };

        if !SUPPORTED_MODELS.contains(&llm.model.as_str()) {
            warn!("Model {} is not in the supported list, using it anyway", llm.model);
        }

        let server = ServerConfig {
            host: env_or("INTAKE_HOST", DEFAULT_HOST),
            port: parse_env("INTAKE_PORT", DEFAULT_PORT)?,
            max_upload_size: parse_env("INTAKE_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        };

        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| {
            format!("sqlite://{}", PortablePathManager::db_path().to_string_lossy())
        });

        let config = Self {
            llm,
            server,
            database_url,
        };
        config.validate()?;
        Ok(config)
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid value for {}: {}", key, e))),
        Err(_) => Ok(default),
    }
}
