//! Provider configuration and construction.
//!
//! Configuration is read from environment variables (see [`LlmConfig::from_env`]);
//! secrets are never accepted on the command line.

mod ollama;
mod openai;

pub use ollama::OllamaClient;
pub use openai::OpenAiChatClient;

use crate::{LlmClient, LlmError};
use std::time::Duration;

pub const ONTOFORGE_LLM_BACKEND_ENV: &str = "ONTOFORGE_LLM_BACKEND";
pub const ONTOFORGE_LLM_TIMEOUT_SECS_ENV: &str = "ONTOFORGE_LLM_TIMEOUT_SECS";
pub const ONTOFORGE_LLM_MAX_TOKENS_ENV: &str = "ONTOFORGE_LLM_MAX_TOKENS";
pub const ONTOFORGE_OCR_MODEL_ENV: &str = "ONTOFORGE_OCR_MODEL";

pub const GROQ_API_KEY_ENV: &str = "GROQ_API_KEY";
pub const GROQ_MODEL_ENV: &str = "GROQ_MODEL";
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const OPENAI_MODEL_ENV: &str = "OPENAI_MODEL";
pub const OPENAI_BASE_URL_ENV: &str = "OPENAI_BASE_URL";
pub const OLLAMA_HOST_ENV: &str = "OLLAMA_HOST";
pub const OLLAMA_MODEL_ENV: &str = "OLLAMA_MODEL";

/// Groq's OpenAI-compatible endpoint.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_OLLAMA_HOST: &str = "http://127.0.0.1:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.1";
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_MAX_TOKENS: u32 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Any OpenAI-compatible `/chat/completions` endpoint (Groq, OpenAI, vLLM, ...).
    OpenAi,
    Ollama,
}

impl Backend {
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" | "groq" | "openai-compatible" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            other => Err(ConfigError::Invalid(format!(
                "unknown LLM backend `{other}` (expected openai|ollama)"
            ))),
        }
    }
}

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: 0.5,
            top_p: 0.9,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub backend: Backend,
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    /// Vision model used for OCR; `None` means "same as `model`".
    pub ocr_model: Option<String>,
    pub timeout: Duration,
    pub sampling: SamplingParams,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("no API key configured: set {GROQ_API_KEY_ENV} or {OPENAI_API_KEY_ENV} (or use {ONTOFORGE_LLM_BACKEND_ENV}=ollama)")]
    MissingApiKey,
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl LlmConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup (the environment in production,
    /// a map in tests). Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let backend = match get(ONTOFORGE_LLM_BACKEND_ENV) {
            Some(v) => Backend::parse(&v)?,
            None => Backend::OpenAi,
        };

        let timeout_secs = match get(ONTOFORGE_LLM_TIMEOUT_SECS_ENV) {
            Some(v) => parse_bounded(&v, ONTOFORGE_LLM_TIMEOUT_SECS_ENV, 1, 3600)?,
            None => DEFAULT_LLM_TIMEOUT_SECS,
        };
        let max_tokens = match get(ONTOFORGE_LLM_MAX_TOKENS_ENV) {
            Some(v) => parse_bounded(&v, ONTOFORGE_LLM_MAX_TOKENS_ENV, 1, 1_000_000)? as u32,
            None => DEFAULT_MAX_TOKENS,
        };
        let sampling = SamplingParams {
            max_tokens,
            ..SamplingParams::default()
        };
        let ocr_model = get(ONTOFORGE_OCR_MODEL_ENV);

        match backend {
            Backend::OpenAi => {
                let api_key = get(GROQ_API_KEY_ENV)
                    .or_else(|| get(OPENAI_API_KEY_ENV))
                    .ok_or(ConfigError::MissingApiKey)?;
                Ok(Self {
                    backend,
                    api_key: Some(api_key),
                    base_url: get(OPENAI_BASE_URL_ENV)
                        .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
                    model: get(GROQ_MODEL_ENV)
                        .or_else(|| get(OPENAI_MODEL_ENV))
                        .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
                    ocr_model,
                    timeout: Duration::from_secs(timeout_secs),
                    sampling,
                })
            }
            Backend::Ollama => Ok(Self {
                backend,
                api_key: None,
                base_url: get(OLLAMA_HOST_ENV).unwrap_or_else(|| DEFAULT_OLLAMA_HOST.to_string()),
                model: get(OLLAMA_MODEL_ENV).unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
                ocr_model,
                timeout: Duration::from_secs(timeout_secs),
                sampling,
            }),
        }
    }

    /// Build the text-completion client.
    pub fn build_client(&self) -> Result<Box<dyn LlmClient>, LlmError> {
        self.build_for_model(&self.model)
    }

    /// Build the client used for OCR (may target a different vision model).
    pub fn build_ocr_client(&self) -> Result<Box<dyn LlmClient>, LlmError> {
        self.build_for_model(self.ocr_model.as_deref().unwrap_or(&self.model))
    }

    fn build_for_model(&self, model: &str) -> Result<Box<dyn LlmClient>, LlmError> {
        match self.backend {
            Backend::OpenAi => Ok(Box::new(OpenAiChatClient::new(
                &self.base_url,
                self.api_key.as_deref().unwrap_or_default(),
                model,
                self.sampling,
                self.timeout,
            )?)),
            Backend::Ollama => Ok(Box::new(OllamaClient::new(
                &self.base_url,
                model,
                self.sampling,
                self.timeout,
            )?)),
        }
    }
}

fn parse_bounded(value: &str, name: &str, min: u64, max: u64) -> Result<u64, ConfigError> {
    let n: u64 = value
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{name} must be an integer (got `{value}`)")))?;
    if !(min..=max).contains(&n) {
        return Err(ConfigError::Invalid(format!(
            "{name} must be in {min}..={max} (got {n})"
        )));
    }
    Ok(n)
}

/// `host:port` → `http://host:port`, trailing slashes removed.
pub(crate) fn normalize_base_url(base_url: &str) -> String {
    let trimmed = base_url.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}

pub(crate) fn build_http_client(
    timeout: Duration,
) -> Result<reqwest::blocking::Client, LlmError> {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LlmError::Client(format!("failed to build http client: {e}")))
}

/// Map a non-success HTTP response to an [`LlmError`].
pub(crate) fn http_error(resp: reqwest::blocking::Response) -> LlmError {
    let status = resp.status();
    if status.as_u16() == 429 {
        let retry_after_secs = resp
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse().ok());
        return LlmError::RateLimited { retry_after_secs };
    }
    let body = resp.text().unwrap_or_default();
    LlmError::Api {
        status: status.as_u16(),
        body,
    }
}
