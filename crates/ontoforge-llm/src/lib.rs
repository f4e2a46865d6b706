//! LLM collaborators for ontoforge.
//!
//! Every model call in the pipeline (fragment generation, fragment repair,
//! ontology validation, OCR) goes through the [`LlmClient`] trait:
//!
//! - clients are constructed explicitly (see [`providers::LlmConfig`]) and
//!   passed to whoever needs them, so tests can substitute a scripted double;
//! - calls are blocking and single-shot: no retry, no backoff. A failed call
//!   is reported as an [`LlmError`] and the caller decides to skip;
//! - [`response_log::LoggedClient`] appends one JSON record per call to an
//!   audit log.
//!
//! The model is **untrusted**: its text is only ever handed to the Turtle
//! parser, never interpreted here.

pub mod prompts;
pub mod providers;
pub mod response_log;

#[cfg(any(test, feature = "testing"))]
pub mod scripted;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use providers::{Backend, ConfigError, LlmConfig, SamplingParams};
pub use response_log::{CallStatus, LoggedClient, ResponseLog, ResponseRecord};

/// What a call is for. Recorded in the response log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    Generate,
    Repair,
    Validate,
    Ocr,
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Generate => "generate",
            Self::Repair => "repair",
            Self::Validate => "validate",
            Self::Ocr => "ocr",
        })
    }
}

/// An image attached to a request (vision models only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageInput {
    pub fn base64(&self) -> String {
        use base64::Engine as _;
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64())
    }
}

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub kind: CallKind,
    pub system: Option<String>,
    pub prompt: String,
    pub image: Option<ImageInput>,
}

impl CompletionRequest {
    pub fn text(kind: CallKind, prompt: impl Into<String>) -> Self {
        Self {
            kind,
            system: None,
            prompt: prompt.into(),
            image: None,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_image(mut self, image: ImageInput) -> Self {
        self.image = Some(image);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LlmError {
    #[error("network error: {0}")]
    Network(String),
    #[error("rate limited (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },
    #[error("http error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("model returned an empty response")]
    EmptyResponse,
    #[error("client error: {0}")]
    Client(String),
}

/// A blocking, single-shot text completion service.
pub trait LlmClient {
    /// Model identifier, recorded with every logged call.
    fn model(&self) -> &str;

    /// Run one completion. Implementations return the trimmed response text
    /// and report blank output as [`LlmError::EmptyResponse`].
    fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}

impl<T: LlmClient + ?Sized> LlmClient for &T {
    fn model(&self) -> &str {
        (**self).model()
    }

    fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        (**self).complete(request)
    }
}

impl<T: LlmClient + ?Sized> LlmClient for Box<T> {
    fn model(&self) -> &str {
        (**self).model()
    }

    fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        (**self).complete(request)
    }
}

/// Trim a raw response and map blank output to [`LlmError::EmptyResponse`].
pub(crate) fn non_empty(text: &str) -> Result<String, LlmError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(LlmError::EmptyResponse)
    } else {
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_embeds_mime_and_base64() {
        let image = ImageInput {
            mime_type: "image/png".to_string(),
            bytes: b"hi".to_vec(),
        };
        assert_eq!(image.data_url(), "data:image/png;base64,aGk=");
    }

    #[test]
    fn blank_responses_are_errors() {
        assert_eq!(non_empty("  \n"), Err(LlmError::EmptyResponse));
        assert_eq!(non_empty(" ok \n").as_deref(), Ok("ok"));
    }

    #[test]
    fn call_kinds_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&CallKind::Validate).expect("serialize"),
            "\"validate\""
        );
        assert_eq!(CallKind::Ocr.to_string(), "ocr");
    }
}
