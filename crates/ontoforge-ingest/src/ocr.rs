//! OCR collaborator.

use anyhow::{anyhow, Context, Result};
use std::path::Path;

use ontoforge_llm::{prompts, CallKind, CompletionRequest, ImageInput, LlmClient, LlmError};

/// Extracts text from one image. An empty string means "nothing legible";
/// callers skip the image either way.
pub trait OcrEngine {
    fn extract_text(&self, image: &Path) -> Result<String>;
}

/// OCR through a vision-capable chat model: the image is sent inline as a
/// base64 data URL.
pub struct LlmOcr<C> {
    client: C,
}

impl<C: LlmClient> LlmOcr<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

impl<C: LlmClient> OcrEngine for LlmOcr<C> {
    fn extract_text(&self, image: &Path) -> Result<String> {
        let bytes =
            std::fs::read(image).with_context(|| format!("failed to read `{}`", image.display()))?;
        let request = CompletionRequest::text(CallKind::Ocr, prompts::OCR_USER_PROMPT)
            .with_system(prompts::OCR_SYSTEM_PROMPT)
            .with_image(ImageInput {
                mime_type: image_mime_type(image).to_string(),
                bytes,
            });
        match self.client.complete(&request) {
            Ok(text) => Ok(text),
            Err(LlmError::EmptyResponse) => Ok(String::new()),
            Err(e) => Err(anyhow!("OCR failed for `{}`: {e}", image.display())),
        }
    }
}

pub fn image_mime_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        _ => "image/jpeg",
    }
}
