//! Local Ollama backend (`POST {host}/api/chat`, non-streaming).

use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use super::{build_http_client, http_error, normalize_base_url, SamplingParams};
use crate::{non_empty, CompletionRequest, LlmClient, LlmError};

pub struct OllamaClient {
    http: reqwest::blocking::Client,
    url: String,
    model: String,
    sampling: SamplingParams,
}

impl OllamaClient {
    pub fn new(
        host: &str,
        model: &str,
        sampling: SamplingParams,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            http: build_http_client(timeout)?,
            url: format!("{}/api/chat", normalize_base_url(host)),
            model: model.to_string(),
            sampling,
        })
    }
}

impl LlmClient for OllamaClient {
    fn model(&self) -> &str {
        &self.model
    }

    fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let body = chat_body(&self.model, self.sampling, request);
        let resp = self.http.post(&self.url).json(&body).send().map_err(|e| {
            LlmError::Network(format!(
                "failed to reach ollama at {} (is it running?): {e}",
                self.url
            ))
        })?;
        if !resp.status().is_success() {
            return Err(http_error(resp));
        }

        #[derive(Deserialize)]
        struct OllamaChatResponse {
            message: OllamaChatMessage,
        }

        #[derive(Deserialize)]
        struct OllamaChatMessage {
            content: String,
        }

        let out: OllamaChatResponse = resp
            .json()
            .map_err(|e| LlmError::InvalidResponse(format!("ollama returned invalid JSON: {e}")))?;
        non_empty(&out.message.content)
    }
}

fn chat_body(model: &str, sampling: SamplingParams, request: &CompletionRequest) -> serde_json::Value {
    let mut messages = Vec::new();
    if let Some(system) = &request.system {
        messages.push(json!({ "role": "system", "content": system }));
    }
    let mut user = json!({ "role": "user", "content": request.prompt });
    if let Some(image) = &request.image {
        user["images"] = json!([image.base64()]);
    }
    messages.push(user);

    json!({
        "model": model,
        "stream": false,
        "messages": messages,
        "options": {
            "num_predict": sampling.max_tokens,
            "temperature": sampling.temperature,
            "top_p": sampling.top_p
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CallKind, ImageInput};

    #[test]
    fn images_are_sent_as_raw_base64() {
        let req = CompletionRequest::text(CallKind::Ocr, "read").with_image(ImageInput {
            mime_type: "image/png".to_string(),
            bytes: b"hi".to_vec(),
        });
        let body = chat_body("llava", SamplingParams::default(), &req);
        assert_eq!(body["stream"], false);
        assert_eq!(body["messages"][0]["images"][0], "aGk=");
        assert_eq!(body["options"]["num_predict"], 5000);
    }
}
