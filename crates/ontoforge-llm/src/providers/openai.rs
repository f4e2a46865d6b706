//! OpenAI-compatible chat completions (`POST {base}/chat/completions`).
//!
//! Groq is the default endpoint; any server speaking the same wire format
//! works. Images are sent inline as `data:` URLs.

use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use super::{build_http_client, http_error, normalize_base_url, SamplingParams};
use crate::{non_empty, CompletionRequest, LlmClient, LlmError};

pub struct OpenAiChatClient {
    http: reqwest::blocking::Client,
    url: String,
    api_key: String,
    model: String,
    sampling: SamplingParams,
}

impl OpenAiChatClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        sampling: SamplingParams,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        if api_key.trim().is_empty() {
            return Err(LlmError::Client(
                "OpenAI-compatible backend requires an API key".to_string(),
            ));
        }
        Ok(Self {
            http: build_http_client(timeout)?,
            url: format!("{}/chat/completions", normalize_base_url(base_url)),
            api_key: api_key.trim().to_string(),
            model: model.to_string(),
            sampling,
        })
    }
}

impl LlmClient for OpenAiChatClient {
    fn model(&self) -> &str {
        &self.model
    }

    fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let body = chat_body(&self.model, self.sampling, request);
        let resp = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| LlmError::Network(format!("failed to reach {}: {e}", self.url)))?;
        if !resp.status().is_success() {
            return Err(http_error(resp));
        }

        let out: ChatResponse = resp
            .json()
            .map_err(|e| LlmError::InvalidResponse(format!("invalid JSON: {e}")))?;
        let content = out
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        non_empty(&content)
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

fn chat_body(model: &str, sampling: SamplingParams, request: &CompletionRequest) -> serde_json::Value {
    let mut messages = Vec::new();
    if let Some(system) = &request.system {
        messages.push(json!({ "role": "system", "content": system }));
    }
    let user = match &request.image {
        Some(image) => json!({
            "role": "user",
            "content": [
                { "type": "text", "text": request.prompt },
                { "type": "image_url", "image_url": { "url": image.data_url() } }
            ]
        }),
        None => json!({ "role": "user", "content": request.prompt }),
    };
    messages.push(user);

    json!({
        "model": model,
        "messages": messages,
        "max_tokens": sampling.max_tokens,
        "temperature": sampling.temperature,
        "top_p": sampling.top_p,
        "stream": false
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CallKind, ImageInput};

    #[test]
    fn text_request_body() {
        let req = CompletionRequest::text(CallKind::Generate, "make turtle").with_system("sys");
        let body = chat_body("m", SamplingParams::default(), &req);
        assert_eq!(body["model"], "m");
        assert_eq!(body["max_tokens"], 5000);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "make turtle");
    }

    #[test]
    fn image_request_uses_content_parts() {
        let req = CompletionRequest::text(CallKind::Ocr, "read this").with_image(ImageInput {
            mime_type: "image/jpeg".to_string(),
            bytes: b"hi".to_vec(),
        });
        let body = chat_body("vision", SamplingParams::default(), &req);
        let parts = &body["messages"][0]["content"];
        assert_eq!(parts[0]["text"], "read this");
        assert_eq!(parts[1]["image_url"]["url"], "data:image/jpeg;base64,aGk=");
    }

    #[test]
    fn rejects_blank_api_key() {
        let err = OpenAiChatClient::new(
            "https://api.groq.com/openai/v1",
            " ",
            "m",
            SamplingParams::default(),
            Duration::from_secs(5),
        )
        .err();
        assert!(matches!(err, Some(LlmError::Client(_))));
    }
}
