//! Adapter for a local Ollama server.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::commit::request::GenerationRequest;
use crate::commit::response::GenerationResult;
use crate::error::VendorError;
use crate::llm::http::{decode_reply, post_json, require_content};
use crate::llm::transcript::{ChatMessage, build_transcript};
use crate::llm::vendor::{Vendor, VendorKind, VendorSettings};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Talks to `{host}/api/chat` without authentication.
pub struct OllamaVendor {
    settings: VendorSettings,
    http: reqwest::Client,
}

impl OllamaVendor {
    pub fn new(settings: VendorSettings, http: reqwest::Client) -> Self {
        Self { settings, http }
    }
}

#[async_trait]
impl Vendor for OllamaVendor {
    fn kind(&self) -> VendorKind {
        VendorKind::Ollama
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, VendorError> {
        let messages = build_transcript(request);
        debug!(
            "Sending {} messages to Ollama ({})",
            messages.len(),
            self.settings.model
        );

        let body = ChatRequest {
            model: &self.settings.model,
            messages: &messages,
            stream: false,
            options: json!({ "temperature": 0 }),
        };

        let builder = self.http.post(self.settings.endpoint("api/chat")).json(&body);
        let (envelope, raw_body): (ChatResponse, String) =
            post_json(VendorKind::Ollama, builder, self.settings.timeout).await?;

        let content = envelope.message.and_then(|m| m.content);
        let content = require_content(VendorKind::Ollama, content, &raw_body)?;

        decode_reply(VendorKind::Ollama, request, &content)
    }
}
