//! Anthropic messages API adapter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::commit::request::GenerationRequest;
use crate::commit::response::GenerationResult;
use crate::error::VendorError;
use crate::llm::http::{decode_reply, post_json, require_content};
use crate::llm::transcript::{ChatMessage, Role, build_transcript};
use crate::llm::vendor::{Vendor, VendorKind, VendorSettings};

pub const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1000;

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: String,
    messages: Vec<&'a ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

pub struct AnthropicVendor {
    settings: VendorSettings,
    http: reqwest::Client,
}

impl AnthropicVendor {
    pub fn new(settings: VendorSettings, http: reqwest::Client) -> Self {
        Self { settings, http }
    }
}

/// The messages API takes the system prompt as a separate field.
fn split_system(transcript: &[ChatMessage]) -> (String, Vec<&ChatMessage>) {
    let system = transcript
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    let messages = transcript.iter().filter(|m| m.role != Role::System).collect();
    (system, messages)
}

/// Concatenate the text blocks, skipping tool and thinking blocks.
fn collect_text(blocks: Vec<ContentBlock>) -> Option<String> {
    let text: String = blocks
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text)
        .collect();
    (!text.is_empty()).then_some(text)
}

#[async_trait]
impl Vendor for AnthropicVendor {
    fn kind(&self) -> VendorKind {
        VendorKind::Anthropic
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, VendorError> {
        let transcript = build_transcript(request);
        let (system, messages) = split_system(&transcript);
        debug!(
            "Sending {} messages to Anthropic ({})",
            messages.len(),
            self.settings.model
        );

        let body = MessagesRequest {
            model: &self.settings.model,
            max_tokens: MAX_TOKENS,
            temperature: 0.0,
            system,
            messages,
        };

        let builder = self
            .http
            .post(self.settings.endpoint("messages"))
            .header("x-api-key", self.settings.api_key())
            .header("anthropic-version", API_VERSION)
            .json(&body);

        let (envelope, raw_body): (MessagesResponse, String) =
            post_json(VendorKind::Anthropic, builder, self.settings.timeout).await?;

        let content = require_content(
            VendorKind::Anthropic,
            collect_text(envelope.content),
            &raw_body,
        )?;

        decode_reply(VendorKind::Anthropic, request, &content)
    }
}
