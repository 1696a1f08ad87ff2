//! OpenAI chat completions adapter.
//!
//! The request and envelope types are shared with the Gemini adapter, which
//! talks to Google's OpenAI-compatible endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::commit::request::{GenerationRequest, ResponseFormat};
use crate::commit::response::GenerationResult;
use crate::error::VendorError;
use crate::llm::http::{decode_reply, post_json, require_content};
use crate::llm::transcript::{ChatMessage, build_transcript};
use crate::llm::vendor::{Vendor, VendorKind, VendorSettings};

/// Sampling options that differ between chat-completions backends.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ChatOptions {
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// POST a transcript to `{base}/chat/completions` and decode the first choice.
pub(crate) async fn chat_completion(
    http: &reqwest::Client,
    settings: &VendorSettings,
    request: &GenerationRequest,
    options: ChatOptions,
) -> Result<GenerationResult, VendorError> {
    let messages = build_transcript(request);
    debug!(
        "Sending {} messages to {} ({})",
        messages.len(),
        settings.kind,
        settings.model
    );

    let body = ChatCompletionRequest {
        model: &settings.model,
        messages: &messages,
        temperature: options.temperature,
        max_tokens: options.max_tokens,
        response_format: match request.format() {
            ResponseFormat::Structured => Some(json!({ "type": "json_object" })),
            ResponseFormat::PlainText => None,
        },
    };

    let builder = http
        .post(settings.endpoint("chat/completions"))
        .bearer_auth(settings.api_key())
        .json(&body);

    let (envelope, raw_body): (ChatCompletionResponse, String) =
        post_json(settings.kind, builder, settings.timeout).await?;

    let content = envelope
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content);
    let content = require_content(settings.kind, content, &raw_body)?;

    decode_reply(settings.kind, request, &content)
}

/// Adapter for the OpenAI API.
pub struct OpenAiVendor {
    settings: VendorSettings,
    http: reqwest::Client,
}

impl OpenAiVendor {
    pub fn new(settings: VendorSettings, http: reqwest::Client) -> Self {
        Self { settings, http }
    }
}

#[async_trait]
impl Vendor for OpenAiVendor {
    fn kind(&self) -> VendorKind {
        VendorKind::OpenAi
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, VendorError> {
        chat_completion(
            &self.http,
            &self.settings,
            request,
            ChatOptions {
                temperature: 0.0,
                max_tokens: Some(1000),
            },
        )
        .await
    }
}
