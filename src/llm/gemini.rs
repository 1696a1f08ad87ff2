//! Gemini adapter over Google's OpenAI-compatible endpoint.

use async_trait::async_trait;

use crate::commit::request::GenerationRequest;
use crate::commit::response::GenerationResult;
use crate::error::VendorError;
use crate::llm::openai::{ChatOptions, chat_completion};
use crate::llm::vendor::{Vendor, VendorKind, VendorSettings};

const TEMPERATURE: f32 = 0.8;

pub struct GeminiVendor {
    settings: VendorSettings,
    http: reqwest::Client,
}

impl GeminiVendor {
    pub fn new(settings: VendorSettings, http: reqwest::Client) -> Self {
        Self { settings, http }
    }
}

#[async_trait]
impl Vendor for GeminiVendor {
    fn kind(&self) -> VendorKind {
        VendorKind::Gemini
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, VendorError> {
        chat_completion(
            &self.http,
            &self.settings,
            request,
            ChatOptions {
                temperature: TEMPERATURE,
                max_tokens: None,
            },
        )
        .await
    }
}
