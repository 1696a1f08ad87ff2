//! Vendor selection, the model lookup table, and the adapter seam.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;

use crate::commit::request::GenerationRequest;
use crate::commit::response::GenerationResult;
use crate::error::{ConfigError, VendorError};
use crate::llm::anthropic::AnthropicVendor;
use crate::llm::gemini::GeminiVendor;
use crate::llm::ollama::OllamaVendor;
use crate::llm::openai::OpenAiVendor;

/// Supported LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VendorKind {
    OpenAi,
    Gemini,
    Anthropic,
    Ollama,
}

impl VendorKind {
    /// Menu order for the interactive pick.
    pub const ALL: [VendorKind; 4] = [
        VendorKind::OpenAi,
        VendorKind::Gemini,
        VendorKind::Anthropic,
        VendorKind::Ollama,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VendorKind::OpenAi => "OpenAI",
            VendorKind::Gemini => "Gemini",
            VendorKind::Anthropic => "Anthropic",
            VendorKind::Ollama => "Ollama",
        }
    }

    /// Identifier accepted by `--vendor` and `AICOMMITS_VENDOR`.
    pub fn id(&self) -> &'static str {
        match self {
            VendorKind::OpenAi => "openai",
            VendorKind::Gemini => "gemini",
            VendorKind::Anthropic => "anthropic",
            VendorKind::Ollama => "ollama",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            VendorKind::OpenAi => "https://api.openai.com/v1",
            VendorKind::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai",
            VendorKind::Anthropic => "https://api.anthropic.com/v1",
            VendorKind::Ollama => "http://localhost:11434",
        }
    }

    /// Environment variable holding the API key, if the vendor needs one.
    pub fn credential_env_var(&self) -> Option<&'static str> {
        match self {
            VendorKind::OpenAi => Some("OPENAI_KEY"),
            VendorKind::Gemini => Some("GEMINI_API_KEY"),
            VendorKind::Anthropic => Some("ANTHROPIC_API_KEY"),
            VendorKind::Ollama => None,
        }
    }
}

impl fmt::Display for VendorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VendorKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        VendorKind::ALL
            .into_iter()
            .find(|kind| kind.id() == wanted)
            .ok_or_else(|| {
                ConfigError::invalid(
                    "vendor",
                    format!("Must be one of openai, gemini, anthropic, ollama, got `{wanted}`"),
                )
            })
    }
}

/// Capability tier, mapped to a concrete model per vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModelTier {
    #[default]
    High,
    Middle,
    Low,
}

impl FromStr for ModelTier {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(ModelTier::High),
            "middle" => Ok(ModelTier::Middle),
            "low" => Ok(ModelTier::Low),
            other => Err(ConfigError::invalid(
                "tier",
                format!("Must be high, middle, or low, got `{other}`"),
            )),
        }
    }
}

/// Model identifiers keyed by (vendor, tier).
pub const MODEL_TABLE: &[(VendorKind, ModelTier, &str)] = &[
    (VendorKind::OpenAi, ModelTier::High, "gpt-4o"),
    (VendorKind::OpenAi, ModelTier::Middle, "gpt-4-turbo"),
    (VendorKind::OpenAi, ModelTier::Low, "gpt-3.5-turbo"),
    (VendorKind::Gemini, ModelTier::High, "gemini-1.5-pro-002"),
    (VendorKind::Gemini, ModelTier::Middle, "gemini-1.5-flash-002"),
    (VendorKind::Gemini, ModelTier::Low, "gemini-1.5-flash-8b"),
    (VendorKind::Anthropic, ModelTier::High, "claude-3-opus-20240229"),
    (VendorKind::Anthropic, ModelTier::Middle, "claude-3-sonnet-20240229"),
    (VendorKind::Anthropic, ModelTier::Low, "claude-3-haiku-20240307"),
    (VendorKind::Ollama, ModelTier::High, "llama3:70b"),
    (VendorKind::Ollama, ModelTier::Middle, "llama3"),
    (VendorKind::Ollama, ModelTier::Low, "llama3"),
];

pub fn model_for(vendor: VendorKind, tier: ModelTier) -> Option<&'static str> {
    MODEL_TABLE
        .iter()
        .find(|(v, t, _)| *v == vendor && *t == tier)
        .map(|(_, _, model)| *model)
}

/// Everything an adapter needs to reach its backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorSettings {
    pub kind: VendorKind,
    pub model: String,
    pub api_key: Option<String>,
    /// Base URL without a trailing slash.
    pub base_url: String,
    pub timeout: Duration,
}

impl VendorSettings {
    /// Join `path` onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub(crate) fn api_key(&self) -> &str {
        self.api_key.as_deref().unwrap_or_default()
    }
}

/// One LLM backend able to turn a request into candidates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Vendor: Send + Sync {
    fn kind(&self) -> VendorKind;

    /// Send `request` and decode the reply.
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, VendorError>;
}

/// Construct the adapter for `settings.kind`.
pub fn connect(settings: VendorSettings, http: reqwest::Client) -> Box<dyn Vendor> {
    match settings.kind {
        VendorKind::OpenAi => Box::new(OpenAiVendor::new(settings, http)),
        VendorKind::Gemini => Box::new(GeminiVendor::new(settings, http)),
        VendorKind::Anthropic => Box::new(AnthropicVendor::new(settings, http)),
        VendorKind::Ollama => Box::new(OllamaVendor::new(settings, http)),
    }
}
