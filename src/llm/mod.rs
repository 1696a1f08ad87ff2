//! LLM vendor adapters and the transcript they share.

pub mod anthropic;
pub mod gemini;
pub mod http;
pub mod json;
pub mod ollama;
pub mod openai;
pub mod transcript;
pub mod vendor;

pub use json::extract_json;
pub use transcript::{ChatMessage, Role, build_transcript};
pub use vendor::{
    MODEL_TABLE, ModelTier, Vendor, VendorKind, VendorSettings, connect, model_for,
};
