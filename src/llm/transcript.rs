//! Vendor-neutral chat transcript for one generation request.

use serde::{Deserialize, Serialize};

use crate::commit::prompt::build_prompt;
use crate::commit::request::GenerationRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Build the message sequence every adapter sends.
///
/// Order: system, user, then one assistant and one user message per history
/// turn (the user message is skipped when empty), then the format primer as
/// a final assistant message.
pub fn build_transcript(request: &GenerationRequest) -> Vec<ChatMessage> {
    let prompt = build_prompt(&request.diff, &request.constraints);

    let mut messages = vec![
        ChatMessage::new(Role::System, prompt.system),
        ChatMessage::new(Role::User, prompt.user),
    ];

    for turn in &request.history {
        messages.push(ChatMessage::new(Role::Assistant, turn.assistant_text()));
        if !turn.user_text().is_empty() {
            messages.push(ChatMessage::new(Role::User, turn.user_text()));
        }
    }

    if let Some(primer) = request.format().primer() {
        messages.push(ChatMessage::new(Role::Assistant, primer));
    }

    messages
}

/// Put the primer back in front of a continuation.
///
/// Backends that honor the final assistant message return only what follows
/// it; others repeat it. Both shapes come out starting with `primer`.
pub fn restore_primer(primer: Option<&str>, content: &str) -> String {
    let trimmed = content.trim();
    match primer {
        Some(p) if !trimmed.starts_with(p) => format!("{p}{trimmed}"),
        _ => trimmed.to_string(),
    }
}
