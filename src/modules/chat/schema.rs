use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::services::llm::{ApiUsage, ChatMessage};

const ALLOWED_ROLES: &[&str] = &["system", "user", "assistant"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

/// Accepts `message`, `prompt` or `messages`; the first usable one wins in
/// the order `messages`, `message`, `prompt`.
#[derive(Debug, Default, Deserialize, Validate)]
#[validate(schema(function = "validate_chat_input"))]
pub struct ChatRequest {
    pub message: Option<String>,
    pub prompt: Option<String>,
    pub messages: Option<Vec<ChatTurn>>,
    pub model: Option<String>,
    pub system: Option<String>,
    #[validate(range(min = 0.0, max = 2.0, message = "Temperature must be between 0 and 2"))]
    pub temperature: Option<f32>,
}

pub enum ChatInput<'a> {
    Conversation(&'a [ChatTurn]),
    Single(&'a str),
}

impl ChatRequest {
    pub fn input(&self) -> Option<ChatInput<'_>> {
        if let Some(turns) = &self.messages {
            if turns.iter().any(|t| !t.content.trim().is_empty()) {
                return Some(ChatInput::Conversation(turns));
            }
        }

        [&self.message, &self.prompt]
            .into_iter()
            .flatten()
            .map(|text| text.trim())
            .find(|text| !text.is_empty())
            .map(ChatInput::Single)
    }

    pub fn model_or<'a>(&'a self, default: &'a str) -> &'a str {
        non_blank(&self.model).unwrap_or(default)
    }

    /// Ordered turns to send upstream.
    pub fn turns(&self, default_system: &str) -> Vec<ChatMessage> {
        let system = non_blank(&self.system);

        match self.input() {
            Some(ChatInput::Conversation(turns)) => {
                let mut messages: Vec<ChatMessage> = turns
                    .iter()
                    .filter(|t| !t.content.trim().is_empty())
                    .map(|t| ChatMessage {
                        role: t.role.trim().to_lowercase(),
                        content: t.content.clone(),
                    })
                    .collect();

                if let Some(system) = system {
                    if !messages.iter().any(|m| m.role == "system") {
                        messages.insert(0, ChatMessage::system(system));
                    }
                }

                messages
            }
            Some(ChatInput::Single(text)) => vec![
                ChatMessage::system(system.unwrap_or(default_system)),
                ChatMessage::user(text),
            ],
            None => Vec::new(),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn validate_chat_input(request: &ChatRequest) -> Result<(), ValidationError> {
    match request.input() {
        None => Err(invalid(
            "no_content",
            "No 'message', 'prompt' or 'messages' provided",
        )),
        Some(ChatInput::Conversation(turns)) => {
            // Only turns that get forwarded are role-checked.
            let bad_role = turns
                .iter()
                .filter(|t| !t.content.trim().is_empty())
                .find(|t| !ALLOWED_ROLES.contains(&t.role.trim().to_lowercase().as_str()));

            match bad_role {
                Some(turn) => Err(invalid(
                    "bad_role",
                    format!("Unsupported message role '{}'", turn.role),
                )),
                None => Ok(()),
            }
        }
        Some(ChatInput::Single(_)) => Ok(()),
    }
}

fn invalid(code: &'static str, message: impl Into<String>) -> ValidationError {
    let message: String = message.into();
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

/// First human-readable message out of a validation failure.
pub fn first_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| errors.to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageInfo {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl From<ApiUsage> for UsageInfo {
    fn from(u: ApiUsage) -> Self {
        Self {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageInfo>,
}
