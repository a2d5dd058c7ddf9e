//! Minimal OpenAI-compatible chat-completions wire format. All five
//! provider variants speak this shape; provider-specific quirks are handled
//! by `ProviderConfig::render_messages`, not by the response types here.

use serde::{Deserialize, Serialize};

use crate::config::ChatMessage;

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Choice {
    #[serde(default)]
    pub message: Option<ResponseMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// The first non-empty assistant message, or an error naming what was
    /// missing. Mirrors the "prefer the first choice that yields a usable
    /// outcome" rule used for session chat steps.
    pub fn first_content(&self) -> Result<&str, String> {
        for choice in &self.choices {
            if let Some(message) = &choice.message {
                if let Some(content) = &message.content {
                    if !content.trim().is_empty() {
                        return Ok(content);
                    }
                }
            }
        }
        Err("no usable choice in LLM response (no message/content)".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_content_picks_first_nonempty_choice() {
        let body = r#"{
            "choices": [
                { "message": { "content": "" } },
                { "message": { "content": "hello" } }
            ]
        }"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.first_content().unwrap(), "hello");
    }

    #[test]
    fn first_content_errors_on_all_empty() {
        let body = r#"{ "choices": [] }"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.first_content().is_err());
    }
}
