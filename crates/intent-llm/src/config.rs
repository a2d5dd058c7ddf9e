use serde::{Deserialize, Serialize};

/// The set of LLM providers the adapter layer knows how to address. Each
/// variant speaks an OpenAI-compatible chat-completions wire format; the
/// differences between them live entirely in `ProviderConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    Deepseek,
    OpenRouter,
    Doubao,
    Qwen,
    Gemini,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::Deepseek => "deepseek",
            LlmProvider::OpenRouter => "openrouter",
            LlmProvider::Doubao => "doubao",
            LlmProvider::Qwen => "qwen",
            LlmProvider::Gemini => "gemini",
        }
    }
}

/// Provider-neutral configuration: one shape covers all five variants, so
/// rebinding the advisor on a `LLM_PROVIDER` settings change is a matter of
/// constructing a new `ProviderConfig`, not switching implementations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub provider: LlmProvider,
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub temperature: f32,
    /// Some providers (notably Doubao) fold the system instruction into the
    /// first user turn rather than a dedicated `system` role. This template
    /// controls how `{system}`/`{user}` are combined into the request's
    /// message list; `"{system}\n\n{user}"` folds both into one user turn,
    /// `None` sends them as separate `system`/`user` messages.
    pub prompt_template: Option<String>,
}

impl ProviderConfig {
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Builds the message list to send for a given `(system, user)` prompt
    /// pair, applying `prompt_template` if the provider needs it folded.
    pub fn render_messages(&self, system: &str, user: &str) -> Vec<ChatMessage> {
        match &self.prompt_template {
            Some(template) => {
                let folded = template.replace("{system}", system).replace("{user}", user);
                vec![ChatMessage {
                    role: "user".to_string(),
                    content: folded,
                }]
            }
            None => vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_template_keeps_roles_separate() {
        let cfg = ProviderConfig {
            provider: LlmProvider::OpenRouter,
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "test-model".to_string(),
            api_key: "key".to_string(),
            temperature: 0.2,
            prompt_template: None,
        };
        let messages = cfg.render_messages("be terse", "hello");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
    }

    #[test]
    fn folding_template_merges_into_one_user_turn() {
        let cfg = ProviderConfig {
            provider: LlmProvider::Doubao,
            base_url: "https://ark.cn-beijing.volces.com/api/v3".to_string(),
            model: "doubao-pro".to_string(),
            api_key: "key".to_string(),
            temperature: 0.2,
            prompt_template: Some("{system}\n\n{user}".to_string()),
        };
        let messages = cfg.render_messages("be terse", "hello");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "user");
        assert_eq!(messages[0].content, "be terse\n\nhello");
    }

    #[test]
    fn endpoint_trims_trailing_slash() {
        let cfg = ProviderConfig {
            provider: LlmProvider::Deepseek,
            base_url: "https://api.deepseek.com/".to_string(),
            model: "deepseek-chat".to_string(),
            api_key: "key".to_string(),
            temperature: 0.2,
            prompt_template: None,
        };
        assert_eq!(cfg.endpoint(), "https://api.deepseek.com/chat/completions");
    }
}
