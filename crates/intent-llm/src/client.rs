use std::collections::HashSet;
use std::time::Duration;

use intent_core::{ArcStr, RouteId};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;
use crate::error::{LlmError, truncate_for_error};
use crate::wire::{ChatCompletionRequest, ChatCompletionResponse};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The minimal slice of a route an advisor call needs: enough context to
/// prompt an LLM, never a full `Route` (whose thresholds and negative
/// samples are irrelevant to generation/repair).
#[derive(Debug, Clone)]
pub struct RouteContext {
    pub id: RouteId,
    pub name: ArcStr,
    pub description: ArcStr,
    pub utterances: Vec<String>,
}

/// Output of `suggest_repair`. Advisory only: the engine neither validates
/// nor applies these, the operator chooses which to accept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairSuggestion {
    pub rationalization: String,
    pub new_utterances: Vec<String>,
    pub conflicting_utterances: Vec<String>,
}

/// `generate_utterances` and `suggest_repair` over a provider-neutral
/// adapter. Per-request clients are stateless; `LlmAdvisor` itself holds
/// only the rebind-on-settings-change configuration.
pub struct LlmAdvisor {
    client: Client,
    config: ProviderConfig,
    utterance_generation_prompt: String,
    agent_repair_prompt: String,
}

const DEFAULT_UTTERANCE_PROMPT: &str = "You are helping expand a set of example phrases (\"utterances\") \
that should all trigger a given intent route. Given the route's name, description, and existing \
example utterances, write {count} new, diverse utterances that a user might say to trigger this \
route. Do not repeat any existing utterance. Reply with exactly one utterance per line, no numbering, \
no extra commentary.\n\nRoute name: {name}\nRoute description: {description}\nExisting utterances:\n{utterances}";

const DEFAULT_REPAIR_PROMPT: &str = "Two intent routes in a semantic router overlap: users saying things \
meant for one route are sometimes matched to the other. Given both routes' names, descriptions, and \
utterances, suggest a repair. Reply with a single JSON object with exactly these keys: \
\"rationalization\" (a short explanation), \"new_utterances\" (disambiguating phrases to add to the \
source route), and \"conflicting_utterances\" (a subset of the source route's existing utterances that \
should be removed because they straddle the boundary with the target route). Reply with only the JSON \
object, no surrounding text.\n\nSource route: {source_name} — {source_description}\nSource utterances:\n\
{source_utterances}\n\nTarget route: {target_name} — {target_description}\nTarget utterances:\n\
{target_utterances}";

impl LlmAdvisor {
    pub fn new(config: ProviderConfig) -> Self {
        Self::with_prompts(
            config,
            DEFAULT_UTTERANCE_PROMPT.to_string(),
            DEFAULT_REPAIR_PROMPT.to_string(),
        )
    }

    /// `utterance_generation_prompt`/`agent_repair_prompt` mirror the
    /// `UTTERANCE_GENERATION_PROMPT`/`AGENT_REPAIR_PROMPT` settings keys:
    /// task-level templates, independent of the per-provider message-folding
    /// quirks `ProviderConfig::prompt_template` controls.
    pub fn with_prompts(
        config: ProviderConfig,
        utterance_generation_prompt: String,
        agent_repair_prompt: String,
    ) -> Self {
        Self {
            client: Client::new(),
            config,
            utterance_generation_prompt,
            agent_repair_prompt,
        }
    }

    /// Cheap readiness probe: true once a provider endpoint is configured.
    /// Does not reach the network, unlike an actual `complete` call.
    pub fn is_configured(&self) -> bool {
        !self.config.base_url.is_empty()
    }

    pub async fn generate_utterances(
        &self,
        route_ctx: &RouteContext,
        count: usize,
        reference_utterances: &[String],
    ) -> Result<Vec<String>, LlmError> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let prompt = self
            .utterance_generation_prompt
            .replace("{count}", &count.to_string())
            .replace("{name}", route_ctx.name.as_ref())
            .replace("{description}", route_ctx.description.as_ref())
            .replace("{utterances}", &bullet_list(&route_ctx.utterances));

        let body = self
            .complete("You generate training utterances for an intent router.", &prompt)
            .await?;

        let seen: HashSet<String> = reference_utterances
            .iter()
            .map(|u| normalize(u))
            .collect();
        let mut out = Vec::new();
        let mut added: HashSet<String> = HashSet::new();
        for line in body.lines() {
            let candidate = line.trim();
            if candidate.is_empty() {
                continue;
            }
            let key = normalize(candidate);
            if seen.contains(&key) || added.contains(&key) {
                continue;
            }
            added.insert(key);
            out.push(candidate.to_string());
            if out.len() == count {
                break;
            }
        }
        Ok(out)
    }

    pub async fn suggest_repair(
        &self,
        source_ctx: &RouteContext,
        target_ctx: &RouteContext,
    ) -> Result<RepairSuggestion, LlmError> {
        let prompt = self
            .agent_repair_prompt
            .replace("{source_name}", source_ctx.name.as_ref())
            .replace("{source_description}", source_ctx.description.as_ref())
            .replace("{source_utterances}", &bullet_list(&source_ctx.utterances))
            .replace("{target_name}", target_ctx.name.as_ref())
            .replace("{target_description}", target_ctx.description.as_ref())
            .replace("{target_utterances}", &bullet_list(&target_ctx.utterances));

        let body = self
            .complete(
                "You diagnose and repair overlapping intent routes in a semantic router.",
                &prompt,
            )
            .await?;

        let json_slice = extract_json_object(&body).ok_or_else(|| LlmError::Deserialization {
            message: "repair response did not contain a JSON object".to_string(),
            body_snippet: Some(truncate_for_error(&body, 2_000)),
        })?;

        let mut suggestion: RepairSuggestion =
            serde_json::from_str(json_slice).map_err(|e| LlmError::Deserialization {
                message: format!("{e}"),
                body_snippet: Some(truncate_for_error(json_slice, 2_000)),
            })?;

        let source_set: HashSet<&str> = source_ctx
            .utterances
            .iter()
            .map(|u| u.as_str())
            .collect();
        suggestion
            .conflicting_utterances
            .retain(|u| source_set.contains(u.as_str()));

        Ok(suggestion)
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: self.config.render_messages(system, user),
            temperature: self.config.temperature,
        };

        let url = self.config.endpoint();
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| LlmError::Request {
                message: e.to_string(),
                url: Some(url.clone()),
                is_timeout: e.is_timeout(),
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| LlmError::Request {
            message: format!("reading response body (status {status}): {e}"),
            url: Some(url.clone()),
            is_timeout: e.is_timeout(),
        })?;

        if !(200..300).contains(&status) {
            return Err(LlmError::Api {
                status,
                message: body.clone(),
                body_snippet: Some(truncate_for_error(&body, 4_096)),
            });
        }

        let parsed: ChatCompletionResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::Deserialization {
                message: e.to_string(),
                body_snippet: Some(truncate_for_error(&body, 2_000)),
            })?;

        parsed
            .first_content()
            .map(|s| s.to_string())
            .map_err(|message| LlmError::Deserialization {
                message,
                body_snippet: Some(truncate_for_error(&body, 512)),
            })
    }
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|u| format!("- {u}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// LLMs reliably wrap JSON in prose or code fences despite instructions; take
/// the first balanced `{...}` span rather than assuming the whole body parses.
fn extract_json_object(body: &str) -> Option<&str> {
    let start = body.find('{')?;
    let mut depth = 0i32;
    for (i, c) in body[start..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&body[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::MockServer;

    fn test_config(base_url: String) -> ProviderConfig {
        ProviderConfig {
            provider: crate::config::LlmProvider::OpenRouter,
            base_url,
            model: "test-model".to_string(),
            api_key: "test-key".to_string(),
            temperature: 0.3,
            prompt_template: None,
        }
    }

    #[test]
    fn extract_json_object_skips_surrounding_prose() {
        let body = "Sure, here you go:\n```json\n{\"a\": 1}\n```\nHope that helps!";
        assert_eq!(extract_json_object(body), Some("{\"a\": 1}"));
    }

    #[test]
    fn extract_json_object_none_without_braces() {
        assert_eq!(extract_json_object("no json here"), None);
    }

    #[tokio::test]
    async fn generate_utterances_dedupes_and_caps() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::POST).path("/chat/completions");
            then.status(200).json_body(serde_json::json!({
                "choices": [{"message": {"content":
                    "what's the weather like\nWHAT'S THE WEATHER LIKE\nwill it rain today\nis it sunny"
                }}]
            }));
        });

        let advisor = LlmAdvisor::new(test_config(server.base_url()));
        let route_ctx = RouteContext {
            id: 1,
            name: "weather".into(),
            description: "weather queries".into(),
            utterances: vec!["how's the weather".to_string()],
        };
        let reference = vec!["will it rain today".to_string()];

        let out = advisor
            .generate_utterances(&route_ctx, 2, &reference)
            .await
            .expect("generate_utterances");

        mock.assert();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], "what's the weather like");
        assert_eq!(out[1], "is it sunny");
    }

    #[tokio::test]
    async fn generate_utterances_zero_count_skips_request() {
        let server = MockServer::start();
        let advisor = LlmAdvisor::new(test_config(server.base_url()));
        let route_ctx = RouteContext {
            id: 1,
            name: "weather".into(),
            description: "".into(),
            utterances: vec![],
        };
        let out = advisor
            .generate_utterances(&route_ctx, 0, &[])
            .await
            .expect("generate_utterances");
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn suggest_repair_parses_json_and_filters_conflicts() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(httpmock::Method::POST).path("/chat/completions");
            then.status(200).json_body(serde_json::json!({
                "choices": [{"message": {"content":
                    "Here is the suggestion:\n{\"rationalization\": \"these straddle the boundary\", \
                     \"new_utterances\": [\"cancel my flight booking\"], \
                     \"conflicting_utterances\": [\"book a flight\", \"not a real utterance\"]}"
                }}]
            }));
        });

        let advisor = LlmAdvisor::new(test_config(server.base_url()));
        let source = RouteContext {
            id: 1,
            name: "travel".into(),
            description: "".into(),
            utterances: vec!["book a flight".to_string()],
        };
        let target = RouteContext {
            id: 2,
            name: "booking".into(),
            description: "".into(),
            utterances: vec!["book a hotel".to_string()],
        };

        let suggestion = advisor
            .suggest_repair(&source, &target)
            .await
            .expect("suggest_repair");

        assert_eq!(suggestion.rationalization, "these straddle the boundary");
        assert_eq!(suggestion.new_utterances, vec!["cancel my flight booking".to_string()]);
        assert_eq!(suggestion.conflicting_utterances, vec!["book a flight".to_string()]);
    }

    #[tokio::test]
    async fn complete_surfaces_api_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(httpmock::Method::POST).path("/chat/completions");
            then.status(500).body("internal error");
        });

        let advisor = LlmAdvisor::new(test_config(server.base_url()));
        let route_ctx = RouteContext {
            id: 1,
            name: "weather".into(),
            description: "".into(),
            utterances: vec![],
        };
        let err = advisor
            .generate_utterances(&route_ctx, 1, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 500, .. }));
    }
}
