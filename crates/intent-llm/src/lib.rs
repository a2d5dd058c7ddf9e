//! LLMAdvisor: generates new utterances and repair suggestions via an
//! external LLM. Strictly advisory — it is only invoked by explicit operator
//! action and never mutates RouteStore or VectorIndex state directly.
//!
//! Provider-neutral: a small adapter dispatches over `{deepseek, openrouter,
//! doubao, qwen, gemini}`, each carrying the same `ProviderConfig` shape.
//! Per-request clients are stateless, so rebinding on a settings change is
//! just constructing a new `LlmAdvisor`.

mod client;
mod config;
mod error;
mod wire;

pub use client::{LlmAdvisor, RepairSuggestion, RouteContext};
pub use config::{ChatMessage, LlmProvider, ProviderConfig};
pub use error::LlmError;
