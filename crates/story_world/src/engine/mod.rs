//! Generation engine - turns world state plus a user guide into structured
//! story updates and prose, via an OpenAI-compatible chat model.
//!
//! Submodules:
//! - `config`: model configurations and the registry that resolves them
//! - `client`: the chat-model client trait and the blocking HTTP client
//! - `extract`: lenient JSON recovery from arbitrary model output
//! - `scanner`: incremental scanner emitting partial events from a stream
//! - `prompt`: deterministic prompt assembly per generation mode
//! - `updates`: normalization of story-progress payloads into typed records
//! - `defaults`: deterministic fallback content used on any failure
//! - `orchestrator`: per-call coordination of the pieces above

mod client;
mod config;
mod defaults;
mod extract;
mod orchestrator;
mod prompt;
mod scanner;
mod updates;

#[cfg(test)]
mod tests;

pub use client::{
    ChatClientError, ChatFragmentStream, ChatModelClient, ChatRequest, OpenAiChatClient,
};
pub use config::{
    default_model_config, ModelConfig, ModelConfigError, ModelConfigRegistry, ENV_LLM_API_KEY,
    ENV_LLM_BASE_URL, ENV_LLM_MAX_TOKENS, ENV_LLM_MODEL, ENV_LLM_TEMPERATURE,
};
pub use extract::{extract_json_lenient, ExtractedJson, ExtractionOutcome};
pub use orchestrator::{GenerationEngine, StoryStream};
pub use prompt::{
    characters_prompt, combined_prompt, complete_world_prompt, factions_prompt, novel_prompt,
    simulate_prompt, streamed_prompt, world_prompt, PromptPair,
};
pub use scanner::{NovelStreamScanner, STREAM_FORMAT_ERROR};
pub use story_world_proto::sse_frame;
pub use updates::{list_from_value, story_progress_from_value};
