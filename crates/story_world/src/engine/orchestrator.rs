//! Per-call coordination: resolve a model config, assemble the prompt, invoke
//! the client and normalize the output. Every operation degrades to
//! deterministic default content instead of returning an error; the log line
//! at each degradation point is the only trace.

use std::collections::VecDeque;

use serde_json::Value;
use story_world_proto::{
    CharacterProfile, CombinedStory, CompleteWorld, FactionProfile, GenerationRequest, Novel,
    NovelChapter, NovelRequest, StoryProgress, StreamEvent, WorldResult, WorldSnapshot,
};

use super::client::{ChatClientError, ChatModelClient, ChatRequest, OpenAiChatClient};
use super::config::{ModelConfig, ModelConfigRegistry};
use super::defaults;
use super::extract::extract_json_lenient;
use super::prompt::{self, PromptPair};
use super::scanner::NovelStreamScanner;
use super::updates::{list_from_value, story_progress_from_value};

/// Temperature override for the narrative-heavy modes.
const CREATIVE_TEMPERATURE: f64 = 0.8;

const STREAM_START_MESSAGE: &str = "开始生成故事和小说内容...";

/// The generation engine. One value per game save is typical; it owns the
/// model-config registry and the chat client and is driven synchronously.
#[derive(Debug)]
pub struct GenerationEngine<C: ChatModelClient> {
    registry: ModelConfigRegistry,
    client: C,
}

impl GenerationEngine<OpenAiChatClient> {
    /// Engine wired to the blocking HTTP client.
    pub fn with_default_client(registry: ModelConfigRegistry) -> Result<Self, ChatClientError> {
        Ok(Self::new(registry, OpenAiChatClient::new()?))
    }
}

impl<C: ChatModelClient> GenerationEngine<C> {
    pub fn new(registry: ModelConfigRegistry, client: C) -> Self {
        Self { registry, client }
    }

    pub fn registry(&self) -> &ModelConfigRegistry {
        &self.registry
    }

    #[cfg(test)]
    pub(crate) fn client(&self) -> &C {
        &self.client
    }

    /// Swap in the current config set, e.g. after admin changes.
    pub fn reload_registry(&mut self, configs: Vec<ModelConfig>) {
        self.registry.reload(configs);
    }

    fn invoke(
        &self,
        model_config_id: Option<i64>,
        prompt: PromptPair,
        temperature: Option<f64>,
    ) -> Result<String, ChatClientError> {
        let mut config = self.registry.resolve(model_config_id);
        if let Some(temperature) = temperature {
            config.temperature = temperature;
        }
        self.client.complete(&ChatRequest {
            config,
            system_prompt: prompt.system,
            user_prompt: prompt.user,
        })
    }

    pub fn generate_world(&self, background: &str) -> WorldResult {
        let response = match self.invoke(None, prompt::world_prompt(background), None) {
            Ok(response) => response,
            Err(err) => {
                eprintln!("生成世界时出错: {err}");
                return defaults::default_world(background);
            }
        };
        let extracted = extract_json_lenient(&response);
        if extracted.is_degraded() {
            return defaults::default_world(background);
        }
        serde_json::from_value(extracted.value)
            .unwrap_or_else(|_| defaults::default_world(background))
    }

    pub fn generate_complete_world(&self, background: &str) -> CompleteWorld {
        let response = match self.invoke(None, prompt::complete_world_prompt(background), None) {
            Ok(response) => response,
            Err(err) => {
                eprintln!("生成完整世界时发生错误: {err}");
                return defaults::default_complete_world(background);
            }
        };
        let extracted = extract_json_lenient(&response);
        if extracted.is_degraded() {
            return defaults::default_complete_world(background);
        }
        let mut world: CompleteWorld = serde_json::from_value(extracted.value)
            .unwrap_or_else(|_| defaults::default_complete_world(background));
        if world.enhanced_background.is_empty() {
            world.enhanced_background = background.to_string();
        }
        world
    }

    /// A bare JSON array and an object wrapping one under `factions` are both
    /// accepted; anything else falls back to the default roster.
    pub fn generate_factions(&self, world_background: &str) -> Vec<FactionProfile> {
        let response = match self.invoke(None, prompt::factions_prompt(world_background), None) {
            Ok(response) => response,
            Err(err) => {
                eprintln!("生成势力时出错: {err}");
                return defaults::default_factions();
            }
        };
        let extracted = extract_json_lenient(&response);
        if list_shaped(&extracted.value, "factions") {
            list_from_value(&extracted.value, "factions")
        } else {
            defaults::default_factions()
        }
    }

    pub fn generate_characters(
        &self,
        world_background: &str,
        factions: &[FactionProfile],
    ) -> Vec<CharacterProfile> {
        let fallback = || {
            let names: Vec<String> = factions.iter().map(|f| f.name.clone()).collect();
            defaults::default_characters(&names)
        };
        let prompt = prompt::characters_prompt(world_background, factions);
        let response = match self.invoke(None, prompt, None) {
            Ok(response) => response,
            Err(err) => {
                eprintln!("生成人物时出错: {err}");
                return fallback();
            }
        };
        let extracted = extract_json_lenient(&response);
        if list_shaped(&extracted.value, "characters") {
            list_from_value(&extracted.value, "characters")
        } else {
            fallback()
        }
    }

    pub fn simulate_days(
        &self,
        snapshot: &WorldSnapshot,
        request: &GenerationRequest,
    ) -> StoryProgress {
        let prompt = prompt::simulate_prompt(snapshot, request);
        let response = match self.invoke(
            request.model_config_id,
            prompt,
            Some(CREATIVE_TEMPERATURE),
        ) {
            Ok(response) => response,
            Err(err) => {
                eprintln!("生成事件时出错: {err}");
                return defaults::default_story_progress(request.current_day, request.days);
            }
        };
        let extracted = extract_json_lenient(&response);
        if extracted.is_degraded() {
            eprintln!("无法解析模型响应为JSON，使用默认事件");
            return defaults::default_story_progress(request.current_day, request.days);
        }
        story_progress_from_value(&extracted.value)
    }

    /// A response that is not parsable JSON is still prose worth keeping: it
    /// comes back as a single-chapter novel instead of being dropped.
    pub fn generate_novel(&self, snapshot: &WorldSnapshot, request: &NovelRequest) -> Novel {
        let prompt = prompt::novel_prompt(snapshot, request);
        let response = match self.invoke(request.model_config_id, prompt, None) {
            Ok(response) => response,
            Err(err) => {
                eprintln!("生成小说时出错: {err}");
                return defaults::default_novel(&request.theme);
            }
        };
        let extracted = extract_json_lenient(&response);
        if extracted.is_degraded() {
            return raw_text_novel(&request.theme, &response);
        }
        serde_json::from_value(extracted.value)
            .unwrap_or_else(|_| raw_text_novel(&request.theme, &response))
    }

    pub fn generate_story_and_novel(
        &self,
        snapshot: &WorldSnapshot,
        request: &GenerationRequest,
    ) -> CombinedStory {
        let prompt = prompt::combined_prompt(snapshot, request);
        let response = match self.invoke(
            request.model_config_id,
            prompt,
            Some(CREATIVE_TEMPERATURE),
        ) {
            Ok(response) => response,
            Err(err) => {
                eprintln!("生成故事和小说时出错: {err}");
                return defaults::default_story_and_novel(request.current_day, &request.guide);
            }
        };
        let extracted = extract_json_lenient(&response);
        combined_from_value(&extracted.value, request)
    }

    /// Streamed variant of [`Self::generate_story_and_novel`]. The returned
    /// iterator is pulled synchronously; it always starts with `start` and
    /// ends with exactly one terminal event.
    pub fn generate_story_and_novel_streamed(
        &self,
        snapshot: &WorldSnapshot,
        request: &GenerationRequest,
    ) -> StoryStream<C::Stream> {
        let prompt = prompt::streamed_prompt(snapshot, request);
        let mut config = self.registry.resolve(request.model_config_id);
        config.temperature = CREATIVE_TEMPERATURE;
        let chat_request = ChatRequest {
            config,
            system_prompt: prompt.system,
            user_prompt: prompt.user,
        };
        match self.client.stream(&chat_request) {
            Ok(fragments) => StoryStream::open(fragments),
            Err(err) => {
                eprintln!("流式生成故事和小说时出错: {err}");
                StoryStream::failed(err.to_string())
            }
        }
    }
}

/// An extracted value counts as a list payload when it is a bare array or
/// wraps one under `key`.
fn list_shaped(value: &Value, key: &str) -> bool {
    value.is_array() || value.get(key).is_some()
}

fn raw_text_novel(theme: &str, response: &str) -> Novel {
    Novel {
        title: format!("{theme}主题小说"),
        chapters: vec![NovelChapter {
            title: "第一章".to_string(),
            content: response.to_string(),
        }],
    }
}

fn combined_from_value(value: &Value, request: &GenerationRequest) -> CombinedStory {
    let progress_value = value.get("story_progress");
    let novel_value = value.get("novel");
    if progress_value.is_none() && novel_value.is_none() {
        eprintln!("无法解析模型响应为JSON，使用默认内容");
        return defaults::default_story_and_novel(request.current_day, &request.guide);
    }
    let story_progress = progress_value
        .map(story_progress_from_value)
        .unwrap_or_default();
    let novel = novel_value
        .and_then(|novel| serde_json::from_value(novel.clone()).ok())
        .unwrap_or_default();
    CombinedStory {
        story_progress,
        novel,
    }
}

/// Pull-driven event stream over one streamed generation. Fragments are read
/// lazily on each `next` call, so the caller's send loop paces the network
/// read.
#[derive(Debug)]
pub struct StoryStream<S> {
    fragments: Option<S>,
    scanner: NovelStreamScanner,
    queue: VecDeque<StreamEvent>,
    done: bool,
}

impl<S> StoryStream<S> {
    fn open(fragments: S) -> Self {
        Self {
            fragments: Some(fragments),
            scanner: NovelStreamScanner::new(),
            queue: VecDeque::from([StreamEvent::Start {
                message: STREAM_START_MESSAGE.to_string(),
            }]),
            done: false,
        }
    }

    /// Stream that could not be opened: `start` followed by one `error`.
    fn failed(error: String) -> Self {
        Self {
            fragments: None,
            scanner: NovelStreamScanner::new(),
            queue: VecDeque::from([
                StreamEvent::Start {
                    message: STREAM_START_MESSAGE.to_string(),
                },
                StreamEvent::Error { error },
            ]),
            done: false,
        }
    }
}

impl<S> Iterator for StoryStream<S>
where
    S: Iterator<Item = Result<String, ChatClientError>>,
{
    type Item = StreamEvent;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(event) = self.queue.pop_front() {
                if event.is_terminal() {
                    self.done = true;
                    self.fragments = None;
                }
                return Some(event);
            }
            if self.done {
                return None;
            }
            match self.fragments.as_mut().map(Iterator::next) {
                Some(Some(Ok(fragment))) => {
                    self.queue.extend(self.scanner.push_fragment(&fragment));
                }
                Some(Some(Err(err))) => {
                    // Transport loss mid-stream; salvage whatever arrived.
                    eprintln!("流式生成故事和小说时出错: {err}");
                    self.fragments = None;
                    self.queue.extend(self.scanner.finish());
                }
                Some(None) | None => {
                    self.fragments = None;
                    if self.scanner.is_terminal() {
                        self.done = true;
                        return None;
                    }
                    self.queue.extend(self.scanner.finish());
                }
            }
        }
    }
}
