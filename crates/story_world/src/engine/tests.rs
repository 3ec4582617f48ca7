//! Engine-level tests driving the orchestrator through a mock chat client.

use std::cell::RefCell;

use story_world_proto::{
    GenerationRequest, NovelRequest, StreamEvent, UpdateAction, WorldSnapshot,
};

use super::client::{ChatClientError, ChatModelClient, ChatRequest};
use super::config::{ModelConfig, ModelConfigRegistry};
use super::defaults;
use super::orchestrator::GenerationEngine;

/// Scripted client: one canned completion response, one canned fragment
/// sequence, and a log of every request it saw.
#[derive(Debug)]
struct MockClient {
    response: Result<String, ChatClientError>,
    fragments: Result<Vec<Result<String, ChatClientError>>, ChatClientError>,
    requests: RefCell<Vec<ChatRequest>>,
}

impl MockClient {
    fn completing(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
            fragments: Ok(Vec::new()),
            requests: RefCell::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            response: Err(ChatClientError::Http {
                message: "connection refused".to_string(),
            }),
            fragments: Err(ChatClientError::Http {
                message: "connection refused".to_string(),
            }),
            requests: RefCell::new(Vec::new()),
        }
    }

    fn streaming(fragments: Vec<Result<String, ChatClientError>>) -> Self {
        Self {
            response: Err(ChatClientError::EmptyChoice),
            fragments: Ok(fragments),
            requests: RefCell::new(Vec::new()),
        }
    }

    fn last_request(&self) -> ChatRequest {
        self.requests.borrow().last().cloned().expect("no request")
    }
}

impl ChatModelClient for MockClient {
    type Stream = std::vec::IntoIter<Result<String, ChatClientError>>;

    fn complete(&self, request: &ChatRequest) -> Result<String, ChatClientError> {
        self.requests.borrow_mut().push(request.clone());
        self.response.clone()
    }

    fn stream(&self, request: &ChatRequest) -> Result<Self::Stream, ChatClientError> {
        self.requests.borrow_mut().push(request.clone());
        self.fragments.clone().map(Vec::into_iter)
    }
}

fn registry() -> ModelConfigRegistry {
    ModelConfigRegistry::new(vec![
        ModelConfig {
            id: 1,
            name: "primary".to_string(),
            api_key: "key-1".to_string(),
            base_url: "https://api.example.com".to_string(),
            model: "model-a".to_string(),
            temperature: 0.7,
            max_tokens: Some(2000),
            is_active: true,
        },
        ModelConfig {
            id: 2,
            name: "secondary".to_string(),
            api_key: "key-2".to_string(),
            base_url: "https://api.example.com".to_string(),
            model: "model-b".to_string(),
            temperature: 0.3,
            max_tokens: Some(4000),
            is_active: false,
        },
    ])
}

fn snapshot() -> WorldSnapshot {
    WorldSnapshot {
        background: "灵气复苏的东洲大陆".to_string(),
        ..WorldSnapshot::default()
    }
}

fn request() -> GenerationRequest {
    GenerationRequest {
        guide: "宗门大比".to_string(),
        current_day: 5,
        days: 1,
        model_config_id: None,
    }
}

// Written out literally so the keys arrive in schema order, the way the
// prompt instructs the model to emit them.
fn streamed_document() -> String {
    concat!(
        "```json\n",
        "{\"novel\": {\"title\": \"风起灵山\", \"chapters\": [",
        "{\"title\": \"第一章：入门\", \"content\": \"少年背着行囊，一步步登上青云山的石阶。\"}",
        "]}, \"story_progress\": {\"world_events\": [], \"faction_events\": [], ",
        "\"character_events\": [], \"faction_updates\": [], \"character_updates\": [], ",
        "\"new_time\": \"第6天，清晨\", \"summary\": \"少年入门。\"}}\n",
        "```",
    )
    .to_string()
}

#[test]
fn simulate_days_parses_fenced_response() {
    let response = r#"好的：
```json
{
    "world_events": [{"day": 6, "time_period": "清晨", "theme": "冲突事件",
                      "title": "山门之变", "description": "风云突变。"}],
    "character_updates": [
        {"action": "update", "status": "失踪"},
        {"action": "update", "character_id": 3, "status": "重伤"}
    ],
    "new_time": "第6天，夜晚",
    "summary": "动荡的一天。"
}
```"#;
    let client = MockClient::completing(response);
    let engine = GenerationEngine::new(registry(), client);
    let progress = engine.simulate_days(&snapshot(), &request());

    assert_eq!(progress.world_events.len(), 1);
    assert_eq!(progress.world_events[0].title, "山门之变");
    // The id-less update is dropped, the rest of the batch survives.
    assert_eq!(progress.character_updates.len(), 1);
    assert_eq!(progress.character_updates[0].action, UpdateAction::Update);
    assert_eq!(progress.new_time, "第6天，夜晚");
}

#[test]
fn simulate_days_falls_back_on_client_error() {
    let engine = GenerationEngine::new(registry(), MockClient::failing());
    let progress = engine.simulate_days(&snapshot(), &request());
    assert_eq!(progress, defaults::default_story_progress(5, 1));
}

#[test]
fn simulate_days_falls_back_on_unparsable_response() {
    let engine = GenerationEngine::new(registry(), MockClient::completing("今天天气不错。"));
    let progress = engine.simulate_days(&snapshot(), &request());
    assert_eq!(progress, defaults::default_story_progress(5, 1));
}

#[test]
fn simulate_days_resolves_explicit_config_and_bumps_temperature() {
    let client = MockClient::completing("{}");
    let engine = GenerationEngine::new(registry(), client);
    let mut req = request();
    req.model_config_id = Some(2);
    engine.simulate_days(&snapshot(), &req);

    let sent = engine.client().last_request();
    assert_eq!(sent.config.id, 2);
    assert_eq!(sent.config.model, "model-b");
    assert_eq!(sent.config.temperature, 0.8);
    assert!(sent.system_prompt.contains("宗门大比"));
}

#[test]
fn generate_factions_accepts_bare_array_and_wrapper() {
    let bare = r#"```json
[{"name": "青云宗", "power_level": 80}]
```"#;
    let engine = GenerationEngine::new(registry(), MockClient::completing(bare));
    let factions = engine.generate_factions("背景");
    assert_eq!(factions.len(), 1);
    assert_eq!(factions[0].name, "青云宗");

    let wrapped = r#"{"factions": [{"name": "青云宗"}, {"name": "血煞门"}]}"#;
    let engine = GenerationEngine::new(registry(), MockClient::completing(wrapped));
    assert_eq!(engine.generate_factions("背景").len(), 2);
}

#[test]
fn generate_factions_falls_back_on_prose() {
    let engine = GenerationEngine::new(registry(), MockClient::completing("没有可用的JSON。"));
    let factions = engine.generate_factions("背景");
    assert_eq!(factions, defaults::default_factions());
}

#[test]
fn generate_characters_default_covers_leader_and_elder() {
    let engine = GenerationEngine::new(registry(), MockClient::failing());
    let factions = defaults::default_factions();
    let characters = engine.generate_characters("背景", &factions);
    assert_eq!(characters.len(), 6);
    assert_eq!(characters[0].name, "光明圣殿宗主");
}

#[test]
fn generate_novel_wraps_unparsable_prose() {
    let prose = "山风拂过，少年握紧了手中的剑。";
    let engine = GenerationEngine::new(registry(), MockClient::completing(prose));
    let novel_request = NovelRequest {
        theme: "成长".to_string(),
        style: "热血".to_string(),
        day: 3,
        model_config_id: None,
    };
    let novel = engine.generate_novel(&snapshot(), &novel_request);
    assert_eq!(novel.title, "成长主题小说");
    assert_eq!(novel.chapters.len(), 1);
    assert_eq!(novel.chapters[0].content, prose);
}

#[test]
fn generate_world_falls_back_on_client_error() {
    let engine = GenerationEngine::new(registry(), MockClient::failing());
    let world = engine.generate_world("东洲");
    assert_eq!(world, defaults::default_world("东洲"));
    assert!(world.world_introduction.contains("东洲"));
}

#[test]
fn generate_complete_world_keeps_caller_background_when_missing() {
    let engine = GenerationEngine::new(
        registry(),
        MockClient::completing(r#"{"world_introduction": "介绍", "factions": []}"#),
    );
    let world = engine.generate_complete_world("东洲大陆");
    assert_eq!(world.enhanced_background, "东洲大陆");
    assert_eq!(world.world_introduction, "介绍");
}

#[test]
fn generate_story_and_novel_falls_back_without_both_sections() {
    let engine = GenerationEngine::new(registry(), MockClient::completing(r#"{"other": 1}"#));
    let combined = engine.generate_story_and_novel(&snapshot(), &request());
    assert_eq!(combined, defaults::default_story_and_novel(5, "宗门大比"));
}

#[test]
fn streamed_generation_emits_ordered_events() {
    let document = streamed_document();
    // Uneven small fragments, the way a real stream arrives.
    let fragments = char_fragments(&document, 7);

    let engine = GenerationEngine::new(registry(), MockClient::streaming(fragments));
    let events: Vec<StreamEvent> = engine
        .generate_story_and_novel_streamed(&snapshot(), &request())
        .collect();

    assert!(matches!(events.first(), Some(StreamEvent::Start { .. })));
    assert!(matches!(events.last(), Some(StreamEvent::Complete { .. })));
    assert_eq!(events.iter().filter(|event| event.is_terminal()).count(), 1);

    let title = events.iter().find_map(|event| match event {
        StreamEvent::NovelTitle { title } => Some(title.clone()),
        _ => None,
    });
    assert_eq!(title.as_deref(), Some("风起灵山"));

    let content: String = events
        .iter()
        .filter_map(|event| match event {
            StreamEvent::ContentChunk { content, .. } => Some(content.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(content, "少年背着行囊，一步步登上青云山的石阶。");
}

#[test]
fn streamed_generation_open_failure_is_start_then_error() {
    let engine = GenerationEngine::new(registry(), MockClient::failing());
    let events: Vec<StreamEvent> = engine
        .generate_story_and_novel_streamed(&snapshot(), &request())
        .collect();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], StreamEvent::Start { .. }));
    assert!(matches!(events[1], StreamEvent::Error { .. }));
}

#[test]
fn streamed_generation_transport_error_still_terminates_once() {
    let document = streamed_document();
    let half = document.chars().take(document.chars().count() / 2).collect::<String>();
    let fragments = vec![
        Ok(half),
        Err(ChatClientError::Http {
            message: "reset by peer".to_string(),
        }),
    ];
    let engine = GenerationEngine::new(registry(), MockClient::streaming(fragments));
    let events: Vec<StreamEvent> = engine
        .generate_story_and_novel_streamed(&snapshot(), &request())
        .collect();
    assert_eq!(events.iter().filter(|event| event.is_terminal()).count(), 1);
    assert!(events.last().is_some_and(StreamEvent::is_terminal));
}

/// Split on char boundaries into fragments of roughly `size` chars.
fn char_fragments(text: &str, size: usize) -> Vec<Result<String, ChatClientError>> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size)
        .map(|chunk| Ok(chunk.iter().collect()))
        .collect()
}
