pub mod engine;

pub use engine::{
    default_model_config, extract_json_lenient, sse_frame, story_progress_from_value,
    ChatClientError, ChatModelClient, ChatRequest, ExtractedJson, ExtractionOutcome,
    GenerationEngine, ModelConfig, ModelConfigError, ModelConfigRegistry, NovelStreamScanner,
    OpenAiChatClient, PromptPair, StoryStream,
};
pub use story_world_proto::{
    CharacterProfile, CharacterSummary, CharacterUpdate, CombinedStory, CompleteWorld,
    EventCategory, EventRecord, EventSummary, FactionProfile, FactionSummary, FactionUpdate,
    GenerationMode, GenerationRequest, GenerationResult, Novel, NovelChapter,
    NovelChapterSummary, NovelRequest, NovelSummary, RegionSeed, RegionSummary, StoryProgress,
    StreamEvent, UpdateAction, WorldResult, WorldSnapshot,
};
