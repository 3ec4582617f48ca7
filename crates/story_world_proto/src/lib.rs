pub mod generation;
pub mod stream;
pub mod world;

pub use generation::{
    CharacterProfile, CharacterUpdate, CombinedStory, CompleteWorld, EventRecord, FactionProfile,
    FactionUpdate, GenerationMode, GenerationRequest, GenerationResult, Novel, NovelChapter,
    NovelRequest, RegionSeed, StoryProgress, UpdateAction, WorldResult,
};
pub use stream::{sse_frame, StreamEvent};
pub use world::{
    CharacterSummary, EventCategory, EventSummary, FactionSummary, NovelChapterSummary,
    NovelSummary, RegionSummary, WorldSnapshot, RECENT_EVENT_WINDOW, RECENT_NOVEL_WINDOW,
};
