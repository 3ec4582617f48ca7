//! Generation requests and the typed results each mode produces.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    Simulate,
    Novel,
    StoryAndNovel,
    StoryAndNovelStreamed,
}

/// Per-call request for the simulate / combined / streamed modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Free-form user instruction steering the generated narrative.
    pub guide: String,
    pub current_day: u32,
    pub days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_config_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NovelRequest {
    pub theme: String,
    pub style: String,
    pub day: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_config_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSeed {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WorldResult {
    #[serde(default)]
    pub world_introduction: String,
    #[serde(default)]
    pub enhanced_background: String,
    #[serde(default)]
    pub cultivation_system: String,
    #[serde(default)]
    pub geography: String,
    #[serde(default)]
    pub culture: String,
    #[serde(default)]
    pub history: Vec<String>,
    #[serde(default)]
    pub map_regions: Vec<RegionSeed>,
    #[serde(default)]
    pub summary: String,
}

/// Full initial world: background, regions, factions and characters in one
/// result. Produced by the one-shot complete-world operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CompleteWorld {
    #[serde(default)]
    pub enhanced_background: String,
    #[serde(default)]
    pub world_introduction: String,
    #[serde(default)]
    pub cultivation_system: String,
    #[serde(default)]
    pub regions: Vec<RegionSeed>,
    #[serde(default)]
    pub factions: Vec<FactionProfile>,
    #[serde(default)]
    pub characters: Vec<CharacterProfile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactionProfile {
    pub name: String,
    #[serde(default)]
    pub ideal: String,
    #[serde(default)]
    pub background: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub power_level: i64,
    #[serde(default)]
    pub headquarters_location: String,
    #[serde(default)]
    pub relationships: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterProfile {
    pub name: String,
    #[serde(default)]
    pub faction_name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub personality: String,
    #[serde(default)]
    pub birthday: String,
    #[serde(default)]
    pub age: i64,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub realm: String,
    #[serde(default)]
    pub lifespan: i64,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub goals: String,
    #[serde(default)]
    pub relationships: String,
}

/// One generated event. Category is implied by which list carries it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub day: u32,
    #[serde(default)]
    pub time_period: String,
    #[serde(default)]
    pub theme: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faction_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateAction {
    Create,
    Update,
}

/// Instruction to create or modify a faction record.
///
/// `action: update` items must carry `faction_id`; `action: create` items
/// must carry at least `name`. Items violating this are skipped one-by-one at
/// the normalization boundary, never failing the whole batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactionUpdate {
    pub action: UpdateAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faction_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_level: Option<i64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub headquarters_location: String,
    #[serde(default)]
    pub change_reason: String,
}

/// Instruction to create or modify a character record. Same action contract
/// as [`FactionUpdate`], keyed on `character_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterUpdate {
    pub action: UpdateAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faction_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faction_name: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub realm: String,
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub goals: String,
    #[serde(default)]
    pub personality: String,
    #[serde(default)]
    pub appearance: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub change_reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StoryProgress {
    #[serde(default)]
    pub world_events: Vec<EventRecord>,
    #[serde(default)]
    pub faction_events: Vec<EventRecord>,
    #[serde(default)]
    pub character_events: Vec<EventRecord>,
    #[serde(default)]
    pub faction_updates: Vec<FactionUpdate>,
    #[serde(default)]
    pub character_updates: Vec<CharacterUpdate>,
    #[serde(default)]
    pub new_time: String,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NovelChapter {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Novel {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub chapters: Vec<NovelChapter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedStory {
    pub story_progress: StoryProgress,
    pub novel: Novel,
}

/// Result of one non-streaming generation call, tagged by mode. The streamed
/// mode yields a sequence of [`crate::StreamEvent`] values instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum GenerationResult {
    Simulate { story_progress: StoryProgress },
    Novel { novel: Novel },
    Combined { story_progress: StoryProgress, novel: Novel },
}

impl From<CombinedStory> for GenerationResult {
    fn from(combined: CombinedStory) -> Self {
        GenerationResult::Combined {
            story_progress: combined.story_progress,
            novel: combined.novel,
        }
    }
}
