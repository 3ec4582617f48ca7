//! Read-only world state passed into generation calls.
//!
//! These records replace ad hoc database rows: the persistence layer builds a
//! `WorldSnapshot` once per call and the engine never touches raw row data.

use serde::{Deserialize, Serialize};

/// Most-recent-N window of events carried into a prompt.
pub const RECENT_EVENT_WINDOW: usize = 10;
/// Most-recent-N window of earlier novels carried into a prompt.
pub const RECENT_NOVEL_WINDOW: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WorldSnapshot {
    pub background: String,
    #[serde(default)]
    pub factions: Vec<FactionSummary>,
    #[serde(default)]
    pub characters: Vec<CharacterSummary>,
    #[serde(default)]
    pub regions: Vec<RegionSummary>,
    #[serde(default)]
    pub recent_events: Vec<EventSummary>,
    #[serde(default)]
    pub recent_novels: Vec<NovelSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactionSummary {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub power_level: i64,
    #[serde(default)]
    pub headquarters: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterSummary {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faction_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faction_name: Option<String>,
    #[serde(default)]
    pub personality: String,
    #[serde(default)]
    pub age: i64,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub realm: String,
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSummary {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faction_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    World,
    Faction,
    Character,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSummary {
    pub category: EventCategory,
    pub day: u32,
    #[serde(default)]
    pub time_period: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Chapter of an earlier novel, summarized for prompt context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NovelChapterSummary {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NovelSummary {
    pub title: String,
    #[serde(default)]
    pub chapters: Vec<NovelChapterSummary>,
}
