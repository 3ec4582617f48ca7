//! Normalization of raw story-progress payloads into typed records.
//!
//! The model's output is treated as untrusted: every list item is decoded on
//! its own and validated against the action contract. A malformed item is
//! logged and skipped; the batch as a whole never fails.

use serde_json::Value;
use story_world_proto::{CharacterUpdate, FactionUpdate, StoryProgress, UpdateAction};

/// Build a [`StoryProgress`] from a raw JSON object, item by item. Missing
/// lists come out empty and invalid items are dropped with a log line.
pub fn story_progress_from_value(value: &Value) -> StoryProgress {
    StoryProgress {
        world_events: collect_items(value, "world_events"),
        faction_events: collect_items(value, "faction_events"),
        character_events: collect_items(value, "character_events"),
        faction_updates: collect_valid(value, "faction_updates", faction_update_is_valid),
        character_updates: collect_valid(value, "character_updates", character_update_is_valid),
        new_time: string_field(value, "new_time"),
        summary: string_field(value, "summary"),
    }
}

fn string_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn collect_items<T: serde::de::DeserializeOwned>(value: &Value, key: &str) -> Vec<T> {
    collect_valid(value, key, |_| true)
}

fn collect_valid<T, F>(value: &Value, key: &str, is_valid: F) -> Vec<T>
where
    T: serde::de::DeserializeOwned,
    F: Fn(&T) -> bool,
{
    let Some(items) = value.get(key).and_then(Value::as_array) else {
        return Vec::new();
    };
    let mut collected = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match serde_json::from_value::<T>(item.clone()) {
            Ok(typed) if is_valid(&typed) => collected.push(typed),
            Ok(_) => {
                eprintln!("skipping {key}[{index}]: action contract violated");
            }
            Err(err) => {
                eprintln!("skipping {key}[{index}]: {err}");
            }
        }
    }
    collected
}

/// `update` needs a target id; `create` needs at least a name.
fn faction_update_is_valid(update: &FactionUpdate) -> bool {
    match update.action {
        UpdateAction::Update => update.faction_id.is_some(),
        UpdateAction::Create => update
            .name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty()),
    }
}

fn character_update_is_valid(update: &CharacterUpdate) -> bool {
    match update.action {
        UpdateAction::Update => update.character_id.is_some(),
        UpdateAction::Create => update
            .name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty()),
    }
}

/// Decode a list of records, accepting either a bare array or an object
/// wrapping one under `key`. Item decoding stays per-item lenient.
pub fn list_from_value<T: serde::de::DeserializeOwned>(value: &Value, key: &str) -> Vec<T> {
    if value.is_array() {
        let wrapper = serde_json::json!({ key: value });
        return collect_items(&wrapper, key);
    }
    collect_items(value, key)
}
