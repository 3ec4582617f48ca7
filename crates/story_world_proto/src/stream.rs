//! Events emitted while a novel/story response is being reconstructed from a
//! token stream, plus the server-sent-events framing used on the wire.
//!
//! Ordering contract for one stream: `novel_title` precedes `chapter_title`,
//! which precedes that chapter's `content_chunk`s; `novel_complete` follows
//! the last chunk; `story_progress` and `complete` follow `novel_complete`.
//! Every stream ends with exactly one terminal event (`complete` or `error`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Start {
        message: String,
    },
    NovelTitle {
        title: String,
    },
    ChapterTitle {
        chapter_index: usize,
        chapter_title: String,
    },
    ContentChunk {
        content: String,
        is_final: bool,
    },
    NovelComplete,
    StoryProgress {
        data: serde_json::Value,
    },
    Complete {
        full_data: serde_json::Value,
    },
    Error {
        error: String,
    },
}

impl StreamEvent {
    /// Terminal events end the stream; at most one is ever emitted.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Complete { .. } | StreamEvent::Error { .. })
    }
}

/// Frame one event as an SSE message: `data: <one-line JSON>\n\n`.
pub fn sse_frame(event: &StreamEvent) -> String {
    let payload = serde_json::to_string(event)
        .unwrap_or_else(|_| r#"{"type":"error","error":"serialize failed"}"#.to_string());
    format!("data: {payload}\n\n")
}
