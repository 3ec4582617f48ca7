//! Incremental scanner over a streaming novel/story response.
//!
//! The model is asked for one fenced JSON object: a `novel` (title plus one
//! chapter) followed by a `story_progress` block. Rather than waiting for the
//! full document, the scanner re-scans the accumulated buffer from cheap
//! string anchors on every fragment and speculatively emits partial events
//! the moment they become derivable. Fragment sizes are small and the payload
//! is bounded (a chapter, a few kilobytes), so rescanning beats carrying a
//! real tokenizer position.
//!
//! The speculative path is an optimization, not the correctness boundary: if
//! the upstream closes before a terminal event, `finish` runs the full-buffer
//! extractor and always produces exactly one terminal event.

use serde_json::Value;
use story_world_proto::StreamEvent;

use super::extract::extract_json_lenient;

/// Emit a `content_chunk` once this many new characters accumulated.
const CHUNK_EMIT_CHARS: usize = 10;
/// Lookahead window (chars) used to confirm a quote closes the content value.
const CLOSE_LOOKAHEAD_CHARS: usize = 19;

const NOVEL_KEY: &str = "\"novel\"";
const TITLE_KEY: &str = "\"title\":";
const CHAPTERS_KEY: &str = "\"chapters\"";
const CONTENT_KEY: &str = "\"content\":";
const JSON_FENCE_OPEN: &str = "```json";
const JSON_FENCE_CLOSE: &str = "```";

pub const STREAM_FORMAT_ERROR: &str = "AI生成内容格式错误";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Looking for the novel object and its title.
    Waiting,
    /// Streaming out the first chapter's title and content.
    NovelContent,
    /// Waiting for the fenced document to complete and parse.
    StoryProgress,
    /// A terminal event was emitted; the scanner is inert.
    Terminal,
}

#[derive(Debug)]
pub struct NovelStreamScanner {
    buffer: String,
    state: ScanState,
    chapter_title_sent: bool,
    /// High-water mark (bytes) into the re-derived unescaped chapter content.
    /// Characters before it were already emitted and are never re-sent.
    sent_bytes: usize,
}

impl Default for NovelStreamScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl NovelStreamScanner {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            state: ScanState::Waiting,
            chapter_title_sent: false,
            sent_bytes: 0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state == ScanState::Terminal
    }

    /// Feed one fragment and collect every event it makes derivable. A push
    /// cascades through as many states as the buffer allows.
    pub fn push_fragment(&mut self, fragment: &str) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.state == ScanState::Terminal {
            return events;
        }
        self.buffer.push_str(fragment);
        loop {
            let advanced = match self.state {
                ScanState::Waiting => self.scan_novel_title(&mut events),
                ScanState::NovelContent => self.scan_chapter(&mut events),
                ScanState::StoryProgress => {
                    self.scan_story_progress(&mut events);
                    false
                }
                ScanState::Terminal => false,
            };
            if !advanced {
                break;
            }
        }
        events
    }

    /// Signal upstream close. If no terminal event was emitted yet, fall back
    /// to full-buffer extraction; the result is always exactly one terminal
    /// event, `complete` when the document is recoverable, `error` otherwise.
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        if self.state == ScanState::Terminal {
            return Vec::new();
        }
        self.state = ScanState::Terminal;
        let extracted = extract_json_lenient(&self.buffer);
        if extracted.value.get("novel").is_some() && extracted.value.get("story_progress").is_some()
        {
            vec![StreamEvent::Complete {
                full_data: extracted.value,
            }]
        } else {
            vec![StreamEvent::Error {
                error: STREAM_FORMAT_ERROR.to_string(),
            }]
        }
    }

    fn scan_novel_title(&mut self, events: &mut Vec<StreamEvent>) -> bool {
        let Some(novel_start) = self.buffer.find(NOVEL_KEY) else {
            return false;
        };
        let section = &self.buffer[novel_start..];
        let Some(title_key) = section.find(TITLE_KEY) else {
            return false;
        };
        let value = section[title_key + TITLE_KEY.len()..].trim_start();
        let Some(inner) = value.strip_prefix('"') else {
            return false;
        };
        let Some(end) = find_unescaped_quote(inner) else {
            return false;
        };
        let title = inner[..end].to_string();
        events.push(StreamEvent::NovelTitle { title });
        self.state = ScanState::NovelContent;
        true
    }

    fn scan_chapter(&mut self, events: &mut Vec<StreamEvent>) -> bool {
        let Some(chapters_start) = self.buffer.find(CHAPTERS_KEY) else {
            return false;
        };
        if !self.chapter_title_sent {
            let Some(title) = first_complete_title(&self.buffer[chapters_start..]) else {
                return false;
            };
            events.push(StreamEvent::ChapterTitle {
                chapter_index: 0,
                chapter_title: title,
            });
            self.chapter_title_sent = true;
        }

        let scan = scan_chapter_content(&self.buffer[chapters_start..], self.sent_bytes);
        for content in scan.chunks {
            events.push(StreamEvent::ContentChunk {
                content,
                is_final: false,
            });
        }
        self.sent_bytes = scan.sent_bytes;
        if scan.closed {
            if let Some(content) = scan.final_chunk {
                events.push(StreamEvent::ContentChunk {
                    content,
                    is_final: true,
                });
            }
            events.push(StreamEvent::NovelComplete);
            self.state = ScanState::StoryProgress;
            return true;
        }
        false
    }

    fn scan_story_progress(&mut self, events: &mut Vec<StreamEvent>) {
        let Some(open) = self.buffer.find(JSON_FENCE_OPEN) else {
            return;
        };
        let body = &self.buffer[open + JSON_FENCE_OPEN.len()..];
        let Some(close) = body.find(JSON_FENCE_CLOSE) else {
            return;
        };
        let candidate = body[..close].trim();
        // An unparsable candidate just means the document is still growing.
        let Ok(full_data) = serde_json::from_str::<Value>(candidate) else {
            return;
        };
        let Some(data) = full_data.get("story_progress") else {
            return;
        };
        events.push(StreamEvent::StoryProgress { data: data.clone() });
        events.push(StreamEvent::Complete { full_data });
        self.state = ScanState::Terminal;
    }
}

/// Byte offset of the first quote not preceded by an odd run of backslashes.
fn find_unescaped_quote(s: &str) -> Option<usize> {
    let mut escaped = false;
    for (index, byte) in s.bytes().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match byte {
            b'\\' => escaped = true,
            b'"' => return Some(index),
            _ => {}
        }
    }
    None
}

/// First complete `"title": "…"` value in `section`. No escape processing:
/// the value ends at the next quote, as chapter titles never embed one.
fn first_complete_title(section: &str) -> Option<String> {
    let key = section.find(TITLE_KEY)?;
    let rest = section[key + TITLE_KEY.len()..].trim_start();
    let inner = rest.strip_prefix('"')?;
    let end = inner.find('"')?;
    Some(inner[..end].to_string())
}

#[derive(Debug, Default)]
struct ContentScan {
    /// Non-final chunks that crossed the emission threshold, in order.
    chunks: Vec<String>,
    /// Updated high-water mark for the caller to store.
    sent_bytes: usize,
    closed: bool,
    final_chunk: Option<String>,
}

/// Accumulates unescaped content and cuts a chunk whenever enough new
/// characters pile up past the high-water mark.
struct ContentAccum {
    extracted: String,
    chunks: Vec<String>,
    sent_bytes: usize,
    unsent_chars: usize,
}

impl ContentAccum {
    fn new(sent_bytes: usize) -> Self {
        Self {
            extracted: String::new(),
            chunks: Vec::new(),
            sent_bytes,
            unsent_chars: 0,
        }
    }

    fn push(&mut self, ch: char) {
        self.extracted.push(ch);
        if self.extracted.len() > self.sent_bytes {
            self.unsent_chars += 1;
            if self.unsent_chars >= CHUNK_EMIT_CHARS {
                self.chunks
                    .push(self.extracted[self.sent_bytes..].to_string());
                self.sent_bytes = self.extracted.len();
                self.unsent_chars = 0;
            }
        }
    }
}

/// Re-derive the chapter content from the `"chapters"` section and report
/// anything newly emittable past `sent_bytes`. Rescans are prefix-stable: a
/// quote at the very end of the buffer is left unconsumed until its lookahead
/// exists, so earlier scans never disagree with later ones.
fn scan_chapter_content(section: &str, sent_bytes: usize) -> ContentScan {
    let mut scan = ContentScan {
        sent_bytes,
        ..ContentScan::default()
    };
    let Some(content_key) = section.find(CONTENT_KEY) else {
        return scan;
    };
    let rest = section[content_key + CONTENT_KEY.len()..].trim_start();
    let Some(inner) = rest.strip_prefix('"') else {
        return scan;
    };

    let mut accum = ContentAccum::new(sent_bytes);
    let mut escape = false;
    for (pos, ch) in inner.char_indices() {
        if escape {
            accum.push(match ch {
                'n' => '\n',
                '"' => '"',
                '\\' => '\\',
                other => other,
            });
            escape = false;
            continue;
        }
        match ch {
            '\\' => escape = true,
            '"' => {
                let lookahead: String = inner[pos + ch.len_utf8()..]
                    .chars()
                    .take(CLOSE_LOOKAHEAD_CHARS)
                    .collect();
                let trimmed = lookahead.trim_start();
                if trimmed.starts_with('}') {
                    scan.closed = true;
                    break;
                }
                if trimmed.is_empty() {
                    // Buffer ends at this quote; wait for the lookahead.
                    break;
                }
                accum.push('"');
            }
            other => accum.push(other),
        }
    }

    scan.chunks = accum.chunks;
    scan.sent_bytes = accum.sent_bytes;
    if scan.closed {
        if accum.extracted.len() > accum.sent_bytes {
            scan.final_chunk = Some(accum.extracted[accum.sent_bytes..].to_string());
            scan.sent_bytes = accum.extracted.len();
        }
    }
    scan
}
