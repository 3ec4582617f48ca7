//! Lenient JSON recovery from arbitrary model output.
//!
//! Models are instructed to return bare JSON but routinely wrap it in
//! markdown fences or prepend chatter. Recovery tries, in order: a direct
//! parse, stripping one surrounding fence, then every fenced block in source
//! order. No structural repair is attempted beyond two textual substitutions;
//! a full miss degrades to an empty object instead of an error.

use serde_json::Value;

const FENCE: &str = "```";
const FENCE_JSON: &str = "```json";
const DEGRADED_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    /// The whole text was already valid JSON.
    Direct,
    /// Valid after removing one leading ```json fence and one trailing fence.
    FenceStripped,
    /// Recovered from the n-th fenced block (0-based, source order).
    FencedBlock { index: usize },
    /// Nothing parsed; the value is `{}` and `preview` holds the head of the
    /// input for diagnostics.
    Degraded { preview: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedJson {
    pub value: Value,
    pub outcome: ExtractionOutcome,
}

impl ExtractedJson {
    pub fn is_degraded(&self) -> bool {
        matches!(self.outcome, ExtractionOutcome::Degraded { .. })
    }
}

/// Recover a JSON value from `content`. Never fails: the worst case is an
/// empty object tagged [`ExtractionOutcome::Degraded`].
pub fn extract_json_lenient(content: &str) -> ExtractedJson {
    if let Ok(value) = serde_json::from_str::<Value>(content) {
        return ExtractedJson {
            value,
            outcome: ExtractionOutcome::Direct,
        };
    }

    if let Some(stripped) = strip_surrounding_fence(content) {
        if let Ok(value) = serde_json::from_str::<Value>(stripped) {
            return ExtractedJson {
                value,
                outcome: ExtractionOutcome::FenceStripped,
            };
        }
    }

    for (index, body) in FencedBlocks::new(content).enumerate() {
        let repaired = repair_unknown_numbers(body.trim());
        if let Ok(value) = serde_json::from_str::<Value>(&repaired) {
            return ExtractedJson {
                value,
                outcome: ExtractionOutcome::FencedBlock { index },
            };
        }
    }

    let preview: String = content.chars().take(DEGRADED_PREVIEW_CHARS).collect();
    ExtractedJson {
        value: Value::Object(serde_json::Map::new()),
        outcome: ExtractionOutcome::Degraded { preview },
    }
}

/// Remove one leading ```json fence and one trailing ``` fence, if present.
fn strip_surrounding_fence(content: &str) -> Option<&str> {
    let trimmed = content.trim();
    let without_head = trimmed.strip_prefix(FENCE_JSON)?;
    let without_tail = without_head
        .trim_end()
        .strip_suffix(FENCE)
        .unwrap_or(without_head);
    Some(without_tail.trim())
}

/// Bodies of every ```-fenced block (optional `json` tag), source order,
/// non-greedy: each block ends at the first closing fence.
struct FencedBlocks<'a> {
    rest: &'a str,
}

impl<'a> FencedBlocks<'a> {
    fn new(content: &'a str) -> Self {
        Self { rest: content }
    }
}

impl<'a> Iterator for FencedBlocks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let open = self.rest.find(FENCE)?;
            let after_open = &self.rest[open + FENCE.len()..];
            let body_start = after_open.strip_prefix("json").unwrap_or(after_open);
            let Some(close) = body_start.find(FENCE) else {
                self.rest = "";
                return None;
            };
            let body = &body_start[..close];
            self.rest = &body_start[close + FENCE.len()..];
            if !body.trim().is_empty() {
                return Some(body);
            }
        }
    }
}

/// Replace the literal token `未知` used where a number belongs (`"age": 未知`)
/// with `0`. Quoted occurrences are left alone; `null` is never touched.
fn repair_unknown_numbers(body: &str) -> String {
    const UNKNOWN: &str = "未知";
    let mut repaired = String::with_capacity(body.len());
    let mut rest = body;
    while let Some(colon) = rest.find(':') {
        repaired.push_str(&rest[..colon + 1]);
        rest = &rest[colon + 1..];
        let after_space = rest.trim_start_matches([' ', '\t']);
        if let Some(after_unknown) = after_space.strip_prefix(UNKNOWN) {
            repaired.push_str(" 0");
            rest = after_unknown;
        }
    }
    repaired.push_str(rest);
    repaired
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn valid_json_is_identity() {
        let text = r#"{"title": "测试", "chapters": []}"#;
        let extracted = extract_json_lenient(text);
        assert_eq!(extracted.outcome, ExtractionOutcome::Direct);
        assert_eq!(
            extracted.value,
            serde_json::from_str::<Value>(text).expect("valid")
        );
    }

    #[test]
    fn fenced_json_block_is_recovered_unchanged() {
        let extracted = extract_json_lenient("```json\n{\"a\": 1}\n```");
        assert_eq!(extracted.value, json!({"a": 1}));
        assert!(!extracted.is_degraded());
    }

    #[test]
    fn fence_with_surrounding_prose_uses_block_scan() {
        let text = "好的，以下是结果：\n```json\n{\"a\": 1}\n```\n完毕。";
        let extracted = extract_json_lenient(text);
        assert_eq!(extracted.outcome, ExtractionOutcome::FencedBlock { index: 0 });
        assert_eq!(extracted.value, json!({"a": 1}));
    }

    #[test]
    fn first_parsable_block_wins() {
        let text = "```json\n{broken\n```\n```\n{\"b\": 2}\n```";
        let extracted = extract_json_lenient(text);
        assert_eq!(extracted.outcome, ExtractionOutcome::FencedBlock { index: 1 });
        assert_eq!(extracted.value, json!({"b": 2}));
    }

    #[test]
    fn unknown_token_after_colon_becomes_zero() {
        let text = "前言\n```json\n{\"name\": \"张三\", \"age\": 未知, \"lifespan\": null}\n```";
        let extracted = extract_json_lenient(text);
        assert_eq!(extracted.value["age"], json!(0));
        assert_eq!(extracted.value["lifespan"], Value::Null);
        assert_eq!(extracted.value["name"], "张三");
    }

    #[test]
    fn quoted_unknown_is_preserved() {
        let text = "x\n```json\n{\"status\": \"未知\"}\n```";
        let extracted = extract_json_lenient(text);
        assert_eq!(extracted.value["status"], "未知");
    }

    #[test]
    fn total_failure_degrades_to_empty_object() {
        let text = "这不是JSON，也没有代码块。";
        let extracted = extract_json_lenient(text);
        assert!(extracted.is_degraded());
        assert_eq!(extracted.value, json!({}));
        match extracted.outcome {
            ExtractionOutcome::Degraded { preview } => {
                assert!(preview.starts_with("这不是"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn degraded_preview_is_bounded() {
        let text = "x".repeat(1000);
        let extracted = extract_json_lenient(&text);
        match extracted.outcome {
            ExtractionOutcome::Degraded { preview } => {
                assert_eq!(preview.chars().count(), 200);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
