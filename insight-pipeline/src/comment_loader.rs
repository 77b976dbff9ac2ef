//! Raw comment batch loader.
//!
//! Parses collected comment records (JSON arrays) into `RawComment` structs.
//! Upstream collectors are inconsistent about field types: `likes` arrives
//! as either a number or a string, and `text`/`content` are used
//! interchangeably. Parsing is deliberately forgiving.

use serde::Deserialize;
use std::io::Read;

/// One raw comment record as collected from an external platform.
///
/// Everything except the text is optional; the source stage fills in
/// defaults when converting to a `Candidate`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawComment {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, alias = "content")]
    pub text: String,
    #[serde(default, deserialize_with = "deserialize_likes")]
    pub likes: u64,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

/// Flexible like-count deserializer: accepts a non-negative integer or a
/// digits-only string; anything else reads as 0.
fn deserialize_likes<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(parse_likes(&value))
}

/// Like-count coercion shared with the source stage contract: `"12"` and
/// `12` both parse to 12; `"-5"`, `"abc"`, `3.5`, `null` all parse to 0.
pub fn parse_likes(value: &serde_json::Value) -> u64 {
    match value {
        serde_json::Value::Number(n) => n.as_u64().unwrap_or(0),
        serde_json::Value::String(s) => {
            let s = s.trim();
            if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
                s.parse().unwrap_or(0)
            } else {
                0
            }
        }
        _ => 0,
    }
}

/// Load raw comments from a JSON reader. The payload must be an array of
/// comment objects.
pub fn load_comments<R: Read>(reader: R) -> Result<Vec<RawComment>, String> {
    serde_json::from_reader(reader).map_err(|e| format!("comment JSON parse error: {}", e))
}

/// Load raw comments from a JSON file path.
pub fn load_comments_file(path: &str) -> Result<Vec<RawComment>, String> {
    let file =
        std::fs::File::open(path).map_err(|e| format!("Failed to open '{}': {}", path, e))?;
    load_comments(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_JSON: &str = r#"[
        {"author": "dana", "text": "가성비가 정말 좋아요", "likes": 12, "id": "c-1"},
        {"author": "lee", "content": "배송이 빨랐습니다", "likes": "7"},
        {"text": "별로예요", "likes": "not-a-number"},
        {"text": "재구매 의사 있습니다", "likes": -3}
    ]"#;

    #[test]
    fn load_sample_json() {
        let comments = load_comments(SAMPLE_JSON.as_bytes()).unwrap();
        assert_eq!(comments.len(), 4);
        assert_eq!(comments[0].author.as_deref(), Some("dana"));
        assert_eq!(comments[0].likes, 12);
        assert_eq!(comments[0].id.as_deref(), Some("c-1"));
        // "content" alias maps onto text
        assert_eq!(comments[1].text, "배송이 빨랐습니다");
        assert_eq!(comments[1].likes, 7);
        // author missing entirely
        assert!(comments[2].author.is_none());
    }

    #[test]
    fn likes_parsing_tolerates_junk() {
        let comments = load_comments(SAMPLE_JSON.as_bytes()).unwrap();
        assert_eq!(comments[2].likes, 0); // non-digit string
        assert_eq!(comments[3].likes, 0); // negative number
    }

    #[test]
    fn parse_likes_handles_value_shapes() {
        assert_eq!(parse_likes(&serde_json::json!(42)), 42);
        assert_eq!(parse_likes(&serde_json::json!("42")), 42);
        assert_eq!(parse_likes(&serde_json::json!(" 42 ")), 42);
        assert_eq!(parse_likes(&serde_json::json!("4.2")), 0);
        assert_eq!(parse_likes(&serde_json::json!(null)), 0);
        assert_eq!(parse_likes(&serde_json::json!(3.7)), 0);
    }
}
