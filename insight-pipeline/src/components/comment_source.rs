use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::comment_loader::RawComment;
use crate::source::Source;
use crate::types::{AuthorInfo, Candidate, InsightQuery};

/// Converts raw comment records into pipeline candidates.
///
/// A pure structural adapter: no filtering or validation happens here.
/// Missing authors become "Anonymous", missing or empty ids get a fresh
/// UUID, and output order matches input order.
pub struct CommentSource {
    comments: Vec<RawComment>,
}

impl CommentSource {
    /// Create a source over one collected batch of raw comments.
    pub fn new(comments: Vec<RawComment>) -> Self {
        Self { comments }
    }

    /// Structural conversion of raw records, in input order.
    pub fn convert(raw_items: &[RawComment]) -> Vec<Candidate> {
        raw_items.iter().map(Self::to_candidate).collect()
    }

    fn to_candidate(item: &RawComment) -> Candidate {
        let author = item
            .author
            .clone()
            .unwrap_or_else(|| "Anonymous".to_string());
        let id = match item.id.as_deref() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => Uuid::new_v4().to_string(),
        };

        Candidate {
            id,
            content: item.text.clone(),
            author: AuthorInfo::new(author),
            created_at: Utc::now(),
            like_count: item.likes,
            conversation_id: item.conversation_id.clone(),
            ..Candidate::default()
        }
    }
}

#[async_trait]
impl Source<InsightQuery, Candidate> for CommentSource {
    async fn get_candidates(&self, _query: &InsightQuery) -> Result<Vec<Candidate>, String> {
        Ok(Self::convert(&self.comments))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_fills_defaults() {
        let raw = vec![
            RawComment {
                author: Some("dana".into()),
                text: "재구매 의사 있습니다".into(),
                likes: 3,
                id: Some("c-1".into()),
                ..RawComment::default()
            },
            RawComment {
                text: "배송이 빨랐어요".into(),
                ..RawComment::default()
            },
        ];
        let candidates = CommentSource::convert(&raw);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].id, "c-1");
        assert_eq!(candidates[0].author.username, "dana");
        assert_eq!(candidates[0].like_count, 3);
        assert_eq!(candidates[1].author.username, "Anonymous");
        assert!(!candidates[1].id.is_empty());
    }

    #[test]
    fn empty_id_gets_a_fresh_uuid() {
        let raw = vec![RawComment {
            text: "좋아요".into(),
            id: Some(String::new()),
            ..RawComment::default()
        }];
        let candidates = CommentSource::convert(&raw);
        assert!(!candidates[0].id.is_empty());
        assert_ne!(candidates[0].id, "");
    }

    #[test]
    fn conversion_preserves_input_order() {
        let raw: Vec<RawComment> = (0..5)
            .map(|i| RawComment {
                text: format!("comment {}", i),
                id: Some(format!("id-{}", i)),
                ..RawComment::default()
            })
            .collect();
        let candidates = CommentSource::convert(&raw);
        let ids: Vec<&str> = candidates.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["id-0", "id-1", "id-2", "id-3", "id-4"]);
    }

    #[tokio::test]
    async fn source_returns_converted_batch() {
        let source = CommentSource::new(vec![RawComment {
            text: "가성비 좋네요".into(),
            ..RawComment::default()
        }]);
        let query = InsightQuery::new("req-1", "prod-1");
        let candidates = source.get_candidates(&query).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].content, "가성비 좋네요");
    }
}
