//! Deterministic, lexicon-based feature extraction.
//!
//! Stands in for the external text-understanding provider so the server
//! runs offline: each feature is estimated from marker-keyword hits plus a
//! couple of surface signals. Estimates are crude but stable, which is
//! what a demo binary and the end-to-end tests need.

use async_trait::async_trait;
use std::collections::BTreeMap;

use insight_pipeline::{CandidateFeatures, ExtractionError, TextFeatureExtractor};

const PURCHASE_MARKERS: [&str; 7] = ["구매", "샀", "살까", "사고 싶", "주문", "재구매", "장바구니"];
const FEEDBACK_MARKERS: [&str; 6] = ["개선", "바라", "아쉬", "건의", "했으면", "추가되면"];
const SHARE_MARKERS: [&str; 4] = ["추천", "공유", "알려", "소개"];
const SAVE_MARKERS: [&str; 3] = ["저장", "북마크", "스크랩"];
const TOXIC_MARKERS: [&str; 5] = ["최악", "쓰레기", "사기", "환불", "절대 사지"];
const CONTROVERSY_MARKERS: [&str; 3] = ["논란", "별로", "글쎄"];

/// Topic lexicon: first matching category becomes the primary topic.
const TOPIC_MARKERS: [(&str, &[&str]); 4] = [
    ("배송", &["배송", "택배", "도착"]),
    ("가격", &["가격", "가성비", "할인", "비싸"]),
    ("품질", &["품질", "내구성", "마감", "튼튼"]),
    ("디자인", &["디자인", "색상", "예쁘", "깔끔"]),
];

pub struct LexiconFeatureExtractor;

impl LexiconFeatureExtractor {
    /// 0.3 per marker hit, saturating at 0.9.
    fn marker_score(text: &str, markers: &[&str]) -> f64 {
        let hits = markers.iter().filter(|marker| text.contains(**marker)).count();
        (hits as f64 * 0.3).min(0.9)
    }

    fn keywords(text: &str) -> Vec<String> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for token in text.split_whitespace() {
            let token = token.trim_matches(|c: char| !c.is_alphanumeric());
            if token.chars().count() >= 2 {
                *counts.entry(token).or_insert(0) += 1;
            }
        }
        let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
            .into_iter()
            .take(3)
            .map(|(token, _)| token.to_string())
            .collect()
    }

    fn topics(text: &str) -> Vec<String> {
        TOPIC_MARKERS
            .iter()
            .filter(|(_, markers)| markers.iter().any(|marker| text.contains(marker)))
            .map(|(topic, _)| (*topic).to_string())
            .collect()
    }
}

#[async_trait]
impl TextFeatureExtractor for LexiconFeatureExtractor {
    async fn extract(&self, text: &str) -> Result<CandidateFeatures, ExtractionError> {
        if text.trim().is_empty() {
            return Err(ExtractionError::EmptyResponse);
        }

        let purchase = Self::marker_score(text, &PURCHASE_MARKERS);
        let feedback = Self::marker_score(text, &FEEDBACK_MARKERS);
        let share = Self::marker_score(text, &SHARE_MARKERS);
        let save = Self::marker_score(text, &SAVE_MARKERS);
        let toxicity = Self::marker_score(text, &TOXIC_MARKERS);
        let controversy = Self::marker_score(text, &CONTROVERSY_MARKERS);

        let asks_question = text.contains('?') || text.contains("나요") || text.contains("까요");
        let exclaims = text.contains('!');
        let length_factor = (text.chars().count() as f64 / 100.0).min(1.0);

        Ok(CandidateFeatures {
            purchase_intent: purchase,
            constructive_feedback: feedback,
            reply_inducing: if asks_question { 0.7 } else { 0.2 },
            share_probability: share,
            viral_potential: if exclaims { 0.4 + share * 0.4 } else { share * 0.4 },
            actionable_insight: feedback.max(purchase * 0.5),
            quote_worthy: (length_factor * 0.5).min(0.5),
            save_worthy: save,
            follow_author: 0.0,
            dm_probability: 0.0,
            copy_link_probability: share * 0.5,
            profile_click: 0.1,
            bookmark_worthy: save,
            sentiment_intensity: if exclaims { 0.8 } else { 0.4 },
            dwell_time: length_factor,
            toxicity,
            controversy_score: controversy,
            not_interested: if toxicity > 0.0 { 0.3 } else { 0.1 },
            report_probability: toxicity * 0.3,
            keywords: Self::keywords(text),
            topics: Self::topics(text),
        })
    }
}
