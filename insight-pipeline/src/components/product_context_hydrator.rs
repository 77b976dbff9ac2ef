use async_trait::async_trait;
use std::collections::HashMap;

use crate::query_hydrator::QueryHydrator;
use crate::types::InsightQuery;

/// Fills in brand keywords for the query's product from a metadata map,
/// leaving explicitly supplied keywords alone.
pub struct ProductContextHydrator {
    brand_keywords: HashMap<String, Vec<String>>,
}

impl ProductContextHydrator {
    pub fn new(brand_keywords: HashMap<String, Vec<String>>) -> Self {
        Self { brand_keywords }
    }
}

#[async_trait]
impl QueryHydrator<InsightQuery> for ProductContextHydrator {
    fn enable(&self, query: &InsightQuery) -> bool {
        query.brand_keywords.is_empty() && !self.brand_keywords.is_empty()
    }

    async fn hydrate(&self, query: &InsightQuery) -> Result<InsightQuery, String> {
        let mut hydrated = query.clone();
        if let Some(keywords) = self.brand_keywords.get(&query.product_id) {
            hydrated.brand_keywords = keywords.clone();
        }
        Ok(hydrated)
    }

    fn update(&self, query: &mut InsightQuery, hydrated: InsightQuery) {
        query.brand_keywords = hydrated.brand_keywords;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fills_keywords_for_known_product() {
        let mut metadata = HashMap::new();
        metadata.insert("prod-1".to_string(), vec!["탈모".into(), "샴푸".into()]);
        let hydrator = ProductContextHydrator::new(metadata);

        let mut query = InsightQuery::new("req", "prod-1");
        assert!(hydrator.enable(&query));
        let hydrated = hydrator.hydrate(&query).await.unwrap();
        hydrator.update(&mut query, hydrated);
        assert_eq!(query.brand_keywords.len(), 2);
    }

    #[tokio::test]
    async fn explicit_keywords_win_over_metadata() {
        let mut metadata = HashMap::new();
        metadata.insert("prod-1".to_string(), vec!["탈모".into()]);
        let hydrator = ProductContextHydrator::new(metadata);

        let mut query = InsightQuery::new("req", "prod-1");
        query.brand_keywords = vec!["직접 지정".into()];
        assert!(!hydrator.enable(&query));
    }
}
