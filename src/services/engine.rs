//! Recommendation engine: rank every catalog row against the selected one,
//! then walk the ranking through the enricher until the quota is met.

use std::sync::Arc;

use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::error::{AppError, Result};
use crate::models::{RankedCandidate, Recommendation};
use crate::services::enricher::PosterProvider;
use crate::similarity::SimilarityMatrix;

pub struct RecommendationEngine {
    catalog: Arc<Catalog>,
    matrix: Arc<SimilarityMatrix>,
    enricher: Arc<dyn PosterProvider>,
    quota: usize,
    scan_limit: usize,
}

impl std::fmt::Debug for RecommendationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecommendationEngine")
            .field("quota", &self.quota)
            .field("scan_limit", &self.scan_limit)
            .finish_non_exhaustive()
    }
}

impl RecommendationEngine {
    /// Build the engine over immutable, shared catalog and matrix handles.
    /// The matrix outer dimension must match the catalog row count; a
    /// mismatched pair of artifacts is fatal here, before any request is
    /// served.
    pub fn new(
        catalog: Arc<Catalog>,
        matrix: Arc<SimilarityMatrix>,
        enricher: Arc<dyn PosterProvider>,
        quota: usize,
        scan_limit: usize,
    ) -> Result<Self> {
        if matrix.len() != catalog.len() {
            return Err(AppError::Schema(format!(
                "similarity matrix has {} rows but catalog has {} items",
                matrix.len(),
                catalog.len()
            )));
        }

        Ok(Self {
            catalog,
            matrix,
            enricher,
            quota,
            scan_limit,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn quota(&self) -> usize {
        self.quota
    }

    pub fn scan_limit(&self) -> usize {
        self.scan_limit
    }

    /// Recommend with the configured quota and scan limit.
    pub async fn recommend(&self, selected_title: &str) -> Result<Vec<Recommendation>> {
        self.recommend_with(selected_title, self.quota, self.scan_limit)
            .await
    }

    /// Recommend up to `quota` movies similar to `selected_title`,
    /// examining at most `scan_limit` ranked candidates.
    ///
    /// Candidates are enriched strictly sequentially in rank order; a
    /// candidate without a fetchable poster is skipped and only reduces
    /// yield. Fewer than `quota` entries is a normal outcome, not an error.
    pub async fn recommend_with(
        &self,
        selected_title: &str,
        quota: usize,
        scan_limit: usize,
    ) -> Result<Vec<Recommendation>> {
        let index = self.catalog.index_of_title(selected_title).ok_or_else(|| {
            AppError::NotFound(format!("title not in catalog: {}", selected_title))
        })?;

        let candidates = self.rank_candidates(index)?;

        let mut recommendations = Vec::with_capacity(quota);
        let mut examined = 0usize;

        for candidate in candidates.iter().take(scan_limit) {
            if recommendations.len() >= quota {
                break;
            }
            examined += 1;

            let item = match self.catalog.get(candidate.row) {
                Some(item) => item,
                None => {
                    warn!(row = candidate.row, "Ranked row outside catalog, skipping");
                    continue;
                }
            };

            if let Some(poster_url) = self.enricher.fetch_poster(&item.movie_id).await {
                recommendations.push(Recommendation {
                    title: item.title.clone(),
                    poster_url,
                });
            }
        }

        info!(
            selected = selected_title,
            examined,
            accepted = recommendations.len(),
            quota,
            "Recommendation request completed"
        );

        Ok(recommendations)
    }

    /// Rank every row by similarity to `index`, descending, stable on ties,
    /// then drop the first entry of the sorted sequence. Self-similarity is
    /// maximal by construction, so that entry is the selected row itself;
    /// the exclusion is positional, matching the reference pipeline.
    fn rank_candidates(&self, index: usize) -> Result<Vec<RankedCandidate>> {
        let scores = self.matrix.row(index).ok_or_else(|| {
            AppError::Schema(format!("similarity matrix has no row {}", index))
        })?;

        let mut ranked: Vec<RankedCandidate> = scores
            .iter()
            .enumerate()
            .map(|(row, &score)| RankedCandidate { row, score })
            .collect();

        // Stable sort keeps original row order on tied scores
        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(ranked.into_iter().skip(1).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::enricher::MockPosterProvider;
    use serde_json::json;

    fn four_movie_catalog() -> Arc<Catalog> {
        let raw = json!([
            { "movie_id": "1", "title": "A", "tags": "t" },
            { "movie_id": "2", "title": "B", "tags": "t" },
            { "movie_id": "3", "title": "C", "tags": "t" },
            { "movie_id": "4", "title": "D", "tags": "t" }
        ]);
        Arc::new(Catalog::from_value(&raw).unwrap())
    }

    fn matrix_for_a() -> Arc<SimilarityMatrix> {
        Arc::new(SimilarityMatrix::new(vec![
            vec![1.0, 0.9, 0.2, 0.5],
            vec![0.9, 1.0, 0.3, 0.4],
            vec![0.2, 0.3, 1.0, 0.1],
            vec![0.5, 0.4, 0.1, 1.0],
        ]))
    }

    fn engine_with(enricher: MockPosterProvider) -> RecommendationEngine {
        RecommendationEngine::new(
            four_movie_catalog(),
            matrix_for_a(),
            Arc::new(enricher),
            9,
            29,
        )
        .unwrap()
    }

    fn posters_for_all() -> MockPosterProvider {
        let mut mock = MockPosterProvider::new();
        mock.expect_fetch_poster()
            .returning(|id| Some(format!("https://posters.test/{}.jpg", id)));
        mock
    }

    #[tokio::test]
    async fn ranks_by_score_excluding_self() {
        let engine = engine_with(posters_for_all());

        let recs = engine.recommend_with("A", 2, 29).await.unwrap();
        let titles: Vec<&str> = recs.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "D"]);
    }

    #[tokio::test]
    async fn falls_back_past_candidates_without_posters() {
        let mut mock = MockPosterProvider::new();
        mock.expect_fetch_poster()
            .returning(|id| match id {
                "2" => None, // B has no poster
                other => Some(format!("https://posters.test/{}.jpg", other)),
            });
        let engine = engine_with(mock);

        let recs = engine.recommend_with("A", 2, 29).await.unwrap();
        let titles: Vec<&str> = recs.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["D", "C"]);
    }

    #[tokio::test]
    async fn all_enrichment_failures_yield_empty_result() {
        let mut mock = MockPosterProvider::new();
        mock.expect_fetch_poster().returning(|_| None);
        let engine = engine_with(mock);

        let recs = engine.recommend("A").await.unwrap();
        assert!(recs.is_empty());
    }

    #[tokio::test]
    async fn unknown_title_is_not_found() {
        let engine = engine_with(posters_for_all());

        let err = engine.recommend("Nope").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn each_candidate_fetched_at_most_once() {
        let mut mock = MockPosterProvider::new();
        // quota 2 met after the two best candidates; exactly two fetches
        mock.expect_fetch_poster()
            .times(2)
            .returning(|id| Some(format!("https://posters.test/{}.jpg", id)));
        let engine = engine_with(mock);

        let recs = engine.recommend_with("A", 2, 29).await.unwrap();
        assert_eq!(recs.len(), 2);
    }

    #[tokio::test]
    async fn scan_limit_caps_examined_candidates() {
        let mut mock = MockPosterProvider::new();
        mock.expect_fetch_poster().times(1).returning(|_| None);
        let engine = engine_with(mock);

        // Only the single best candidate is examined
        let recs = engine.recommend_with("A", 9, 1).await.unwrap();
        assert!(recs.is_empty());
    }

    #[tokio::test]
    async fn tied_scores_keep_original_row_order() {
        let catalog = four_movie_catalog();
        let matrix = Arc::new(SimilarityMatrix::new(vec![
            vec![1.0, 0.5, 0.5, 0.5],
            vec![0.5, 1.0, 0.5, 0.5],
            vec![0.5, 0.5, 1.0, 0.5],
            vec![0.5, 0.5, 0.5, 1.0],
        ]));
        let engine =
            RecommendationEngine::new(catalog, matrix, Arc::new(posters_for_all()), 9, 29)
                .unwrap();

        let recs = engine.recommend("A").await.unwrap();
        let titles: Vec<&str> = recs.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "C", "D"]);
    }

    #[test]
    fn dimension_mismatch_is_fatal_at_construction() {
        let catalog = four_movie_catalog();
        let matrix = Arc::new(SimilarityMatrix::new(vec![vec![1.0, 0.2], vec![0.2, 1.0]]));
        let mock = MockPosterProvider::new();

        let err = RecommendationEngine::new(catalog, matrix, Arc::new(mock), 9, 29).unwrap_err();
        assert!(matches!(err, AppError::Schema(_)));
    }
}
