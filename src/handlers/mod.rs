/// Recommendation API handlers
///
/// HTTP endpoints over the recommendation engine
use actix_web::{get, web, HttpResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::services::RecommendationEngine;

/// Query parameters for GET /api/v1/recommendations
#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    /// Exact catalog title to recommend against
    pub title: String,

    /// Number of recommendations to return (clamped to the engine quota)
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    9
}

/// Recommendation response
#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub selected: String,
    pub recommendations: Vec<RecommendationEntry>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct RecommendationEntry {
    pub title: String,
    pub poster_url: String,
}

/// Movie list response (selection source for clients)
#[derive(Debug, Serialize)]
pub struct MovieListResponse {
    pub titles: Vec<String>,
    pub count: usize,
}

/// Handler state shared across workers
pub struct RecommendationHandlerState {
    pub engine: Arc<RecommendationEngine>,
}

/// GET /api/v1/recommendations?title=...&limit=N
#[get("/api/v1/recommendations")]
pub async fn get_recommendations(
    query: web::Query<RecommendationQuery>,
    state: web::Data<RecommendationHandlerState>,
) -> Result<HttpResponse> {
    if query.title.is_empty() {
        return Err(AppError::BadRequest("title must not be empty".to_string()));
    }
    let limit = query.limit.clamp(1, state.engine.quota());

    debug!(title = %query.title, limit, "Recommendation request");

    let recommendations = state
        .engine
        .recommend_with(&query.title, limit, state.engine.scan_limit())
        .await?;

    let entries: Vec<RecommendationEntry> = recommendations
        .into_iter()
        .map(|r| RecommendationEntry {
            title: r.title,
            poster_url: r.poster_url,
        })
        .collect();

    Ok(HttpResponse::Ok().json(RecommendationResponse {
        selected: query.title.clone(),
        count: entries.len(),
        recommendations: entries,
    }))
}

/// GET /api/v1/movies — catalog titles in row order
#[get("/api/v1/movies")]
pub async fn get_movies(state: web::Data<RecommendationHandlerState>) -> Result<HttpResponse> {
    let titles: Vec<String> = state
        .engine
        .catalog()
        .titles()
        .map(str::to_string)
        .collect();

    Ok(HttpResponse::Ok().json(MovieListResponse {
        count: titles.len(),
        titles,
    }))
}
