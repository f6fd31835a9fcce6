//! Poster enrichment against TMDB.
//!
//! The enricher is a capability with a single method returning an optional
//! asset URL: transport failures, timeouts, non-2xx statuses, and malformed
//! bodies all degrade to `None` so the ranking loop is never aborted by one
//! bad candidate. No retry, no backoff, no cross-call caching.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::TmdbConfig;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PosterProvider: Send + Sync {
    /// Fetch the poster URL for one external movie id. Best-effort: every
    /// failure mode maps to `None`.
    async fn fetch_poster(&self, movie_id: &str) -> Option<String>;
}

pub struct TmdbPosterClient {
    client: HttpClient,
    api_key: String,
    api_base_url: String,
    image_base_url: String,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieResponse {
    poster_path: Option<String>,
}

impl TmdbPosterClient {
    pub fn new(config: &TmdbConfig) -> Self {
        let client = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key: config.api_key.clone(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            image_base_url: config.image_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Substitute a poster path into the image base URL. Empty or absent
    /// paths mean the movie has no usable asset.
    fn asset_url(&self, poster_path: Option<String>) -> Option<String> {
        poster_path
            .filter(|path| !path.is_empty())
            .map(|path| format!("{}/{}", self.image_base_url, path))
    }
}

#[async_trait]
impl PosterProvider for TmdbPosterClient {
    async fn fetch_poster(&self, movie_id: &str) -> Option<String> {
        let url = format!(
            "{}/movie/{}?api_key={}&language=en-US",
            self.api_base_url, movie_id, self.api_key
        );

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(movie_id, error = %e, "TMDB request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            debug!(movie_id, status = %response.status(), "TMDB returned non-success status");
            return None;
        }

        let body: TmdbMovieResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                warn!(movie_id, error = %e, "TMDB response body malformed");
                return None;
            }
        };

        self.asset_url(body.poster_path)
    }
}
