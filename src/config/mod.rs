use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub data: DataConfig,
    pub tmdb: TmdbConfig,
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub catalog_path: String,
    pub similarity_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    pub api_key: String,
    pub api_base_url: String,
    pub image_base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Max accepted recommendations per request.
    pub quota: usize,
    /// Max ranked candidates examined per request, independent of quota.
    pub scan_limit: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let api_key = std::env::var("TMDB_API_KEY")
            .map_err(|_| "TMDB_API_KEY not set in environment or .env")?;

        Ok(Config {
            app: AppConfig {
                env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                port: std::env::var("APP_PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()?,
                log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            },
            data: DataConfig {
                catalog_path: std::env::var("CATALOG_PATH")
                    .unwrap_or_else(|_| "data/movie_list.json".to_string()),
                similarity_path: std::env::var("SIMILARITY_PATH")
                    .unwrap_or_else(|_| "data/similarity.json".to_string()),
            },
            tmdb: TmdbConfig {
                api_key,
                api_base_url: std::env::var("TMDB_API_BASE_URL")
                    .unwrap_or_else(|_| "https://api.themoviedb.org/3".to_string()),
                image_base_url: std::env::var("TMDB_IMAGE_BASE_URL")
                    .unwrap_or_else(|_| "https://image.tmdb.org/t/p/w500".to_string()),
                timeout_secs: std::env::var("TMDB_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()?,
            },
            engine: EngineConfig {
                quota: std::env::var("RECOMMENDATION_QUOTA")
                    .unwrap_or_else(|_| "9".to_string())
                    .parse()?,
                scan_limit: std::env::var("RECOMMENDATION_SCAN_LIMIT")
                    .unwrap_or_else(|_| "29".to_string())
                    .parse()?,
            },
        })
    }
}
