pub mod catalog;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod similarity;

pub use catalog::Catalog;
pub use config::Config;
pub use error::{AppError, Result};
pub use similarity::SimilarityMatrix;

// Re-export engine components
pub use services::{PosterProvider, RecommendationEngine, TmdbPosterClient};
