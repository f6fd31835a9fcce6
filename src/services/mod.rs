pub mod engine;
pub mod enricher;

pub use engine::RecommendationEngine;
pub use enricher::{PosterProvider, TmdbPosterClient};
