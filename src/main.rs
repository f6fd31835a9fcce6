use actix_web::{web, App, HttpServer};
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use movie_recommendation_service::config::Config;
use movie_recommendation_service::handlers::{
    get_movies, get_recommendations, RecommendationHandlerState,
};
use movie_recommendation_service::services::{RecommendationEngine, TmdbPosterClient};
use movie_recommendation_service::{Catalog, SimilarityMatrix};

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().expect("Failed to load configuration");

    tracing::info!(
        "Starting movie-recommendation-service v{}",
        env!("CARGO_PKG_VERSION")
    );
    tracing::info!("Environment: {}", config.app.env);

    // Load the immutable catalog and similarity artifacts before binding;
    // a schema problem here must halt startup, not surface per-request
    let catalog = Catalog::load_from_path(&config.data.catalog_path)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
    let matrix = SimilarityMatrix::load_from_path(&config.data.similarity_path)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;

    let enricher = Arc::new(TmdbPosterClient::new(&config.tmdb));

    let engine = match RecommendationEngine::new(
        Arc::new(catalog),
        Arc::new(matrix),
        enricher,
        config.engine.quota,
        config.engine.scan_limit,
    ) {
        Ok(engine) => {
            tracing::info!("Recommendation engine initialized");
            Arc::new(engine)
        }
        Err(e) => {
            tracing::error!("Failed to initialize recommendation engine: {:?}", e);
            return Err(io::Error::new(io::ErrorKind::InvalidData, e.to_string()));
        }
    };

    let handler_state = web::Data::new(RecommendationHandlerState { engine });

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(handler_state.clone())
            .route("/health", web::get().to(|| async { "OK" }))
            .service(get_recommendations)
            .service(get_movies)
    })
    .bind(format!("0.0.0.0:{}", config.app.port))?
    .run()
    .await
}
