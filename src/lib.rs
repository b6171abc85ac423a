pub mod config;
pub mod database;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{config::Config, database::Database, handlers::AppState, services::QuotaStore};

/// Connects to the database, creates the schema and wires the store into
/// application state.
pub async fn build_state(config: Config) -> anyhow::Result<AppState> {
    let database = Database::new(&config.database_url, config.database_max_connections).await?;
    let store = QuotaStore::from_config(database, &config);
    store.ensure_schema().await?;

    Ok(AppState { store, config })
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        .route("/api/v1/images", post(handlers::images::add_image))
        .route("/api/v1/images/recent", post(handlers::images::recent_images))
        .route("/api/v1/quota", get(handlers::quota::get_quota))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
