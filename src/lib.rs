pub mod config;
pub mod database;
pub mod error;
pub mod validation;
pub mod models;
pub mod controllers;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub db: database::Database,
    pub config: config::Config,
}

impl AppState {
    pub async fn new(config: config::Config) -> Result<Arc<Self>, sqlx::Error> {
        let db = database::Database::new(&config.database.url, config.database.pool_size).await?;
        tracing::info!("Database connected");

        db.run_migrations().await?;

        Ok(Arc::new(Self { db, config }))
    }
}

/// Главный роутер: служебные маршруты и API под `/api`.
pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Event Management API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", controllers::routes())
        .with_state(state)
        // фронтенд обслуживается с другого origin
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
