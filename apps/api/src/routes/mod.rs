pub mod health;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::state::AppState;
use crate::tailoring::handlers;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {uri}"))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Tailoring API
        .route("/api/v1/tailor", post(handlers::handle_tailor))
        .route("/api/v1/gap-analysis", post(handlers::handle_gap_analysis))
        .route("/api/v1/taxonomy", get(handlers::handle_taxonomy))
        .fallback(not_found)
        .with_state(state)
}
