use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // The dashboard page itself
        .route("/", get(handlers::index))
        // Health check
        .route("/health", get(handlers::health_check))
        // One endpoint per discrete UI event
        .route("/api/session", post(handlers::create_session))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/dataset", get(handlers::get_dataset))
        .route("/api/plots", get(handlers::get_plots))
        .route("/api/query", post(handlers::post_query))
        .route("/api/record", post(handlers::post_record))
        // Request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
