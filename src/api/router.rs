use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::render));

    // Read-only views; every response is derived fresh from chain state
    let api = Router::new()
        .route("/api/stats", get(handlers::stats::summary))
        .route("/api/markets", get(handlers::markets::list))
        .route("/api/markets/:id", get(handlers::markets::detail))
        .route("/api/markets/:id/chart", get(handlers::markets::chart))
        .route("/api/markets/:id/position", get(handlers::markets::position))
        .route("/api/markets/:id/quote", get(handlers::markets::quote));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public
        .merge(api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
