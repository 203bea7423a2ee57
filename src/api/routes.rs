//! API route definitions

use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;

use super::auth::backend_api_key_middleware;
use super::auth::ApiKeyState;
use super::handlers::AppState;
use super::handlers::{
    self,
};

/// Create RESTful API router
pub fn api_routes(state: AppState) -> Router {
    let mut protected = Router::new()
        .route("/query", post(handlers::query))
        .route("/history", get(handlers::history));

    if let Some(expected_key) = state.api_key.clone() {
        protected = protected.route_layer(middleware::from_fn_with_state(
            ApiKeyState { expected_key },
            backend_api_key_middleware,
        ));
    }

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .merge(protected)
        .with_state(state)
}
