pub mod health;
pub mod quiz;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::middleware::{cors::permissive_cors, rate_limit};
use crate::AppState;

const MAX_BODY_BYTES: usize = 64 * 1024;

/// Full application router: health probe, the two gateway endpoints under a
/// shared throttle, and the static directory holding the video catalog as
/// fallback.
pub fn router(state: AppState, api_rps: u32, static_dir: &str) -> Router {
    let api = Router::new()
        .route(
            "/api/mcq",
            post(quiz::generate_mcq).fallback(quiz::method_not_allowed),
        )
        .route(
            "/api/explain",
            post(quiz::explain).fallback(quiz::method_not_allowed),
        )
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::new_rps_state(api_rps),
            rate_limit::rps_middleware,
        ));

    Router::new()
        .route("/health", get(health::health))
        .merge(api)
        .fallback_service(ServeDir::new(static_dir))
        .with_state(state)
        .layer(permissive_cors())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}
