use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

/// The browser front-end may be hosted on another origin than the gateway.
pub fn permissive_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(Any)
}
