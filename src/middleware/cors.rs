use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

/// Dashboard clients are served from a different origin and send bearer tokens.
pub fn dashboard_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_origin(Any)
}
