use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

/// Any origin, fixed method and header allow-lists. Preflight `OPTIONS`
/// requests are answered here with an empty 200.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
}
