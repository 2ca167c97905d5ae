//! CORS middleware configuration.

use axum::http::header::CONTENT_TYPE;
use axum::http::Method;
use tower_http::cors::{Any, CorsLayer};

/// Create the CORS layer: any origin, `GET`/`OPTIONS`, `Content-Type` header.
pub fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .allow_origin(Any)
}
