//! Router configuration for the Web API.

use axum::{
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE,
        },
        HeaderValue,
    },
    routing::get,
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{list_items, method_not_allowed, not_found, preflight, AppState};
use super::middleware::create_cors_layer;

/// Create the catalog router mounted at `endpoint`.
///
/// Only `GET` builds the catalog; `HEAD` is rejected like any other method.
///
/// Every response carries `Content-Type: application/json` and the CORS
/// allow headers, including errors and preflight answers.
pub fn create_router(app_state: Arc<AppState>, endpoint: &str) -> Router {
    Router::new()
        .route(
            endpoint,
            get(list_items)
                .head(method_not_allowed)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(SetResponseHeaderLayer::if_not_present(
                    CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    ACCESS_CONTROL_ALLOW_ORIGIN,
                    HeaderValue::from_static("*"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    ACCESS_CONTROL_ALLOW_METHODS,
                    HeaderValue::from_static("GET, OPTIONS"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    ACCESS_CONTROL_ALLOW_HEADERS,
                    HeaderValue::from_static("Content-Type"),
                ))
                .layer(create_cors_layer()),
        )
        .with_state(app_state)
}

/// Path of the liveness probe.
pub const HEALTH_PATH: &str = "/health";

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route(HEALTH_PATH, get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
