//! Application setup and server configuration.

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::kernel::PiiService;
use crate::server::routes::{detect_pii_handler, health_handler, stats_handler, submit_handler};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pii: PiiService,
}

/// Build the Axum application router
///
/// `allowed_origins` narrows CORS; when empty any origin is accepted.
pub fn build_app(pii: PiiService, allowed_origins: &[String]) -> Router {
    let app_state = AppState { pii };

    Router::new()
        .route("/api/detect-pii", post(detect_pii_handler))
        .route("/api/submit", post(submit_handler))
        .route("/api/stats", get(stats_handler))
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(app_state))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(AllowOrigin::list(origins))
    }
}
