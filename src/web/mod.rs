use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::label::LabelOptions;
use crate::registry::Registry;

pub use self::error::AppError;
use self::routes::*;

pub mod error;
pub mod models;
pub mod routes;

/// Upload ceiling for multipart forms carrying a photo.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<dyn Registry>,
    pub label_options: LabelOptions,
}

async fn health_check_handler() -> &'static str {
    "OK"
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

pub fn create_axum_router(registry: Arc<dyn Registry>, label_options: LabelOptions) -> Router {
    let app_state = Arc::new(AppState {
        registry,
        label_options,
    });

    Router::new()
        .route("/api/health", get(health_check_handler))
        .nest(
            "/api/tools",
            tool_routes::create_tools_router().merge(label_routes::create_labels_router()),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(app_state)
}

/// Router served when required configuration is missing: every request gets
/// the same blocking error and nothing else is reachable.
pub fn create_config_error_router(missing: Vec<&'static str>) -> Router {
    let message = format!(
        "The registry configuration is missing. Set the following environment variables and restart: {}",
        missing.join(", ")
    );
    Router::new()
        .fallback(move || {
            let message = message.clone();
            async move { AppError::ConfigurationRequired(message) }
        })
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
}
