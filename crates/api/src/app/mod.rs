//! HTTP API application wiring (Axum router + service wiring).
//!
//! This folder is structured like:
//! - `services.rs`: store selection and the handle shared with handlers
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: the response envelope and request parsing helpers
//! - `errors.rs`: consistent error responses

use axum::{
    http::{HeaderValue, Method, header::CONTENT_TYPE},
    routing::get,
    Extension, Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};

use pantrykeeper_infra::AppConfig;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router from configuration (public entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let services = services::build_services(config).await?;
    Ok(router(services, &config.cors_origins))
}

/// Assemble the router around an already-built store.
///
/// Tests call this directly with the in-memory store.
pub fn router(services: AppServices, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(routes::system::index))
        .nest("/api", routes::router())
        .method_not_allowed_fallback(routes::system::method_not_allowed)
        .fallback(routes::system::not_found)
        .layer(Extension(services))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::request_context))
                .layer(cors_layer(cors_origins)),
        )
}

/// Cross-origin policy: listed origins only, the four resource methods, and
/// `Content-Type` as the only request header.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
}
