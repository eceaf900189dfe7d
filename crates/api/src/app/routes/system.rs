use axum::{http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;

use crate::app::errors::ApiError;

/// Version reported to clients by the index; independent of the crate version.
pub const API_VERSION: &str = "1.0.0";

pub async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "success": true,
            "message": "Food Donation API is running",
            "timestamp": Utc::now().naive_utc(),
        })),
    )
}

/// Service description at `/`.
pub async fn index() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Food Donation Management System API",
        "version": API_VERSION,
        "endpoints": {
            "health": "/api/health",
            "inventory": "/api/inventory",
        },
    }))
}

pub async fn not_found() -> ApiError {
    ApiError::RouteNotFound
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
