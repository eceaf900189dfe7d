use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use pantrykeeper_core::DomainError;
use pantrykeeper_infra::StoreError;

use crate::app::dto::Envelope;

/// Everything a handler can fail with.
///
/// The HTTP status is the only structured signal clients get; the message goes
/// into the envelope's `error` field verbatim.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed input. Never reaches the store.
    #[error("{0}")]
    Validation(String),

    #[error("Item not found")]
    NotFound,

    /// A date that does not parse as `YYYY-MM-DD`.
    #[error("{0}")]
    MalformedDate(String),

    #[error("Not found")]
    RouteNotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("{0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            // Clients have always seen a server error for bad dates.
            ApiError::MalformedDate(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => ApiError::Validation(msg),
            DomainError::InvalidDate(msg) => ApiError::MalformedDate(msg),
            DomainError::InvalidId(_) | DomainError::NotFound => ApiError::NotFound,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "request rejected");
        }

        (status, Json(Envelope::error(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_statuses() {
        let cases = [
            (DomainError::validation("Missing required fields: quantity"), StatusCode::BAD_REQUEST),
            (DomainError::invalid_date("bad date"), StatusCode::INTERNAL_SERVER_ERROR),
            (DomainError::invalid_id("ItemId: x"), StatusCode::NOT_FOUND),
            (DomainError::not_found(), StatusCode::NOT_FOUND),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn invalid_id_reads_as_item_not_found() {
        let err = ApiError::from(DomainError::invalid_id("ItemId: x"));
        assert_eq!(err.to_string(), "Item not found");
    }

    #[test]
    fn unsupported_method_is_405() {
        assert_eq!(ApiError::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(ApiError::MethodNotAllowed.to_string(), "Method not allowed");
    }

    #[test]
    fn store_errors_are_server_errors() {
        let err = ApiError::from(StoreError::unavailable("list", "connection pool closed"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "store unavailable in list: connection pool closed");
    }
}
