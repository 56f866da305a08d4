//! HTTP error handling.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    #[must_use]
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    #[must_use]
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

/// Translate the core domain error taxonomy to HTTP status codes (spec §7).
impl From<jellystream_core::Error> for AppError {
    fn from(err: jellystream_core::Error) -> Self {
        use jellystream_core::Error;
        match err {
            Error::NotFound(msg) => {
                tracing::warn!(%msg, "not found");
                Self::not_found(msg)
            }
            Error::InvalidInput(msg) => {
                tracing::warn!(%msg, "invalid input");
                Self::bad_request(msg)
            }
            Error::ExternalServer(msg) => {
                tracing::error!(%msg, "external server error");
                Self::bad_gateway(msg)
            }
            Error::Database(e) => {
                tracing::error!(error = %e, "database error");
                Self::internal("database error")
            }
            Error::Serialization(e) => {
                tracing::error!(error = %e, "serialization error");
                Self::internal("serialization error")
            }
            Error::Internal(msg) => {
                tracing::error!(%msg, "internal error");
                Self::internal(msg)
            }
        }
    }
}
