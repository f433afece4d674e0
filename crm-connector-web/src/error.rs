//! HTTP error boundary
//!
//! Every handler returns [`ApiError`]; this is the only place errors become
//! status codes and JSON bodies.

use actix_web::error::JsonPayloadError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use crm_connector_core::CoreError;
use serde_json::json;
use thiserror::Error;

/// Route the client is sent to when no session is attached.
pub const AUTHORIZE_ROUTE: &str = "/auth/login";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid or incomplete request body (400)
    #[error("{0}")]
    BadRequest(String),

    /// No authenticated backend session for this caller (401)
    #[error("not authenticated")]
    NotAuthenticated,

    /// Authorization-code callback rejected (401)
    #[error("authorization failed: {0}")]
    AuthorizationFailed(String),

    /// Unknown route (404)
    #[error("not found")]
    NotFound,

    /// Request body over the configured limit (413)
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Backend call failed; the message is passed through (500)
    #[error("{0}")]
    Upstream(String),

    /// Anything else; the detail is logged, never returned (500)
    #[error("internal server error")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotAuthenticated | Self::AuthorizationFailed(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Upstream(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            Self::NotAuthenticated | Self::AuthorizationFailed(_) => json!({
                "error": self.to_string(),
                "authorize": AUTHORIZE_ROUTE,
            }),
            _ => json!({ "error": self.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        if err.is_expected() {
            tracing::warn!("{err}");
        } else {
            tracing::error!("{err}");
        }

        match err {
            CoreError::ValidationError(msg) => Self::BadRequest(msg),
            CoreError::NotAuthenticated => Self::NotAuthenticated,
            CoreError::AuthorizationFailed(msg) => Self::AuthorizationFailed(msg),
            CoreError::Provider(e) => Self::Upstream(e.to_string()),
        }
    }
}

impl From<JsonPayloadError> for ApiError {
    fn from(err: JsonPayloadError) -> Self {
        tracing::warn!("rejected request body: {err}");
        match err {
            JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
                Self::PayloadTooLarge(err.to_string())
            }
            _ => Self::BadRequest(err.to_string()),
        }
    }
}

/// Log an unexpected failure and hide its detail from the caller.
pub fn internal(error: impl std::fmt::Display, context: &str) -> ApiError {
    tracing::error!("{context} error: {error}");
    ApiError::Internal(format!("{context}: {error}"))
}
