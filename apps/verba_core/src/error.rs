//! Error taxonomy shared by every app, and its mapping to HTTP responses.
//!
//! Every failure leaves the service as `{ "success": false, "message": .. }`.
//! Internal details (database errors, upstream credential problems) are
//! logged and replaced by a generic message.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

use crate::token::AuthError;

pub const MSG_INTERNAL: &str = "Internal server error";
pub const MSG_RATE_LIMITED: &str = "Rate limit exceeded. Please try again later.";
pub const MSG_PROXY_FAILED: &str = "Failed to check grammar. Please try again.";
pub const MSG_PROXY_TIMEOUT: &str = "Grammar check timed out. Please try again.";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    /// Bad credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// Missing, forged or expired bearer token.
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("upstream rate limit exceeded")]
    RateLimited,

    /// The provider refused our API key. Never shown to the caller as such.
    #[error("upstream rejected the provider credentials")]
    UpstreamAuth,

    #[error("upstream request timed out")]
    GatewayTimeout,

    #[error("upstream request failed: {0}")]
    Proxy(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(e: E) -> Self {
        Self::Internal(e.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unauthorized(_) | Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::GatewayTimeout => StatusCode::GATEWAY_TIMEOUT,
            Self::UpstreamAuth | Self::Proxy(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show to the client.
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(msg) | Self::Conflict(msg) | Self::Unauthorized(msg) => msg.clone(),
            Self::Auth(AuthError::MissingToken) => "Access token required".into(),
            Self::Auth(AuthError::InvalidSignature) => "Invalid token".into(),
            Self::Auth(AuthError::Expired) => "Token expired".into(),
            Self::RateLimited => MSG_RATE_LIMITED.into(),
            Self::GatewayTimeout => MSG_PROXY_TIMEOUT.into(),
            Self::UpstreamAuth | Self::Proxy(_) => MSG_PROXY_FAILED.into(),
            Self::Internal(_) => MSG_INTERNAL.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            warn!(error = %self, status = status.as_u16(), "request rejected");
        }

        let body = ErrorBody {
            success: false,
            message: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

/// Unwraps a JSON body. A request sent without a JSON content type reads as
/// an empty object, so it reaches the route's own field validation.
pub fn json_body<T: Default>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection) => Err(rejection.into()),
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_credential_failure_is_masked() {
        let err = ApiError::UpstreamAuth;
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), MSG_PROXY_FAILED);
        assert!(!err.public_message().to_lowercase().contains("key"));
    }

    #[test]
    fn internal_details_stay_internal() {
        let err = ApiError::internal("connection refused (os error 111)");
        assert_eq!(err.public_message(), MSG_INTERNAL);
    }

    #[test]
    fn auth_failures_are_unauthorized() {
        for kind in [
            AuthError::MissingToken,
            AuthError::InvalidSignature,
            AuthError::Expired,
        ] {
            assert_eq!(ApiError::from(kind).status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn rate_limit_passes_through() {
        assert_eq!(ApiError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
