use std::sync::OnceLock;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::config::Environment;
use crate::response::Envelope;

/// API error taxonomy. Every failure a handler can produce maps onto one of
/// these, and each renders as the standard failure envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Authentication(String),
    #[error("{0}")]
    Authorization(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{context}: {message}")]
    Persistence { context: String, message: String },
    #[error("{context}: {message}")]
    Internal { context: String, message: String },
}

impl ApiError {
    /// Wrap an underlying storage failure, preserving its message.
    pub fn persistence(context: &str, err: impl std::fmt::Display) -> Self {
        Self::Persistence {
            context: context.to_string(),
            message: err.to_string(),
        }
    }

    pub fn internal(context: &str, err: impl std::fmt::Display) -> Self {
        Self::Internal {
            context: context.to_string(),
            message: err.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ApiError::Authorization(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Persistence { .. } | ApiError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Failure envelope for this error. The wrapped cause of a 5xx is only
    /// included when `expose_detail` is set (non-production).
    pub fn to_envelope(&self, expose_detail: bool) -> Envelope<()> {
        match self {
            ApiError::Validation(msg)
            | ApiError::Authentication(msg)
            | ApiError::Authorization(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg) => Envelope::failure(msg.clone(), None),
            ApiError::Persistence { context, message }
            | ApiError::Internal { context, message } => {
                Envelope::failure(context.clone(), expose_detail.then(|| message.clone()))
            }
        }
    }
}

static EXPOSE_ERROR_DETAIL: OnceLock<bool> = OnceLock::new();

pub(crate) fn expose_for(env: Environment) -> bool {
    !env.is_production()
}

/// Wire the detail-exposure flag from the loaded configuration. First call
/// wins; unset falls back to development behavior.
pub fn set_exposure(env: Environment) {
    let _ = EXPOSE_ERROR_DETAIL.set(expose_for(env));
}

fn expose_detail() -> bool {
    *EXPOSE_ERROR_DETAIL.get().unwrap_or(&true)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(self.to_envelope(expose_detail()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(
            ApiError::Validation("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Authentication("no token".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Authorization("not yours".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotFound("gone".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Conflict("dup".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::persistence("Failed to fetch article", "boom").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn persistence_detail_hidden_in_production_mode() {
        let err = ApiError::persistence("Failed to fetch article", "connection refused");

        let exposed = err.to_envelope(true);
        assert_eq!(exposed.message, "Failed to fetch article");
        assert_eq!(exposed.error.as_deref(), Some("connection refused"));

        let hidden = err.to_envelope(false);
        assert_eq!(hidden.message, "Failed to fetch article");
        assert!(hidden.error.is_none());
    }

    #[test]
    fn detail_exposure_follows_environment() {
        assert!(expose_for(Environment::Development));
        assert!(!expose_for(Environment::Production));
    }

    #[test]
    fn client_errors_never_carry_internal_detail() {
        let err = ApiError::NotFound("Article not found".into());
        let env = err.to_envelope(true);
        assert!(!env.success);
        assert_eq!(env.message, "Article not found");
        assert!(env.error.is_none());
    }
}
