//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate with
//! the unified `kernel::error::AppError` system.
//!
//! Authentication failures deliberately carry no detail: unknown
//! identifier, wrong secret and disabled account all surface as the same
//! `BadCredentials`, so callers cannot enumerate accounts. The internal
//! distinction exists only in logs.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Authentication attempted and failed; reason intentionally opaque
    #[error("Bad credentials")]
    BadCredentials,

    /// Anonymous request on a route that requires authentication
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Authenticated principal lacks a required authority
    #[error("Access denied")]
    AccessDenied,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::BadCredentials | AuthError::AuthenticationRequired => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::AccessDenied => StatusCode::FORBIDDEN,
            AuthError::Database(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::BadCredentials | AuthError::AuthenticationRequired => {
                ErrorKind::Unauthorized
            }
            AuthError::AccessDenied => ErrorKind::Forbidden,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::BadCredentials => {
                tracing::warn!("Failed authentication attempt");
            }
            AuthError::AuthenticationRequired | AuthError::AccessDenied => {
                tracing::debug!(error = %self, "Request rejected by access policy");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}
