use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{error, warn};

use crate::auth::crypto::CryptoError;
use crate::auth::password::PasswordError;
use crate::response::ApiResponse;

/// Everything the auth flow can fail with. Token and lookup failures all
/// collapse to one outward 401 so the response does not reveal which check
/// rejected the request; the precise kind still lands in the logs.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("user already exists")]
    UserAlreadyExists,
    #[error("missing token")]
    MissingToken,
    #[error("token expired")]
    TokenExpired,
    #[error("bad token signature")]
    BadSignature,
    #[error("token issuer mismatch")]
    IssuerMismatch,
    #[error("token audience mismatch")]
    AudienceMismatch,
    #[error("malformed token")]
    InvalidToken,
    #[error("user not found")]
    UserNotFound,
    #[error("validation failed: {0}")]
    Validation(String),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error("token signing failed: {0}")]
    Signing(#[source] anyhow::Error),
    #[error("storage error: {0}")]
    Storage(#[source] anyhow::Error),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid username or password.".to_string(),
            ),
            AuthError::UserAlreadyExists => {
                (StatusCode::CONFLICT, "User already exists".to_string())
            }
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing token".to_string()),
            AuthError::TokenExpired
            | AuthError::BadSignature
            | AuthError::IssuerMismatch
            | AuthError::AudienceMismatch
            | AuthError::InvalidToken => {
                warn!(kind = ?self, "token rejected");
                (StatusCode::UNAUTHORIZED, "Invalid token".to_string())
            }
            AuthError::UserNotFound => {
                warn!("token accepted but backing user is gone");
                (StatusCode::UNAUTHORIZED, "Invalid token".to_string())
            }
            AuthError::Validation(message) => (StatusCode::BAD_REQUEST, message.clone()),
            AuthError::Crypto(e) => {
                error!(error = %e, "field encryption failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AuthError::Password(e) => {
                error!(error = %e, "password hashing failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AuthError::Signing(e) => {
                error!(error = %e, "jwt signing failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AuthError::Storage(e) => {
                error!(error = %e, "storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(ApiResponse::fail(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_failures_collapse_to_one_status() {
        for err in [
            AuthError::MissingToken,
            AuthError::TokenExpired,
            AuthError::BadSignature,
            AuthError::IssuerMismatch,
            AuthError::AudienceMismatch,
            AuthError::InvalidToken,
            AuthError::UserNotFound,
            AuthError::InvalidCredentials,
        ] {
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn duplicate_registration_is_conflict() {
        let response = AuthError::UserAlreadyExists.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn validation_is_bad_request() {
        let response = AuthError::Validation("Invalid email".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_failures_are_500() {
        let response = AuthError::Storage(anyhow::anyhow!("db down")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
