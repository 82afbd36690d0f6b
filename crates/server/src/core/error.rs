use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum Error {
    // Input
    #[error("{0}")]
    Validation(String),
    #[error("Email already registered. Please login instead.")]
    DuplicateEmail,

    // Auth
    #[error("Invalid email or password.")]
    InvalidCredentials,
    #[error("Please login first.")]
    AuthenticationRequired,
    #[error("Unauthorized access.")]
    Authorization,

    // Model
    #[error("Pass request {id} not found")]
    NotFound { id: i64 },

    // Generic
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Stable machine-readable name, used in the JSON error envelope
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation",
            Error::DuplicateEmail => "duplicate_email",
            Error::InvalidCredentials => "invalid_credentials",
            Error::AuthenticationRequired => "authentication_required",
            Error::Authorization => "authorization",
            Error::NotFound { .. } => "not_found",
            Error::Internal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::DuplicateEmail => StatusCode::CONFLICT,
            Error::InvalidCredentials | Error::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            Error::Authorization => StatusCode::FORBIDDEN,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let message = match &self {
            Error::Internal(detail) => {
                error!("Request failed: {}", detail);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": {
                "kind": self.kind(),
                "message": message
            }
        }));

        (self.status(), body).into_response()
    }
}

/// A body that is not valid JSON for the expected shape is bad input
impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Internal(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for Error {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Error::Internal(err.to_string())
    }
}

impl From<bcrypt::BcryptError> for Error {
    fn from(err: bcrypt::BcryptError) -> Self {
        Error::Internal(err.to_string())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(Error::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::DuplicateEmail.status(), StatusCode::CONFLICT);
        assert_eq!(Error::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::AuthenticationRequired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::Authorization.status(), StatusCode::FORBIDDEN);
        assert_eq!(Error::NotFound { id: 7 }.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_internal_detail_is_not_exposed() {
        let response = Error::Internal("disk I/O error at /secret/path".into()).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(body["error"]["kind"], "internal");
        assert_eq!(body["error"]["message"], "Internal server error");
    }
}
