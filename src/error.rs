//! Error types for Libcat server

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Path clients are sent to when a request needs an authenticated user
pub const LOGIN_PATH: &str = "/api/v1/auth/login";

/// Machine-readable error codes returned in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthenticated = 2,
    NotAuthorized = 3,
    DbFailure = 4,
    NotFound = 5,
    Duplicate = 6,
    InvalidForm = 8,
}

/// Validation messages keyed by the form field they belong to
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(())` when nothing was recorded, otherwise an invalid-form error
    pub fn into_result(self) -> AppResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::InvalidForm(self))
        }
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, errs) in errors.field_errors() {
            for err in errs {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({})", err.code));
                fields.add(field.to_string(), message);
            }
        }
        fields
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Authentication needed to reach `next`
    #[error("Login required for {next}: {message}")]
    LoginRequired { message: String, next: String },

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid form: {0}")]
    InvalidForm(FieldErrors),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::InvalidForm(errors.into())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
    /// Per-field validation messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, Vec<String>>>,
    /// Where to authenticate before retrying
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

impl AppError {
    fn parts(self) -> (StatusCode, ErrorCode, String, Option<FieldErrors>) {
        match self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthenticated, msg, None)
            }
            AppError::LoginRequired { message, .. } => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthenticated, message, None)
            }
            AppError::Authorization(msg) => {
                (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized, msg, None)
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorCode::NotFound, msg, None),
            AppError::InvalidForm(fields) => (
                StatusCode::BAD_REQUEST,
                ErrorCode::InvalidForm,
                "Please correct the errors below.".to_string(),
                Some(fields),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                    None,
                )
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ErrorCode::Duplicate, msg, None),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                    None,
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let next = match &self {
            AppError::LoginRequired { next, .. } => Some(next.clone()),
            _ => None,
        };
        let (status, code, message, fields) = self.parts();

        let redirect_url = (status == StatusCode::UNAUTHORIZED).then(|| login_redirect(next.as_deref()));

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
            fields: fields.map(|f| f.0),
            redirect_url,
        });

        (status, body).into_response()
    }
}

/// Login path, carrying the page to come back to when known
pub fn login_redirect(next: Option<&str>) -> String {
    match next {
        Some(path) => format!("{}?next={}", LOGIN_PATH, path),
        None => LOGIN_PATH.to_string(),
    }
}

impl AppError {
    /// Turn an authentication failure into a login prompt that returns to `next`
    pub fn requiring_login(self, next: &str) -> AppError {
        match self {
            AppError::Authentication(message) => AppError::LoginRequired {
                message,
                next: next.to_string(),
            },
            other => other,
        }
    }
}

/// Maps a unique-constraint violation to a conflict, leaving other errors untouched
pub fn conflict_on_unique(err: sqlx::Error, message: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(message.to_string())
        }
        _ => AppError::Database(err),
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_errors_collect_per_field() {
        let mut errors = FieldErrors::new();
        errors.add("year_range", "Select a valid choice.");
        errors.add("year_range", "Second message");
        errors.add("sort_by", "Select a valid choice.");

        assert_eq!(errors.get("year_range").map(|m| m.len()), Some(2));
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["sort_by", "year_range"]);
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn test_empty_field_errors_pass() {
        assert!(FieldErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_status_codes() {
        let resp = AppError::NotFound("x".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = AppError::Authentication("x".into()).into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = AppError::Conflict("x".into()).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let resp = AppError::Authorization("x".into()).into_response();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let mut fields = FieldErrors::new();
        fields.add("query", "too long");
        let resp = AppError::InvalidForm(fields).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_login_redirect_carries_next() {
        assert_eq!(login_redirect(None), "/api/v1/auth/login");
        assert_eq!(
            login_redirect(Some("/api/v1/favorites")),
            "/api/v1/auth/login?next=/api/v1/favorites"
        );
    }

    #[test]
    fn test_requiring_login_only_wraps_authentication() {
        let err = AppError::Authentication("Please login".into()).requiring_login("/api/v1/auth/profile");
        match err {
            AppError::LoginRequired { message, next } => {
                assert_eq!(message, "Please login");
                assert_eq!(next, "/api/v1/auth/profile");
            }
            other => panic!("expected login prompt, got {:?}", other),
        }

        let err = AppError::NotFound("x".into()).requiring_login("/anywhere");
        assert!(matches!(err, AppError::NotFound(_)));

        let resp = AppError::LoginRequired {
            message: "x".into(),
            next: "/api/v1/favorites".into(),
        }
        .into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
